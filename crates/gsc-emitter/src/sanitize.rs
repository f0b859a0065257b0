//! Identifier sanitation and module namespace derivation for the C++
//! backend.
//!
//! Two reserved sets with different reach: language keywords clash
//! everywhere, well-known runtime library names only clash at declaration
//! sites. Member accesses check the keyword set alone, because a field
//! named `String` inside a member chain cannot shadow the library type.

use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// C++ keywords (plus a few macro-ish names that behave like them).
const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char16_t", "char32_t", "char8_t", "class", "co_await", "co_return",
    "co_yield", "compl", "concept", "const", "const_cast", "consteval", "constexpr", "constinit",
    "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast", "else", "enum",
    "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if", "inline",
    "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq", "nullptr",
    "operator", "or", "or_eq", "private", "protected", "public", "register", "reinterpret_cast",
    "requires", "return", "short", "signed", "sizeof", "static", "static_assert", "static_cast",
    "struct", "switch", "template", "this", "thread_local", "throw", "true", "try", "typedef",
    "typeid", "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "wchar_t",
    "while", "xor", "xor_eq",
];

/// Names the emitted code takes from the runtime and standard headers;
/// declarations must not shadow them.
const RUNTIME_NAMES: &[&str] = &[
    "gs", "std", "String", "Array", "Map", "Task", "Own", "Share", "Use", "StringBuilder",
    "Error", "Object", "main", "argc", "argv",
];

fn keyword_set() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| CPP_KEYWORDS.iter().copied().collect())
}

fn runtime_set() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| RUNTIME_NAMES.iter().copied().collect())
}

/// Sanitize an identifier appearing at a declaration or reference site:
/// keyword and runtime-name clashes get a trailing underscore.
pub fn identifier(name: &str) -> String {
    if keyword_set().contains(name) || runtime_set().contains(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Sanitize a member name inside an access chain: only keywords clash.
pub fn member(name: &str) -> String {
    if keyword_set().contains(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Derive the second-level namespace from a module basename: lower-cased,
/// non-identifier characters replaced with `_`, a leading digit prefixed
/// with `_`, keyword clashes suffixed with `_`.
pub fn module_namespace(basename: &str) -> String {
    let mut out = String::with_capacity(basename.len());
    for ch in basename.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.extend(ch.to_lowercase());
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if keyword_set().contains(out.as_str()) || runtime_set().contains(out.as_str()) {
        out.push('_');
    }
    out
}
