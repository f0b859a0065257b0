//! `use<T>` escape rules: fields, returns, and identifier laundering.

use gsc_analysis::null_safety::check_module;
use gsc_ast::ProgramSymbols;
use gsc_common::{CompilerOptions, MemoryMode};
use gsc_lowering::lower_module;

fn check(json: &str, mode: MemoryMode) -> Vec<gsc_common::Diagnostic> {
    let module = gsc_ast::module_from_json(json).expect("test module should deserialize");
    let symbols = ProgramSymbols::from_modules([&module]);
    let module = lower_module(&module, &symbols, &CompilerOptions::default()).expect("lowering");
    check_module(&module, mode)
}

const USE_FIELD: &str = r#"{"path": "m.gs", "items": [
    {"kind": "class", "name": "Pool", "fields": []},
    {"kind": "class", "name": "Item", "fields": [
        {"name": "pool", "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}}]}
]}"#;

#[test]
fn gs401_use_in_class_field() {
    let diags = check(USE_FIELD, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 401);
    assert!(diags[0].message.contains("Item.pool"));
}

#[test]
fn gs401_applies_to_nested_positions() {
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "Pool", "fields": []},
        {"kind": "class", "name": "Cache", "fields": [
            {"name": "slots", "type": {"kind": "named", "name": "Array", "typeArgs": [
                {"kind": "union", "variants": [
                    {"kind": "named", "name": "string"},
                    {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}]}]}}]}
    ]}"#;
    let diags = check(json, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 401);
}

#[test]
fn gs401_applies_to_interface_properties() {
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "Pool", "fields": []},
        {"kind": "interface", "name": "Holder", "properties": [
            {"name": "pool", "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}}]}
    ]}"#;
    let diags = check(json, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 401);
    assert!(diags[0].message.contains("Holder.pool"));
}

#[test]
fn gs402_use_as_return_type() {
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "Pool", "fields": []},
        {"kind": "function", "name": "borrow", "params": [],
         "returnType": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]},
         "body": []}
    ]}"#;
    let diags = check(json, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 402);
}

#[test]
fn gs403_returning_a_use_typed_identifier() {
    // Declared return type differs; the identifier's own type is what
    // counts.
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "Pool", "fields": []},
        {"kind": "function", "name": "launder",
         "params": [{"name": "p", "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}}],
         "returnType": {"kind": "named", "name": "Pool"},
         "body": [{"kind": "return", "value":
            {"kind": "identifier", "name": "p",
             "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}}}]}
    ]}"#;
    let diags = check(json, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 403);
    assert!(diags[0].message.contains("'p'"));
}

#[test]
fn use_params_and_locals_are_legal() {
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "Pool", "fields": [
            {"name": "size", "type": {"kind": "named", "name": "int"}}]},
        {"kind": "function", "name": "inspect",
         "params": [{"name": "p", "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}}],
         "returnType": {"kind": "named", "name": "int"},
         "body": [
           {"kind": "variableDeclaration", "keyword": "const", "name": "alias",
            "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]},
            "initializer": {"kind": "identifier", "name": "p", "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}}},
           {"kind": "return", "value":
              {"kind": "member",
               "object": {"kind": "identifier", "name": "alias", "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}},
               "member": "size", "type": {"kind": "named", "name": "int"}}}]}
    ]}"#;
    let diags = check(json, MemoryMode::Ownership);
    assert!(diags.is_empty(), "unexpected: {diags:?}");
}

#[test]
fn the_whole_pass_is_a_no_op_in_gc_mode() {
    assert!(check(USE_FIELD, MemoryMode::Gc).is_empty());
}
