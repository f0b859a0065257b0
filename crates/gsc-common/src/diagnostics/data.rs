//! The static GS diagnostic table.
//!
//! One entry per code; templates use `{0}`, `{1}`, ... placeholders filled by
//! `format_message`. The severity recorded here is the default: ownership and
//! null-safety codes are downgraded to warnings in gc mode by their analyzers.

use super::{DiagnosticMessage, Severity};

/// Stable numeric constants for every GS diagnostic code.
pub mod codes {
    // GS1xx - good-parts subset violations
    pub const WITH_STATEMENT: u32 = 101;
    pub const EVAL_CALL: u32 = 102;
    pub const ARGUMENTS_OBJECT: u32 = 103;
    pub const FOR_IN_LOOP: u32 = 104;
    pub const VAR_DECLARATION: u32 = 105;
    pub const LOOSE_EQUALITY: u32 = 106;
    pub const LOOSE_INEQUALITY: u32 = 107;
    pub const THIS_OUTSIDE_METHOD: u32 = 108;
    pub const ANY_TYPE: u32 = 109;
    pub const TRUTHY_CHECK: u32 = 110;
    pub const DELETE_OPERATOR: u32 = 111;
    pub const COMMA_EXPRESSION: u32 = 112;
    pub const SWITCH_FALLTHROUGH: u32 = 113;
    pub const VOID_OPERATOR: u32 = 115;
    pub const PRIMITIVE_WRAPPER_NEW: u32 = 116;
    pub const PROTOTYPE_MUTATION: u32 = 126;
    pub const DYNAMIC_IMPORT_PATH: u32 = 127;

    // GS3xx - ownership graph
    pub const SHARE_SELF_LOOP: u32 = 301;
    pub const SHARE_CYCLE: u32 = 302;

    // GS4xx - null safety / escape
    pub const USE_IN_FIELD: u32 = 401;
    pub const USE_AS_RETURN_TYPE: u32 = 402;
    pub const USE_RETURNED: u32 = 403;

    // GS9xx - compiler-internal
    pub const INTERNAL_ERROR: u32 = 900;
    pub const UNRESOLVED_ALIAS: u32 = 901;
    pub const SCC_DEPTH_LIMIT: u32 = 902;
}

/// Every GS diagnostic the compiler can produce.
pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: codes::WITH_STATEMENT,
        severity: Severity::Error,
        message: "'with' statements are not part of the GoodScript subset",
    },
    DiagnosticMessage {
        code: codes::EVAL_CALL,
        severity: Severity::Error,
        message: "'eval' and the Function constructor are not part of the GoodScript subset",
    },
    DiagnosticMessage {
        code: codes::ARGUMENTS_OBJECT,
        severity: Severity::Error,
        message: "the implicit 'arguments' object is not part of the GoodScript subset",
    },
    DiagnosticMessage {
        code: codes::FOR_IN_LOOP,
        severity: Severity::Error,
        message: "'for...in' loops are not part of the GoodScript subset; iterate entries explicitly",
    },
    DiagnosticMessage {
        code: codes::VAR_DECLARATION,
        severity: Severity::Error,
        message: "'var' declarations are not part of the GoodScript subset; use 'let' or 'const'",
    },
    DiagnosticMessage {
        code: codes::LOOSE_EQUALITY,
        severity: Severity::Error,
        message: "loose equality '==' is not part of the GoodScript subset; use '==='",
    },
    DiagnosticMessage {
        code: codes::LOOSE_INEQUALITY,
        severity: Severity::Error,
        message: "loose inequality '!=' is not part of the GoodScript subset; use '!=='",
    },
    DiagnosticMessage {
        code: codes::THIS_OUTSIDE_METHOD,
        severity: Severity::Error,
        message: "'this' is only allowed inside class methods and arrow lambdas",
    },
    DiagnosticMessage {
        code: codes::ANY_TYPE,
        severity: Severity::Error,
        message: "the 'any' type is not part of the GoodScript subset",
    },
    DiagnosticMessage {
        code: codes::TRUTHY_CHECK,
        severity: Severity::Error,
        message: "conditions must be boolean; compare against null/undefined or a boolean literal",
    },
    DiagnosticMessage {
        code: codes::DELETE_OPERATOR,
        severity: Severity::Error,
        message: "the 'delete' operator is not part of the GoodScript subset",
    },
    DiagnosticMessage {
        code: codes::COMMA_EXPRESSION,
        severity: Severity::Error,
        message: "comma expressions are not part of the GoodScript subset",
    },
    DiagnosticMessage {
        code: codes::SWITCH_FALLTHROUGH,
        severity: Severity::Error,
        message: "a non-empty switch case must end with 'break', 'return', 'throw', or 'continue'",
    },
    DiagnosticMessage {
        code: codes::VOID_OPERATOR,
        severity: Severity::Error,
        message: "'void' as an operator is not part of the GoodScript subset",
    },
    DiagnosticMessage {
        code: codes::PRIMITIVE_WRAPPER_NEW,
        severity: Severity::Error,
        message: "'new {0}(...)' is not allowed; use the conversion call '{0}(...)' instead",
    },
    DiagnosticMessage {
        code: codes::PROTOTYPE_MUTATION,
        severity: Severity::Error,
        message: "prototype mutation and '__proto__' access are not part of the GoodScript subset",
    },
    DiagnosticMessage {
        code: codes::DYNAMIC_IMPORT_PATH,
        severity: Severity::Error,
        message: "dynamic module loads require a string literal path",
    },
    DiagnosticMessage {
        code: codes::SHARE_SELF_LOOP,
        severity: Severity::Error,
        message: "Self-referencing share<T> detected: class '{0}' has field '{1}' of type share<{0}>",
    },
    DiagnosticMessage {
        code: codes::SHARE_CYCLE,
        severity: Severity::Error,
        message: "Ownership cycle detected among share<T> fields: {0}",
    },
    DiagnosticMessage {
        code: codes::USE_IN_FIELD,
        severity: Severity::Error,
        message: "use<T> may not appear in fields or interface properties; found on '{0}'",
    },
    DiagnosticMessage {
        code: codes::USE_AS_RETURN_TYPE,
        severity: Severity::Error,
        message: "use<T> may not appear as a return type",
    },
    DiagnosticMessage {
        code: codes::USE_RETURNED,
        severity: Severity::Error,
        message: "cannot return '{0}': its type is use<T>, which may not escape the function",
    },
    DiagnosticMessage {
        code: codes::INTERNAL_ERROR,
        severity: Severity::Error,
        message: "internal compiler error: {0}",
    },
    DiagnosticMessage {
        code: codes::UNRESOLVED_ALIAS,
        severity: Severity::Error,
        message: "internal compiler error: cannot resolve type alias '{0}'",
    },
    DiagnosticMessage {
        code: codes::SCC_DEPTH_LIMIT,
        severity: Severity::Error,
        message: "internal compiler error: ownership cycle detection exceeded the depth limit of {0}",
    },
];
