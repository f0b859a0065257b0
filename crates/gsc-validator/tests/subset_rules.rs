//! One scenario per GS1xx rule, driven through the JSON AST contract the
//! parser collaborator uses.

use gsc_validator::validate_module;

fn validate(items_json: &str) -> Vec<gsc_common::Diagnostic> {
    let json = format!(r#"{{"path": "test.gs", "items": {items_json}}}"#);
    let module = gsc_ast::module_from_json(&json).expect("test module should deserialize");
    validate_module(&module)
}

fn codes(diags: &[gsc_common::Diagnostic]) -> Vec<u32> {
    diags.iter().map(|d| d.code).collect()
}

#[test]
fn gs101_with_statement() {
    let diags = validate(
        r#"[{"kind": "with",
            "object": {"kind": "identifier", "name": "x", "type": {"kind": "named", "name": "Box"}},
            "body": [], "loc": {"line": 4, "column": 2}}]"#,
    );
    assert_eq!(codes(&diags), vec![101]);
    assert!(diags[0].is_error());
    assert_eq!(diags[0].loc.as_ref().unwrap().line, 4);
}

#[test]
fn gs102_eval_and_function_constructor() {
    let diags = validate(
        r#"[{"kind": "expression", "expr":
              {"kind": "call",
               "callee": {"kind": "identifier", "name": "eval", "type": {"kind": "function", "params": [], "returnType": {"kind": "named", "name": "void"}}},
               "args": [], "type": {"kind": "named", "name": "void"}}},
            {"kind": "expression", "expr":
              {"kind": "new", "className": "Function", "args": []}}]"#,
    );
    assert_eq!(codes(&diags), vec![102, 102]);
}

#[test]
fn gs103_arguments_object() {
    let diags = validate(
        r#"[{"kind": "expression", "expr":
              {"kind": "identifier", "name": "arguments", "type": {"kind": "named", "name": "Array"}}}]"#,
    );
    assert_eq!(codes(&diags), vec![103]);
}

#[test]
fn gs104_for_in_loop() {
    let diags = validate(
        r#"[{"kind": "forIn", "variable": "k",
            "object": {"kind": "identifier", "name": "m", "type": {"kind": "named", "name": "Map"}},
            "body": []}]"#,
    );
    assert_eq!(codes(&diags), vec![104]);
}

#[test]
fn gs105_var_declaration() {
    let diags = validate(
        r#"[{"kind": "variableDeclaration", "keyword": "var", "name": "x",
            "initializer": {"kind": "literal", "value": {"kind": "number", "value": 1}}}]"#,
    );
    assert_eq!(codes(&diags), vec![105]);
}

#[test]
fn gs106_gs107_loose_equality() {
    let diags = validate(
        r#"[{"kind": "if",
            "cond": {"kind": "binary", "op": "==",
                     "left": {"kind": "identifier", "name": "a", "type": {"kind": "named", "name": "number"}},
                     "right": {"kind": "literal", "value": {"kind": "number", "value": 0}},
                     "type": {"kind": "named", "name": "boolean"}},
            "then": []},
           {"kind": "if",
            "cond": {"kind": "binary", "op": "!=",
                     "left": {"kind": "identifier", "name": "a", "type": {"kind": "named", "name": "number"}},
                     "right": {"kind": "literal", "value": {"kind": "null"}},
                     "type": {"kind": "named", "name": "boolean"}},
            "then": []}]"#,
    );
    assert_eq!(codes(&diags), vec![106, 107]);
}

#[test]
fn gs108_this_outside_method() {
    // `this` in a free function is out; the same expression inside a class
    // method is fine.
    let diags = validate(
        r#"[{"kind": "function", "name": "f", "params": [],
            "returnType": {"kind": "named", "name": "void"},
            "body": [{"kind": "expression", "expr": {"kind": "this"}}]}]"#,
    );
    assert_eq!(codes(&diags), vec![108]);

    let diags = validate(
        r#"[{"kind": "class", "name": "C",
            "methods": [{"name": "m", "params": [],
                         "returnType": {"kind": "named", "name": "void"},
                         "body": [{"kind": "expression", "expr": {"kind": "this"}}]}]}]"#,
    );
    assert!(diags.is_empty());
}

#[test]
fn gs108_function_expression_loses_this() {
    let diags = validate(
        r#"[{"kind": "class", "name": "C",
            "methods": [{"name": "m", "params": [],
                         "returnType": {"kind": "named", "name": "void"},
                         "body": [{"kind": "expression", "expr":
                            {"kind": "lambda", "params": [], "isArrow": false,
                             "body": {"kind": "block", "body": [
                               {"kind": "expression", "expr": {"kind": "this"}}]}}}]}]}]"#,
    );
    assert_eq!(codes(&diags), vec![108]);
}

#[test]
fn gs109_any_type() {
    let diags = validate(
        r#"[{"kind": "variableDeclaration", "keyword": "let", "name": "x",
            "type": {"kind": "any"}}]"#,
    );
    assert_eq!(codes(&diags), vec![109]);
}

#[test]
fn gs110_truthy_check() {
    let diags = validate(
        r#"[{"kind": "while",
            "cond": {"kind": "identifier", "name": "s", "type": {"kind": "named", "name": "string"}},
            "body": []}]"#,
    );
    assert_eq!(codes(&diags), vec![110]);

    // An explicit null comparison is fine.
    let diags = validate(
        r#"[{"kind": "while",
            "cond": {"kind": "binary", "op": "!==",
                     "left": {"kind": "identifier", "name": "s", "type": {"kind": "named", "name": "string"}},
                     "right": {"kind": "literal", "value": {"kind": "null"}},
                     "type": {"kind": "named", "name": "boolean"}},
            "body": []}]"#,
    );
    assert!(diags.is_empty());
}

#[test]
fn gs111_delete_operator() {
    let diags = validate(
        r#"[{"kind": "expression", "expr":
              {"kind": "unary", "op": "delete",
               "operand": {"kind": "member",
                           "object": {"kind": "identifier", "name": "o", "type": {"kind": "named", "name": "Box"}},
                           "member": "f", "type": {"kind": "named", "name": "number"}}}}]"#,
    );
    assert_eq!(codes(&diags), vec![111]);
}

#[test]
fn gs112_comma_expression() {
    let diags = validate(
        r#"[{"kind": "expression", "expr":
              {"kind": "comma", "exprs": [
                 {"kind": "identifier", "name": "a", "type": {"kind": "named", "name": "number"}},
                 {"kind": "identifier", "name": "b", "type": {"kind": "named", "name": "number"}}]}}]"#,
    );
    assert_eq!(codes(&diags), vec![112]);
}

#[test]
fn gs113_switch_fallthrough() {
    let diags = validate(
        r#"[{"kind": "switch",
            "subject": {"kind": "identifier", "name": "n", "type": {"kind": "named", "name": "int"}},
            "cases": [
              {"test": {"kind": "literal", "value": {"kind": "number", "value": 1}},
               "body": [{"kind": "expression", "expr":
                          {"kind": "call",
                           "callee": {"kind": "identifier", "name": "f", "type": {"kind": "function", "params": [], "returnType": {"kind": "named", "name": "void"}}},
                           "args": [], "type": {"kind": "named", "name": "void"}}}],
               "loc": {"line": 3, "column": 5}},
              {"body": [{"kind": "break"}]}
            ]}]"#,
    );
    assert_eq!(codes(&diags), vec![113]);
}

#[test]
fn gs113_terminated_cases_and_empty_groups_pass() {
    let diags = validate(
        r#"[{"kind": "switch",
            "subject": {"kind": "identifier", "name": "n", "type": {"kind": "named", "name": "int"}},
            "cases": [
              {"test": {"kind": "literal", "value": {"kind": "number", "value": 1}}, "body": []},
              {"test": {"kind": "literal", "value": {"kind": "number", "value": 2}},
               "body": [{"kind": "break"}]},
              {"body": [{"kind": "return"}]}
            ]}]"#,
    );
    assert!(diags.is_empty());
}

#[test]
fn gs115_void_operator() {
    let diags = validate(
        r#"[{"kind": "expression", "expr":
              {"kind": "unary", "op": "void",
               "operand": {"kind": "literal", "value": {"kind": "number", "value": 0}}}}]"#,
    );
    assert_eq!(codes(&diags), vec![115]);
}

#[test]
fn gs116_primitive_wrapper_new() {
    let diags = validate(r#"[{"kind": "expression", "expr": {"kind": "new", "className": "String", "args": []}}]"#);
    assert_eq!(codes(&diags), vec![116]);
    assert!(diags[0].message.contains("'String(...)'"));

    // The conversion call form stays legal.
    let diags = validate(
        r#"[{"kind": "expression", "expr":
              {"kind": "call",
               "callee": {"kind": "identifier", "name": "String", "type": {"kind": "function", "params": [], "returnType": {"kind": "named", "name": "string"}}},
               "args": [{"kind": "literal", "value": {"kind": "number", "value": 3}}],
               "type": {"kind": "named", "name": "string"}}}]"#,
    );
    assert!(diags.is_empty());
}

#[test]
fn gs126_prototype_mutation() {
    let diags = validate(
        r#"[{"kind": "expression", "expr":
              {"kind": "member",
               "object": {"kind": "identifier", "name": "C", "type": {"kind": "named", "name": "C"}},
               "member": "prototype", "type": {"kind": "any"}}}]"#,
    );
    assert_eq!(codes(&diags), vec![126]);
}

#[test]
fn gs127_dynamic_import_path() {
    let diags = validate(
        r#"[{"kind": "expression", "expr":
              {"kind": "call",
               "callee": {"kind": "identifier", "name": "require", "type": {"kind": "function", "params": [], "returnType": {"kind": "any"}}},
               "args": [{"kind": "identifier", "name": "path", "type": {"kind": "named", "name": "string"}}],
               "type": {"kind": "any"}}}]"#,
    );
    assert_eq!(codes(&diags), vec![127]);
}

#[test]
fn clean_module_produces_no_diagnostics() {
    let diags = validate(
        r#"[{"kind": "class", "name": "Point",
            "fields": [
              {"name": "x", "type": {"kind": "named", "name": "number"}},
              {"name": "y", "type": {"kind": "named", "name": "number"}}],
            "methods": [{"name": "len", "params": [],
                         "returnType": {"kind": "named", "name": "number"},
                         "body": [{"kind": "return", "value":
                            {"kind": "member", "object": {"kind": "this"},
                             "member": "x", "type": {"kind": "named", "name": "number"}}}]}]}]"#,
    );
    assert!(diags.is_empty(), "unexpected: {diags:?}");
}

#[test]
fn validation_is_deterministic() {
    let json = r#"{"path": "t.gs", "items": [
        {"kind": "with", "object": {"kind": "identifier", "name": "x", "type": {"kind": "named", "name": "Box"}}, "body": []},
        {"kind": "expression", "expr": {"kind": "unary", "op": "void", "operand": {"kind": "literal", "value": {"kind": "number", "value": 0}}}}
    ]}"#;
    let module = gsc_ast::module_from_json(json).unwrap();
    let first = validate_module(&module);
    let second = validate_module(&module);
    assert_eq!(first, second);
    assert_eq!(codes(&first), vec![101, 115]);
}
