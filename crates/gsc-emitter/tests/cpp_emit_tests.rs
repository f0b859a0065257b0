//! C++ backend scenarios: struct interning, builder rewrites in emitted
//! code, entry-point synthesis, pointer shapes, sanitization, source maps.

use gsc_ast::ProgramSymbols;
use gsc_common::{CompilerOptions, EmitTarget, MemoryMode};
use gsc_emitter::{CppEmitter, Emitter, emitter_for};
use gsc_lowering::{lower_module, peephole};

fn lower(json: &str) -> gsc_ir::Module {
    let module = gsc_ast::module_from_json(json).expect("test module should deserialize");
    let symbols = ProgramSymbols::from_modules([&module]);
    let mut module =
        lower_module(&module, &symbols, &CompilerOptions::default()).expect("lowering");
    peephole::optimize_module(&mut module);
    module
}

fn emit(json: &str, mode: MemoryMode) -> gsc_emitter::EmitOutput {
    let module = lower(json);
    CppEmitter::new(mode, false)
        .emit_module(&module)
        .expect("emission")
}

#[test]
fn empty_module_emits_empty_namespace_and_no_entry_point() {
    let output = emit(r#"{"path": "empty.gs", "items": []}"#, MemoryMode::Gc);
    let header = &output["empty.h"];
    let implementation = &output["empty.cpp"];
    assert!(header.contains("namespace gs {"));
    assert!(header.contains("namespace empty {"));
    assert!(!implementation.contains("int main"));
}

#[test]
fn init_statements_synthesize_the_entry_point() {
    let output = emit(
        r#"{"path": "main.gs", "items": [
            {"kind": "function", "name": "run", "params": [],
             "returnType": {"kind": "named", "name": "void"}, "body": []},
            {"kind": "expression", "expr":
               {"kind": "call",
                "callee": {"kind": "identifier", "name": "run", "type": {"kind": "function", "params": [], "returnType": {"kind": "named", "name": "void"}}},
                "args": [], "type": {"kind": "named", "name": "void"}}}
        ]}"#,
        MemoryMode::Gc,
    );
    let implementation = &output["main.cpp"];
    assert!(implementation.contains("void __init() {"));
    assert!(implementation.contains("int main(int argc, char** argv) {"));
    assert!(implementation.contains("gs::init_args(argc, argv);"));
    assert!(implementation.contains("gs::main_::__init();"));
}

#[test]
fn struct_interning_emits_one_definition_for_both_orders() {
    // Two object literals, {x, y} and {y, x}, same field types.
    let output = emit(
        r#"{"path": "pts.gs", "items": [
            {"kind": "const", "name": "A",
             "type": {"kind": "object", "fields": [
                {"name": "x", "type": {"kind": "named", "name": "number"}},
                {"name": "y", "type": {"kind": "named", "name": "number"}}]},
             "initializer": {"kind": "objectLiteral",
                "properties": [
                  {"name": "x", "value": {"kind": "literal", "value": {"kind": "number", "value": 1}}},
                  {"name": "y", "value": {"kind": "literal", "value": {"kind": "number", "value": 2}}}],
                "type": {"kind": "object", "fields": [
                  {"name": "x", "type": {"kind": "named", "name": "number"}},
                  {"name": "y", "type": {"kind": "named", "name": "number"}}]}}},
            {"kind": "const", "name": "B",
             "type": {"kind": "object", "fields": [
                {"name": "y", "type": {"kind": "named", "name": "number"}},
                {"name": "x", "type": {"kind": "named", "name": "number"}}]},
             "initializer": {"kind": "objectLiteral",
                "properties": [
                  {"name": "y", "value": {"kind": "literal", "value": {"kind": "number", "value": 3}}},
                  {"name": "x", "value": {"kind": "literal", "value": {"kind": "number", "value": 4}}}],
                "type": {"kind": "object", "fields": [
                  {"name": "y", "type": {"kind": "named", "name": "number"}},
                  {"name": "x", "type": {"kind": "named", "name": "number"}}]}}}
        ]}"#,
        MemoryMode::Gc,
    );
    let header = &output["pts.h"];
    assert_eq!(header.matches("struct AnonymousStruct0 {").count(), 1);
    assert!(!header.contains("AnonymousStruct1"));
    // Both literals reference the single definition.
    let implementation = &output["pts.cpp"];
    assert_eq!(implementation.matches("AnonymousStruct0{").count(), 2);
}

#[test]
fn loop_accumulation_emits_builder_around_the_loop() {
    let output = emit(
        r#"{"path": "m.gs", "items": [
            {"kind": "function", "name": "repeat",
             "params": [{"name": "s", "type": {"kind": "named", "name": "string"}}],
             "returnType": {"kind": "named", "name": "string"},
             "body": [
               {"kind": "variableDeclaration", "keyword": "let", "name": "r",
                "type": {"kind": "named", "name": "string"},
                "initializer": {"kind": "literal", "value": {"kind": "string", "value": ""}}},
               {"kind": "for",
                "init": {"kind": "variableDeclaration", "keyword": "let", "name": "i",
                         "type": {"kind": "named", "name": "int"},
                         "initializer": {"kind": "literal", "value": {"kind": "number", "value": 0}}},
                "cond": {"kind": "binary", "op": "<",
                         "left": {"kind": "identifier", "name": "i", "type": {"kind": "named", "name": "int"}},
                         "right": {"kind": "literal", "value": {"kind": "number", "value": 100}},
                         "type": {"kind": "named", "name": "boolean"}},
                "update": {"kind": "assign", "op": "=",
                           "target": {"kind": "identifier", "name": "i", "type": {"kind": "named", "name": "int"}},
                           "value": {"kind": "binary", "op": "+",
                                     "left": {"kind": "identifier", "name": "i", "type": {"kind": "named", "name": "int"}},
                                     "right": {"kind": "literal", "value": {"kind": "number", "value": 1}},
                                     "type": {"kind": "named", "name": "int"}}},
                "body": [
                  {"kind": "expression", "expr":
                     {"kind": "assign", "op": "=",
                      "target": {"kind": "identifier", "name": "r", "type": {"kind": "named", "name": "string"}},
                      "value": {"kind": "binary", "op": "+",
                                "left": {"kind": "identifier", "name": "r", "type": {"kind": "named", "name": "string"}},
                                "right": {"kind": "identifier", "name": "s", "type": {"kind": "named", "name": "string"}},
                                "type": {"kind": "named", "name": "string"}}}}]},
               {"kind": "return", "value": {"kind": "identifier", "name": "r", "type": {"kind": "named", "name": "string"}}}]}
        ]}"#,
        MemoryMode::Gc,
    );
    let implementation = &output["m.cpp"];
    let builder_decl = implementation.find("gs::StringBuilder __sb0;").expect("builder decl");
    let loop_start = implementation.find("for (").expect("loop");
    let append = implementation.find("__sb0.append(s);").expect("in-loop append");
    let finish = implementation.find("r = __sb0.str();").expect("finalize");
    assert!(builder_decl < loop_start, "builder allocated before the loop");
    assert!(loop_start < append, "append happens inside the loop");
    assert!(append < finish, "finalized string assigned after the loop");
}

#[test]
fn pointer_shapes_follow_memory_mode() {
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "Pool", "fields": []},
        {"kind": "class", "name": "Item", "fields": [
            {"name": "owner", "type": {"kind": "named", "name": "own", "typeArgs": [{"kind": "named", "name": "Pool"}]}},
            {"name": "shared", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "Pool"}]}},
            {"name": "weak", "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}}]}
    ]}"#;

    let ownership = emit(json, MemoryMode::Ownership);
    let header = &ownership["m.h"];
    assert!(header.contains("gs::Own<Pool> owner"));
    assert!(header.contains("gs::Share<Pool> shared"));
    assert!(header.contains("gs::Use<Pool> weak"));

    let gc = emit(json, MemoryMode::Gc);
    let header = &gc["m.h"];
    assert!(header.contains("Pool* owner"));
    assert!(header.contains("Pool* shared"));
    assert!(header.contains("Pool* weak"));
    assert!(header.contains("class Item : public gs::Object"));
}

#[test]
fn keyword_and_runtime_clashes_are_sanitized() {
    let output = emit(
        r#"{"path": "m.gs", "items": [
            {"kind": "function", "name": "operator",
             "params": [{"name": "class", "type": {"kind": "named", "name": "int"}}],
             "returnType": {"kind": "named", "name": "int"},
             "body": [{"kind": "return", "value": {"kind": "identifier", "name": "class", "type": {"kind": "named", "name": "int"}}}]}
        ]}"#,
        MemoryMode::Gc,
    );
    let header = &output["m.h"];
    assert!(header.contains("int32_t operator_(int32_t class_);"));
}

#[test]
fn member_access_does_not_sanitize_runtime_names() {
    let output = emit(
        r#"{"path": "m.gs", "items": [
            {"kind": "class", "name": "Meta", "fields": [
                {"name": "String", "type": {"kind": "named", "name": "string"}}]},
            {"kind": "function", "name": "read",
             "params": [{"name": "meta", "type": {"kind": "named", "name": "Meta"}}],
             "returnType": {"kind": "named", "name": "string"},
             "body": [{"kind": "return", "value":
                {"kind": "member",
                 "object": {"kind": "identifier", "name": "meta", "type": {"kind": "named", "name": "Meta"}},
                 "member": "String", "type": {"kind": "named", "name": "string"}}}]}
        ]}"#,
        MemoryMode::Gc,
    );
    // Field names live behind a member access and only keyword clashes are
    // suffixed; the qualified runtime type cannot be shadowed.
    let header = &output["m.h"];
    assert!(header.contains("gs::String String;"));
    let implementation = &output["m.cpp"];
    assert!(implementation.contains("meta->String"));
}

#[test]
fn async_functions_emit_coroutine_tasks() {
    let output = emit(
        r#"{"path": "m.gs", "items": [
            {"kind": "function", "name": "tick", "params": [], "isAsync": true,
             "returnType": {"kind": "named", "name": "Promise", "typeArgs": [{"kind": "named", "name": "int"}]},
             "body": [{"kind": "return", "value": {"kind": "literal", "value": {"kind": "number", "value": 1}}}]}
        ]}"#,
        MemoryMode::Gc,
    );
    let header = &output["m.h"];
    assert!(header.contains("gs::Task<int32_t> tick();"));
    let implementation = &output["m.cpp"];
    assert!(implementation.contains("co_return 1.0;"));
}

#[test]
fn source_map_directives_point_at_origins() {
    let json = r#"{"path": "src/app.gs", "items": [
        {"kind": "function", "name": "go", "params": [],
         "returnType": {"kind": "named", "name": "void"},
         "body": [], "loc": {"line": 12, "column": 1}}
    ]}"#;
    let module = lower(json);
    let output = CppEmitter::new(MemoryMode::Gc, true)
        .emit_module(&module)
        .expect("emission");
    assert!(output["app.cpp"].contains("#line 12 \"src/app.gs\""));

    let without = CppEmitter::new(MemoryMode::Gc, false)
        .emit_module(&module)
        .expect("emission");
    assert!(!without["app.cpp"].contains("#line"));
}

#[test]
fn imports_rewrite_to_header_includes() {
    let output = emit(
        r#"{"path": "m.gs",
            "imports": [{"from": "./lib/util.gs", "names": [{"name": "helper"}]}],
            "items": []}"#,
        MemoryMode::Gc,
    );
    assert!(output["m.h"].contains("#include \"util.h\""));
}

#[test]
fn emitter_for_selects_backends() {
    let module = lower(r#"{"path": "m.gs", "items": []}"#);
    let mut cpp = emitter_for(&CompilerOptions {
        target: EmitTarget::Cpp,
        ..CompilerOptions::default()
    });
    assert!(cpp.emit_module(&module).unwrap().contains_key("m.h"));
    let mut gs = emitter_for(&CompilerOptions {
        target: EmitTarget::GoodScript,
        ..CompilerOptions::default()
    });
    assert!(gs.emit_module(&module).unwrap().contains_key("m.gs"));
}
