//! Ownership-graph scenarios, driven end-to-end from JSON ASTs through
//! lowering and the analyzer.

use gsc_analysis::analyze_ownership;
use gsc_ast::ProgramSymbols;
use gsc_common::{CompilerOptions, MemoryMode, Severity};
use gsc_lowering::lower_module;

fn lower(json: &str) -> gsc_ir::Module {
    let module = gsc_ast::module_from_json(json).expect("test module should deserialize");
    let symbols = ProgramSymbols::from_modules([&module]);
    lower_module(&module, &symbols, &CompilerOptions::default()).expect("lowering")
}

fn analyze(json: &str, mode: MemoryMode) -> Vec<gsc_common::Diagnostic> {
    let module = lower(json);
    analyze_ownership(std::slice::from_ref(&module), mode)
}

const SELF_LOOP: &str = r#"{"path": "m.gs", "items": [
    {"kind": "class", "name": "Node", "fields": [
        {"name": "next",
         "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "Node"}]},
         "loc": {"line": 2, "column": 5}}]}
]}"#;

const THREE_CYCLE: &str = r#"{"path": "m.gs", "items": [
    {"kind": "class", "name": "A", "fields": [
        {"name": "b", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "B"}]}}]},
    {"kind": "class", "name": "B", "fields": [
        {"name": "c", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "C"}]}}]},
    {"kind": "class", "name": "C", "fields": [
        {"name": "a", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "A"}]}}]}
]}"#;

const POOL_PATTERN: &str = r#"{"path": "m.gs", "items": [
    {"kind": "class", "name": "Pool", "fields": [
        {"name": "items", "type": {"kind": "named", "name": "Array", "typeArgs": [
            {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "Item"}]}]}}]},
    {"kind": "class", "name": "Item", "fields": [
        {"name": "pool", "type": {"kind": "named", "name": "use", "typeArgs": [{"kind": "named", "name": "Pool"}]}}]}
]}"#;

#[test]
fn self_loop_in_ownership_mode_is_one_gs301_error() {
    let diags = analyze(SELF_LOOP, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    let diag = &diags[0];
    assert_eq!(diag.code, 301);
    assert_eq!(diag.severity, Severity::Error);
    assert!(diag.message.contains("'Node'"));
    assert!(diag.message.contains("'next'"));
    assert_eq!(diag.loc.as_ref().unwrap().line, 2);
}

#[test]
fn three_cycle_is_one_gs302_visiting_every_member() {
    let diags = analyze(THREE_CYCLE, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    let diag = &diags[0];
    assert_eq!(diag.code, 302);
    assert_eq!(diag.severity, Severity::Error);
    for segment in ["A.b", "B.c", "C.a"] {
        assert!(
            diag.message.contains(segment),
            "cycle should mention {segment}: {}",
            diag.message
        );
    }
}

#[test]
fn pool_pattern_with_weak_backref_is_clean() {
    let diags = analyze(POOL_PATTERN, MemoryMode::Ownership);
    assert!(diags.is_empty(), "unexpected: {diags:?}");
}

#[test]
fn gc_mode_downgrades_everything_to_warnings() {
    let errors = analyze(SELF_LOOP, MemoryMode::Ownership);
    let warnings = analyze(SELF_LOOP, MemoryMode::Gc);
    assert_eq!(errors.len(), warnings.len());
    assert!(warnings.iter().all(|d| d.severity == Severity::Warning));
    assert!(errors.iter().all(|d| d.severity == Severity::Error));

    let errors = analyze(THREE_CYCLE, MemoryMode::Ownership);
    let warnings = analyze(THREE_CYCLE, MemoryMode::Gc);
    assert_eq!(errors.len(), warnings.len());
    assert!(warnings.iter().all(|d| d.severity == Severity::Warning));
}

#[test]
fn deeply_nested_share_self_reference_is_exactly_one_gs301() {
    // A struct inside an array inside a map value, containing share<Outer>.
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "Outer", "fields": [
            {"name": "registry", "type":
                {"kind": "named", "name": "Map", "typeArgs": [
                    {"kind": "named", "name": "string"},
                    {"kind": "named", "name": "Array", "typeArgs": [
                        {"kind": "object", "fields": [
                            {"name": "backref", "type":
                                {"kind": "named", "name": "share", "typeArgs": [
                                    {"kind": "named", "name": "Outer"}]}}]}]}]}}]}
    ]}"#;
    let diags = analyze(json, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 301);
    assert!(diags[0].message.contains("'registry'"));
}

#[test]
fn share_through_alias_is_still_detected() {
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "typeAlias", "name": "SelfRef",
         "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "Wrapper"}]}},
        {"kind": "class", "name": "Wrapper", "fields": [
            {"name": "inner", "type": {"kind": "named", "name": "SelfRef"}}]}
    ]}"#;
    let diags = analyze(json, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 301);
}

#[test]
fn union_variant_share_participates_in_cycles() {
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "Tree", "fields": [
            {"name": "child", "type": {"kind": "union", "variants": [
                {"kind": "named", "name": "string"},
                {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "Tree"}]}]}}]}
    ]}"#;
    let diags = analyze(json, MemoryMode::Ownership);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 301);
    assert!(diags[0].message.contains("'child'"));
}

#[test]
fn own_fields_never_form_cycles() {
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "Tree", "fields": [
            {"name": "left", "type": {"kind": "named", "name": "own", "typeArgs": [{"kind": "named", "name": "Tree"}]}},
            {"name": "right", "type": {"kind": "named", "name": "own", "typeArgs": [{"kind": "named", "name": "Tree"}]}}]}
    ]}"#;
    assert!(analyze(json, MemoryMode::Ownership).is_empty());
}

#[test]
fn analysis_is_deterministic_across_runs() {
    let first = analyze(THREE_CYCLE, MemoryMode::Ownership);
    let second = analyze(THREE_CYCLE, MemoryMode::Ownership);
    assert_eq!(first, second);
}

#[test]
fn two_separate_cycles_get_two_reports() {
    let json = r#"{"path": "m.gs", "items": [
        {"kind": "class", "name": "A", "fields": [
            {"name": "b", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "B"}]}}]},
        {"kind": "class", "name": "B", "fields": [
            {"name": "a", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "A"}]}}]},
        {"kind": "class", "name": "Solo", "fields": [
            {"name": "me", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "Solo"}]}}]}
    ]}"#;
    let diags = analyze(json, MemoryMode::Ownership);
    let codes: Vec<u32> = diags.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![301, 302]);
}
