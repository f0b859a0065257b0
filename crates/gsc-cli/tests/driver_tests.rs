//! End-to-end driver scenarios: gating, validate-only, emission skipping,
//! diagnostic ordering.

use std::fs;
use std::path::PathBuf;

use gsc_cli::driver;
use gsc_common::{CompilerOptions, EmitTarget, MemoryMode};

fn write_module(dir: &tempfile::TempDir, name: &str, json: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, json).expect("write test module");
    path
}

const CLEAN: &str = r#"{"path": "clean.gs", "items": [
    {"kind": "class", "name": "Point", "fields": [
        {"name": "x", "type": {"kind": "named", "name": "number"}},
        {"name": "y", "type": {"kind": "named", "name": "number"}}]}
]}"#;

const SELF_LOOP: &str = r#"{"path": "looped.gs", "items": [
    {"kind": "class", "name": "Node", "fields": [
        {"name": "next", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "Node"}]}}]}
]}"#;

const SUBSET_VIOLATION: &str = r#"{"path": "bad.gs", "items": [
    {"kind": "with",
     "object": {"kind": "identifier", "name": "x", "type": {"kind": "named", "name": "Box"}},
     "body": []}
]}"#;

#[test]
fn clean_module_emits_artifacts_and_no_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(&dir, "clean.ast.json", CLEAN);
    let out = tempfile::tempdir().unwrap();
    let result = driver::compile(
        &[input],
        &CompilerOptions::default(),
        Some(out.path()),
    )
    .unwrap();
    assert!(result.diagnostics.is_empty());
    assert!(!result.has_errors());
    let names: Vec<String> = result
        .emitted_files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["clean.h", "clean.cpp"]);
    assert!(out.path().join("clean.h").exists());
}

#[test]
fn ownership_errors_block_emission() {
    // The fields here carry no source locations, so the finding cannot be
    // attributed to a module and emission stops entirely.
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(&dir, "looped.ast.json", SELF_LOOP);
    let out = tempfile::tempdir().unwrap();
    let options = CompilerOptions {
        memory_mode: MemoryMode::Ownership,
        ..CompilerOptions::default()
    };
    let result = driver::compile(&[input], &options, Some(out.path())).unwrap();
    assert!(result.has_errors());
    assert_eq!(result.diagnostics[0].code, 301);
    assert!(result.emitted_files.is_empty());
}

#[test]
fn an_ownership_fatal_module_does_not_block_its_neighbors() {
    // The self-loop finding carries its source location, so only the
    // implicated module is dropped from emission.
    let dir = tempfile::tempdir().unwrap();
    let looped = write_module(
        &dir,
        "looped.ast.json",
        r#"{"path": "looped.gs", "items": [
            {"kind": "class", "name": "Node", "fields": [
                {"name": "next",
                 "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "Node"}]},
                 "loc": {"line": 2, "column": 5}}]}
        ]}"#,
    );
    let clean = write_module(&dir, "clean.ast.json", CLEAN);
    let out = tempfile::tempdir().unwrap();
    let options = CompilerOptions {
        memory_mode: MemoryMode::Ownership,
        ..CompilerOptions::default()
    };
    let result = driver::compile(&[looped, clean], &options, Some(out.path())).unwrap();
    assert!(result.has_errors());
    assert_eq!(result.diagnostics[0].code, 301);
    assert!(out.path().join("clean.h").exists());
    assert!(out.path().join("clean.cpp").exists());
    assert!(!out.path().join("looped.h").exists());
}

#[test]
fn gc_mode_warns_and_still_emits() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(&dir, "looped.ast.json", SELF_LOOP);
    let out = tempfile::tempdir().unwrap();
    let result = driver::compile(
        &[input],
        &CompilerOptions::default(),
        Some(out.path()),
    )
    .unwrap();
    assert!(!result.has_errors());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, 301);
    assert_eq!(result.emitted_files.len(), 2);
}

#[test]
fn a_bad_module_does_not_block_its_neighbors() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_module(&dir, "bad.ast.json", SUBSET_VIOLATION);
    let clean = write_module(&dir, "clean.ast.json", CLEAN);
    let out = tempfile::tempdir().unwrap();
    let result = driver::compile(
        &[bad, clean],
        &CompilerOptions::default(),
        Some(out.path()),
    )
    .unwrap();
    assert!(result.has_errors());
    assert_eq!(result.diagnostics[0].code, 101);
    // The clean module still produced its artifacts.
    assert!(out.path().join("clean.h").exists());
    assert!(!out.path().join("bad.h").exists());
}

#[test]
fn validate_only_stops_before_lowering() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(&dir, "clean.ast.json", CLEAN);
    let out = tempfile::tempdir().unwrap();
    let options = CompilerOptions {
        validate_only: true,
        ..CompilerOptions::default()
    };
    let result = driver::compile(&[input], &options, Some(out.path())).unwrap();
    assert!(result.diagnostics.is_empty());
    assert!(result.emitted_files.is_empty());
}

#[test]
fn skip_validation_still_runs_ownership_checks() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(&dir, "looped.ast.json", SELF_LOOP);
    let out = tempfile::tempdir().unwrap();
    let options = CompilerOptions {
        skip_validation: true,
        memory_mode: MemoryMode::Ownership,
        ..CompilerOptions::default()
    };
    let result = driver::compile(&[input], &options, Some(out.path())).unwrap();
    assert!(result.has_errors());
    assert_eq!(result.diagnostics[0].code, 301);
}

#[test]
fn goodscript_target_emits_single_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_module(&dir, "clean.ast.json", CLEAN);
    let out = tempfile::tempdir().unwrap();
    let options = CompilerOptions {
        target: EmitTarget::GoodScript,
        ..CompilerOptions::default()
    };
    let result = driver::compile(&[input], &options, Some(out.path())).unwrap();
    let names: Vec<String> = result
        .emitted_files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["clean.gs"]);
}

#[test]
fn discover_inputs_scans_directories_deterministically() {
    let dir = tempfile::tempdir().unwrap();
    write_module(&dir, "b.ast.json", CLEAN);
    write_module(&dir, "a.ast.json", CLEAN);
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    let files = driver::discover_inputs(&[dir.path().to_path_buf()]).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.ast.json", "b.ast.json"]);
}

#[test]
fn cross_module_cycles_are_found_at_the_barrier() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_module(
        &dir,
        "a.ast.json",
        r#"{"path": "a.gs", "items": [
            {"kind": "class", "name": "A", "fields": [
                {"name": "b", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "B"}]}}]}
        ]}"#,
    );
    let b = write_module(
        &dir,
        "b.ast.json",
        r#"{"path": "b.gs", "items": [
            {"kind": "class", "name": "B", "fields": [
                {"name": "a", "type": {"kind": "named", "name": "share", "typeArgs": [{"kind": "named", "name": "A"}]}}]}
        ]}"#,
    );
    let out = tempfile::tempdir().unwrap();
    let options = CompilerOptions {
        memory_mode: MemoryMode::Ownership,
        ..CompilerOptions::default()
    };
    let result = driver::compile(&[a, b], &options, Some(out.path())).unwrap();
    assert!(result.has_errors());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, 302);
    assert!(result.diagnostics[0].message.contains("A.b"));
    assert!(result.diagnostics[0].message.contains("B.a"));
}
