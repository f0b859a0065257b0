//! Pipeline orchestration.
//!
//! Per-module work (validate, lower) fans out on the rayon pool; the
//! ownership analyzer needs the whole-program class set and runs behind a
//! barrier. Diagnostics are collected in invocation order: per-module
//! passes first (source order within each module), then the whole-program
//! analyzers.
//!
//! Gating is per module throughout: validation errors, a lowering failure,
//! or an error-severity ownership/null-safety finding drop the implicated
//! module from emission while the rest continue. Analyzer findings are
//! attributed to modules through their source locations; a finding with no
//! location cannot be attributed and stops emission altogether.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info};
use walkdir::WalkDir;

use gsc_analysis::{analyze_ownership, null_safety};
use gsc_ast::{Module as AstModule, ProgramSymbols};
use gsc_common::diagnostics::Diagnostic;
use gsc_common::CompilerOptions;
use gsc_emitter::emitter_for;
use gsc_ir as ir;
use gsc_lowering::{lower_module, peephole};
use gsc_validator::validate_module;

/// Everything a compilation run produced.
#[derive(Debug, Default)]
pub struct CompilationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub emitted_files: Vec<PathBuf>,
    /// `(module name, imported basenames)` in invocation order.
    pub modules: Vec<(String, Vec<String>)>,
}

impl CompilationResult {
    /// Whether any error-severity diagnostic remains.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Expand directories into `*.ast.json` files, in deterministic order.
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.with_context(|| format!("scanning {}", input.display()))?;
                if entry.file_type().is_file()
                    && entry.path().to_string_lossy().ends_with(".ast.json")
                {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Read and deserialize the frontend's module files.
pub fn load_modules(files: &[PathBuf]) -> Result<Vec<AstModule>> {
    files
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            gsc_ast::module_from_json(&text)
                .with_context(|| format!("parsing AST module {}", path.display()))
        })
        .collect()
}

struct ModuleOutcome {
    diagnostics: Vec<Diagnostic>,
    lowered: Option<ir::Module>,
}

/// Run the whole pipeline over the given inputs.
pub fn compile(
    files: &[PathBuf],
    options: &CompilerOptions,
    out_dir: Option<&Path>,
) -> Result<CompilationResult> {
    let ast_modules = load_modules(files)?;
    let symbols = ProgramSymbols::from_modules(ast_modules.iter());
    info!(modules = ast_modules.len(), "compilation started");

    // Fan-out boundary: validation and lowering are per-module and run in
    // parallel; collect() preserves invocation order.
    let outcomes: Vec<ModuleOutcome> = ast_modules
        .par_iter()
        .map(|module| {
            let mut diagnostics = Vec::new();
            if !options.skip_validation {
                diagnostics.extend(validate_module(module));
            }
            if options.validate_only || diagnostics.iter().any(Diagnostic::is_error) {
                return ModuleOutcome {
                    diagnostics,
                    lowered: None,
                };
            }
            match lower_module(module, &symbols, options) {
                Ok(lowered) => ModuleOutcome {
                    diagnostics,
                    lowered: Some(lowered),
                },
                Err(err) => {
                    diagnostics.push(err.into_diagnostic());
                    ModuleOutcome {
                        diagnostics,
                        lowered: None,
                    }
                }
            }
        })
        .collect();

    let mut result = CompilationResult::default();
    let mut lowered: Vec<(PathBuf, ir::Module)> = Vec::new();
    for (path, outcome) in files.iter().zip(outcomes) {
        result.diagnostics.extend(outcome.diagnostics);
        if let Some(module) = outcome.lowered {
            result
                .modules
                .push((
                    module.name.clone(),
                    module.imports.iter().map(|i| i.basename().to_string()).collect(),
                ));
            lowered.push((path.clone(), module));
        }
    }

    if options.validate_only {
        return Ok(result);
    }

    // Barrier: the ownership graph needs every class in the program.
    let modules_only: Vec<ir::Module> = lowered.iter().map(|(_, m)| m.clone()).collect();
    let mut fatal_paths: FxHashSet<String> = FxHashSet::default();
    let mut unattributed_fatal = false;
    let ownership_diags = analyze_ownership(&modules_only, options.memory_mode);
    for diag in &ownership_diags {
        if diag.is_error() {
            match &diag.loc {
                Some(loc) => {
                    fatal_paths.insert(loc.file.clone());
                }
                None => unattributed_fatal = true,
            }
        }
    }
    result.diagnostics.extend(ownership_diags);
    for module in &modules_only {
        let null_diags = null_safety::check_module(module, options.memory_mode);
        if null_diags.iter().any(Diagnostic::is_error) {
            fatal_paths.insert(module.path.clone());
        }
        result.diagnostics.extend(null_diags);
    }
    if unattributed_fatal {
        debug!("unattributed analysis errors present; skipping emission");
        return Ok(result);
    }

    // Peephole + emission, per module; modules implicated in a fatal
    // analysis finding are dropped here. An emitter failure abandons that
    // module and the rest continue.
    let mut emitter = emitter_for(options);
    for (input_path, module) in &mut lowered {
        if fatal_paths.contains(&module.path) {
            debug!(module = %module.name, "fatal analysis findings; not emitted");
            continue;
        }
        peephole::optimize_module(module);
        match emitter.emit_module(module) {
            Ok(output) => {
                let target_dir = match out_dir {
                    Some(dir) => dir.to_path_buf(),
                    None => input_path
                        .parent()
                        .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
                };
                fs::create_dir_all(&target_dir)
                    .with_context(|| format!("creating {}", target_dir.display()))?;
                for (name, text) in output {
                    let path = target_dir.join(name);
                    fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    result.emitted_files.push(path);
                }
            }
            Err(err) => {
                result.diagnostics.push(
                    gsc_common::diagnostics::diagnostic(
                        gsc_common::diagnostics::codes::INTERNAL_ERROR,
                        &[&err.message],
                    )
                    .at_opt(err.loc),
                );
            }
        }
    }

    info!(
        diagnostics = result.diagnostics.len(),
        emitted = result.emitted_files.len(),
        "compilation finished"
    );
    Ok(result)
}
