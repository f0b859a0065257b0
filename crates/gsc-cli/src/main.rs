//! The gsc binary: argument parsing, tracing setup, diagnostic printing.

#![allow(clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use gsc_cli::args::{CliArgs, OutputFormat};
use gsc_cli::driver;
use gsc_common::diagnostics::{Diagnostic, Severity};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("GSC_LOG"))
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<ExitCode> {
    let files = driver::discover_inputs(&args.inputs)?;
    if files.is_empty() {
        bail!("no input modules found (expected *.ast.json files)");
    }

    if args.list_modules {
        let modules = driver::load_modules(&files)?;
        for module in &modules {
            let imports: Vec<&str> = module
                .imports
                .iter()
                .map(|import| {
                    import
                        .from
                        .rsplit(['/', '\\'])
                        .next()
                        .unwrap_or(import.from.as_str())
                })
                .collect();
            if imports.is_empty() {
                println!("{}", module.basename());
            } else {
                println!("{} <- {}", module.basename(), imports.join(", "));
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let options = args.compiler_options();
    let result = driver::compile(&files, &options, args.out_dir.as_deref())?;

    match args.pretty {
        OutputFormat::Text => {
            for diagnostic in &result.diagnostics {
                print_diagnostic(diagnostic);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result.diagnostics)?);
        }
    }

    if result.has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let severity = match diagnostic.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
    };
    let code = diagnostic.code_str().bold();
    match &diagnostic.loc {
        Some(loc) => eprintln!("{loc}: {severity} {code}: {}", diagnostic.message),
        None => eprintln!("{severity} {code}: {}", diagnostic.message),
    }
}
