use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use gsc_common::{CompilerOptions, EmitTarget, MemoryMode};

/// CLI arguments for the gsc binary.
#[derive(Parser, Debug)]
#[command(
    name = "gsc",
    version,
    about = "GoodScript compiler - a strictly-typed, ownership-qualified subset compiled to native code"
)]
pub struct CliArgs {
    /// Input modules (`*.ast.json` as produced by the frontend) or
    /// directories to scan for them.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Which backend to run.
    #[arg(short = 't', long, value_enum, ignore_case = true, default_value = "cpp")]
    pub target: Target,

    /// Memory management model of the emitted program.
    #[arg(short = 'm', long = "memory", value_enum, ignore_case = true, default_value = "gc")]
    pub memory: Memory,

    /// Emit source-mapping directives into the generated code.
    #[arg(long = "sourceMap", alias = "source-map")]
    pub source_map: bool,

    /// Bypass the subset validator (ownership and null-safety checks still
    /// run).
    #[arg(long = "skipValidation", alias = "skip-validation")]
    pub skip_validation: bool,

    /// Run the validator and stop.
    #[arg(long = "validateOnly", alias = "validate-only")]
    pub validate_only: bool,

    /// Print the module set and its resolved dependency basenames, then
    /// stop.
    #[arg(long = "listModules", alias = "list-modules")]
    pub list_modules: bool,

    /// Directory for emitted artifacts. Defaults to each input module's
    /// directory.
    #[arg(short = 'o', long = "outDir", alias = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Diagnostic output format.
    #[arg(long, value_enum, default_value = "text")]
    pub pretty: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// C++ headers and implementation files
    Cpp,
    /// GoodScript source (same-language transpilation)
    Gs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Memory {
    /// Tracing collector runtime; ownership findings are warnings
    Gc,
    /// Unique/shared/weak pointer runtime; ownership findings are errors
    Ownership,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored on a terminal
    Text,
    /// One JSON array of diagnostics on stdout
    Json,
}

impl CliArgs {
    /// The core options this invocation selects.
    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            target: match self.target {
                Target::Cpp => EmitTarget::Cpp,
                Target::Gs => EmitTarget::GoodScript,
            },
            memory_mode: match self.memory {
                Memory::Gc => MemoryMode::Gc,
                Memory::Ownership => MemoryMode::Ownership,
            },
            source_map: self.source_map,
            skip_validation: self.skip_validation,
            validate_only: self.validate_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_cpp_and_gc() {
        let args = CliArgs::parse_from(["gsc", "main.ast.json"]);
        let options = args.compiler_options();
        assert_eq!(options.target, EmitTarget::Cpp);
        assert_eq!(options.memory_mode, MemoryMode::Gc);
        assert!(!options.validate_only);
    }

    #[test]
    fn flags_map_through() {
        let args = CliArgs::parse_from([
            "gsc",
            "-t",
            "gs",
            "-m",
            "ownership",
            "--sourceMap",
            "--validateOnly",
            "main.ast.json",
        ]);
        let options = args.compiler_options();
        assert_eq!(options.target, EmitTarget::GoodScript);
        assert_eq!(options.memory_mode, MemoryMode::Ownership);
        assert!(options.source_map);
        assert!(options.validate_only);
    }
}
