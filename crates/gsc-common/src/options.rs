//! Compiler configuration shared by every pipeline phase.

use serde::{Deserialize, Serialize};

/// Which runtime model the emitted program uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryMode {
    /// Tracing collector runtime: class references are raw traced pointers;
    /// ownership findings are warnings.
    #[default]
    Gc,
    /// Ownership runtime: unique/shared/weak pointers; ownership findings
    /// are errors.
    Ownership,
}

impl MemoryMode {
    /// Whether ownership and null-safety findings are fatal in this mode.
    #[inline]
    pub fn ownership_is_fatal(self) -> bool {
        matches!(self, MemoryMode::Ownership)
    }
}

impl std::fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryMode::Gc => write!(f, "gc"),
            MemoryMode::Ownership => write!(f, "ownership"),
        }
    }
}

/// Which backend consumes the IR.
///
/// The set is open; these are the two emitters the compiler ships with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitTarget {
    /// Low-level C++ emitter: one header and one implementation file per
    /// module.
    #[default]
    Cpp,
    /// Same-language emitter: one GoodScript file per module.
    GoodScript,
}

impl std::fmt::Display for EmitTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmitTarget::Cpp => write!(f, "cpp"),
            EmitTarget::GoodScript => write!(f, "gs"),
        }
    }
}

/// Options the core accepts from the CLI collaborator.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CompilerOptions {
    pub target: EmitTarget,
    pub memory_mode: MemoryMode,
    /// Emit per-function source mapping directives.
    pub source_map: bool,
    /// Bypass the GS1xx subset validator. Ownership and null-safety checks
    /// still run.
    pub skip_validation: bool,
    /// Run the validator and stop before lowering.
    pub validate_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gc_mode_is_default_and_not_fatal() {
        let opts = CompilerOptions::default();
        assert_eq!(opts.memory_mode, MemoryMode::Gc);
        assert!(!opts.memory_mode.ownership_is_fatal());
        assert!(MemoryMode::Ownership.ownership_is_fatal());
    }

    #[test]
    fn mode_round_trips_through_serde() {
        let mode: MemoryMode = serde_json::from_str("\"ownership\"").unwrap();
        assert_eq!(mode, MemoryMode::Ownership);
        assert_eq!(serde_json::to_string(&EmitTarget::Cpp).unwrap(), "\"cpp\"");
    }
}
