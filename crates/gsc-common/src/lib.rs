//! Common types and utilities for the gsc GoodScript compiler.
//!
//! This crate provides foundational types used across all gsc crates:
//! - Source locations (`Loc`, `SourceLoc`)
//! - Diagnostics (`Diagnostic`, `Severity`, the GS code table)
//! - Compiler options (`MemoryMode`, `EmitTarget`, `CompilerOptions`)

// Source location tracking (line/column, file-qualified)
pub mod location;
pub use location::{Loc, SourceLoc};

// Diagnostic values and the GS message table
pub mod diagnostics;
pub use diagnostics::{Diagnostic, Severity, codes, format_message};

// Compiler configuration shared across the pipeline
pub mod options;
pub use options::{CompilerOptions, EmitTarget, MemoryMode};
