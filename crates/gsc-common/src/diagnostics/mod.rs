//! Diagnostic values and the GS message table.
//!
//! Every pass of the pipeline collects diagnostics into a `Vec<Diagnostic>`
//! instead of returning early; the driver decides between phases whether the
//! remaining errors are fatal. Codes are stable identifiers in the families
//! `GS1xx` (subset), `GS3xx` (ownership), `GS4xx` (null-safety), and `GS9xx`
//! (compiler-internal).

use serde::Serialize;

use crate::location::SourceLoc;

// Static message templates and code constants
mod data;
pub use data::{DIAGNOSTIC_MESSAGES, codes};

/// Diagnostic severity.
///
/// Only errors affect the process exit code; warnings are reported and
/// otherwise ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single compiler diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Numeric part of the GS code (`301` for `GS301`)
    pub code: u32,
    pub severity: Severity,
    pub message: String,
    /// Originating source position, when one is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLoc>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    #[must_use]
    pub const fn error(code: u32, message: String) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message,
            loc: None,
        }
    }

    /// Create a warning diagnostic.
    #[must_use]
    pub const fn warning(code: u32, message: String) -> Self {
        Diagnostic {
            code,
            severity: Severity::Warning,
            message,
            loc: None,
        }
    }

    /// Create a diagnostic with an explicit severity.
    #[must_use]
    pub const fn with_severity(code: u32, severity: Severity, message: String) -> Self {
        Diagnostic {
            code,
            severity,
            message,
            loc: None,
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, loc: SourceLoc) -> Self {
        self.loc = Some(loc);
        self
    }

    /// Attach a source location when one is available.
    #[must_use]
    pub fn at_opt(mut self, loc: Option<SourceLoc>) -> Self {
        self.loc = loc;
        self
    }

    /// Whether this diagnostic is error-severity.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The full stable identifier, e.g. `GS301`.
    #[must_use]
    pub fn code_str(&self) -> String {
        format!("GS{}", self.code)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.loc {
            Some(loc) => write!(
                f,
                "{}: {} GS{}: {}",
                loc, self.severity, self.code, self.message
            ),
            None => write!(f, "{} GS{}: {}", self.severity, self.code, self.message),
        }
    }
}

/// Format a diagnostic message by replacing `{0}`, `{1}`, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition: code, default severity, message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub severity: Severity,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Build a diagnostic from the static table, filling `{n}` placeholders.
///
/// Uses the table's default severity; analyzers that downgrade by memory
/// mode construct the diagnostic through [`Diagnostic::with_severity`]
/// instead. Unknown codes fall back to an internal-error diagnostic.
#[must_use]
pub fn diagnostic(code: u32, args: &[&str]) -> Diagnostic {
    match get_message(code) {
        Some(def) => Diagnostic::with_severity(code, def.severity, format_message(def.message, args)),
        None => Diagnostic::error(
            codes::INTERNAL_ERROR,
            format!("unknown diagnostic code GS{code}"),
        ),
    }
}
