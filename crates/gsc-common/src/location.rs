//! Source location tracking for AST nodes, IR nodes, and diagnostics.
//!
//! The parser collaborator hands us line/column positions rather than byte
//! offsets, so locations come in two shapes:
//! - `Loc`: a bare `(line, column)` pair attached to AST nodes.
//! - `SourceLoc`: a file-qualified location carried by IR nodes and
//!   diagnostics.
//!
//! Lines and columns are 1-based; column 0 means "unknown column".

use serde::{Deserialize, Serialize};

/// A line/column position inside a single source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loc {
    /// 1-based line number
    pub line: u32,
    /// 1-based column number
    pub column: u32,
}

impl Loc {
    /// Create a new location from line and column.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Loc { line, column }
    }

    /// Attach a file name, producing a `SourceLoc`.
    pub fn in_file(self, file: impl Into<String>) -> SourceLoc {
        SourceLoc {
            file: file.into(),
            line: self.line,
            column: self.column,
        }
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A file-qualified source location.
///
/// Every IR node carries an `Option<SourceLoc>` so diagnostics and source
/// maps can point back at the originating GoodScript position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLoc {
    /// Path of the source file as given to the compiler
    pub file: String,
    /// 1-based line number
    pub line: u32,
    /// 1-based column number
    pub column: u32,
}

impl SourceLoc {
    /// Create a new source location.
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        SourceLoc {
            file: file.into(),
            line,
            column,
        }
    }

    /// The bare line/column part of this location.
    #[inline]
    pub const fn loc(&self) -> Loc {
        Loc {
            line: self.line,
            column: self.column,
        }
    }
}

impl std::fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loc_display() {
        assert_eq!(Loc::new(3, 7).to_string(), "3:7");
    }

    #[test]
    fn loc_in_file() {
        let loc = Loc::new(12, 1).in_file("main.gs");
        assert_eq!(loc, SourceLoc::new("main.gs", 12, 1));
        assert_eq!(loc.to_string(), "main.gs:12:1");
    }

    #[test]
    fn source_loc_projects_loc() {
        let loc = SourceLoc::new("a.gs", 5, 9);
        assert_eq!(loc.loc(), Loc::new(5, 9));
    }
}
