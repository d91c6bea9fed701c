//! Source positions carried through the IR for diagnostics and placeholders.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

/// A range in a named source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub file: String,
    pub start: Pos,
    pub end: Pos,
}

impl SourceSpan {
    pub fn new(file: impl Into<String>, start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            file: file.into(),
            start: Pos {
                line: start.0,
                column: start.1,
            },
            end: Pos {
                line: end.0,
                column: end.1,
            },
        }
    }
}

/// `file:line,col-col` on one line, `file:line,col-line,col` across lines.
impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{}-", self.file, self.start.line, self.start.column)?;
        if self.start.line == self.end.line {
            write!(f, "{}", self.end.column)
        } else {
            write!(f, "{},{}", self.end.line, self.end.column)
        }
    }
}
