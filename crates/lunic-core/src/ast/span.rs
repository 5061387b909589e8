//! Source positions attached to AST nodes and parser side tables

use std::fmt;

use serde::{Deserialize, Serialize};

/// A byte range in the source text
///
/// The parser reports type-annotation and comment regions with these; the
/// checker only carries them through.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, Hash, Default)]
pub struct Span {
    /// Byte offset of the start of the span (inclusive)
    pub start: usize,
    /// Byte offset of the end of the span (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// A line/column position in the source, as recorded by the parser.
///
/// Lines and columns are 1-based. A zeroed location means the node was
/// synthesized and has no source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub col: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Location {
    pub fn new(line: usize, col: usize) -> Self {
        Location {
            line,
            col,
            offset: 0,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
