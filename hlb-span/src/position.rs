use std::fmt;

use serde::{Deserialize, Serialize};

/// A single point in a named source file.
///
/// `line` and `column` are 1-based, matching the way they are reported to users;
/// `offset` is the 0-based byte offset and is what every other component actually
/// indexes by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: impl Into<String>, offset: usize, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A start/end pair of [`Position`]s within a single file.
///
/// Every AST node carries one of these. The invariant `end >= start` (same file)
/// is checked wherever a `Range` is constructed from parser state, not re-checked
/// on every read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert_eq!(start.file, end.file, "range spans two different files");
        debug_assert!(end.offset >= start.offset, "range end precedes start");
        Self { start, end }
    }

    pub fn file(&self) -> &str {
        &self.start.file
    }

    /// The smallest range covering both `self` and `other`. Panics if they are
    /// in different files.
    pub fn merge(&self, other: &Range) -> Range {
        assert_eq!(self.file(), other.file(), "cannot merge ranges across files");
        let start = if self.start.offset <= other.start.offset {
            self.start.clone()
        } else {
            other.start.clone()
        };
        let end = if self.end.offset >= other.end.offset {
            self.end.clone()
        } else {
            other.end.clone()
        };
        Range::new(start, end)
    }
}
