//! Buffer positions, ranges, and snippet types shared across the pipeline

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Sentinel column marking "end of line" in full-line ranges.
///
/// Ranges produced by the locator span whole lines; the end column does not
/// track actual line length.
pub const LINE_END_COLUMN: usize = usize::MAX;

/// A 0-based row/column position in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A region of a buffer, inclusive of both end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A range covering whole lines from `start_row` through `end_row`.
    pub fn full_lines(start_row: usize, end_row: usize) -> Self {
        Self {
            start: Position::new(start_row, 0),
            end: Position::new(end_row, LINE_END_COLUMN),
        }
    }

    /// Row-level overlap test. Ranges are full lines, so sharing any row
    /// counts as overlapping.
    pub fn overlaps(&self, other: &Range) -> bool {
        self.start.row <= other.end.row && other.start.row <= self.end.row
    }
}

/// Text selected by the user. A non-empty selection is previewed verbatim,
/// bypassing environment detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    pub range: Range,
}

/// The delimited graphics block chosen for isolated compilation.
///
/// Immutable once produced by the locator; the range is in original-buffer
/// coordinates and is later used to map diagnostics back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    pub range: Range,
}

/// Stable identity for an open document, used to key the marker registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Count line segments the way the rest of the pipeline does: every
/// `\r\n`, `\r`, or `\n` starts a new segment, and the empty string is one
/// line. The assembler and line mapper both depend on this rule.
pub fn line_count(text: &str) -> usize {
    let mut count = 1;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                count += 1;
            }
            '\n' => count += 1,
            _ => {}
        }
    }
    count
}
