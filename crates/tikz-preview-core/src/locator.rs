/*
 * locator.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Environment boundary detection around the cursor.
 */

//! Environment boundary detection around the cursor.
//!
//! Locating is heuristic, not grammatical: the document is scanned line by
//! line for the `\begin{...}`/`\end{...}` marker pair of the target
//! environment. The scan tolerates malformed documents by failing instead
//! of guessing: a closing marker met while scanning upward means the cursor
//! sits *below* the previous picture, and an opening marker met while
//! scanning downward means the one above the cursor was never closed.

use crate::document::{Position, Range, Selection, Snippet};

/// The default environment to preview.
pub const TIKZ_ENVIRONMENT: &str = "tikzpicture";

const DOCUMENT_BEGIN: &str = "\\begin{document}";
const DOCUMENT_END: &str = "\\end{document}";

/// Locates environment snippets in raw document text.
///
/// Generic over the environment name so the same scanning rules can be
/// pointed at any `\begin{...}`/`\end{...}` pair.
#[derive(Debug, Clone)]
pub struct SnippetLocator {
    open_marker: String,
    close_marker: String,
}

impl Default for SnippetLocator {
    fn default() -> Self {
        Self::new(TIKZ_ENVIRONMENT)
    }
}

impl SnippetLocator {
    pub fn new(environment: &str) -> Self {
        Self {
            open_marker: format!("\\begin{{{environment}}}"),
            close_marker: format!("\\end{{{environment}}}"),
        }
    }

    /// Determine the text to preview.
    ///
    /// A non-empty selection wins outright and is used verbatim. Otherwise
    /// the environment enclosing `cursor` is located by scanning: upward for
    /// the opening marker, downward for the closing marker. The returned
    /// snippet spans the environment including both marker lines, expressed
    /// as full lines in original-buffer coordinates.
    ///
    /// Returns `None` when the cursor is not inside the environment. A
    /// cursor sitting exactly on a marker line belongs to that environment.
    pub fn locate(
        &self,
        document: &str,
        cursor: Position,
        selection: Option<&Selection>,
    ) -> Option<Snippet> {
        if let Some(selection) = selection {
            if !selection.text.is_empty() {
                return Some(Snippet {
                    text: selection.text.clone(),
                    range: selection.range,
                });
            }
        }

        let lines: Vec<&str> = document
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        if cursor.row >= lines.len() {
            return None;
        }

        let open_row = self.scan_up(&lines, cursor.row)?;
        let close_row = self.scan_down(&lines, cursor.row, open_row)?;

        Some(Snippet {
            text: lines[open_row..=close_row].join("\n"),
            range: Range::full_lines(open_row, close_row),
        })
    }

    /// Scan from the cursor's line toward the top of the document for the
    /// opening marker.
    fn scan_up(&self, lines: &[&str], from: usize) -> Option<usize> {
        for row in (0..=from).rev() {
            let line = lines[row];
            // A closing marker strictly above the cursor belongs to the
            // previous picture. The cursor's own line may legitimately be
            // this environment's closing marker.
            if row != from && line.contains(&self.close_marker) {
                return None;
            }
            if line.contains(&self.open_marker) {
                return Some(row);
            }
            if line.contains(DOCUMENT_BEGIN) {
                return None;
            }
        }
        None
    }

    /// Scan from the cursor's line toward the bottom of the document for
    /// the closing marker.
    fn scan_down(&self, lines: &[&str], from: usize, open_row: usize) -> Option<usize> {
        for (offset, line) in lines[from..].iter().enumerate() {
            let row = from + offset;
            if line.contains(&self.close_marker) {
                return Some(row);
            }
            // An opening marker below the cursor (other than our own) means
            // the environment above was never closed.
            if row != open_row && line.contains(&self.open_marker) {
                return None;
            }
            if line.contains(DOCUMENT_END) {
                return None;
            }
        }
        None
    }
}
