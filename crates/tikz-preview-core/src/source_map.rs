//! Mapping assembled-document lines back to the original source
//!
//! Compilation happens on a synthetic document, so diagnostics come back in
//! the synthetic document's line numbering and must be translated before
//! anything navigates. A line either falls in the snippet body (mapped into
//! the live editor buffer through the snippet's range) or in the derived
//! preamble (mapped into the root file, or the root buffer when it was
//! never saved).

use std::path::PathBuf;

use serde::Serialize;

use crate::assemble::HEADER_LINES;
use crate::document::{Position, Snippet};
use crate::preamble::{INJECTED_DIRECTIVE_LINES, Preamble};

/// Where a diagnostic landed after mapping. Positions and lines are always
/// in original-source space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MappedError {
    /// Inside the snippet body; `position` is in the live editor buffer.
    Body { position: Position },
    /// Inside the preamble; jump to `line` (1-based) in the root file, or
    /// in the live root buffer when `path` is `None`.
    Preamble { path: Option<PathBuf>, line: usize },
}

/// Map a 1-based line in the assembled document back to the original
/// source.
///
/// Lines at or past the body threshold belong to the snippet: the 0-based
/// body offset is added to the snippet's first row. Everything above
/// belongs to the root preamble, minus the injected directive lines,
/// clamped so an error attributed to the injected lines themselves never
/// produces a zero or negative target.
pub fn map_error_line(
    assembled_line: usize,
    preamble: &Preamble,
    snippet: &Snippet,
) -> MappedError {
    let body_start = preamble.source_line_count + HEADER_LINES;

    if assembled_line >= body_start {
        let body_offset = assembled_line - body_start;
        MappedError::Body {
            position: Position::new(snippet.range.start.row + body_offset, 0),
        }
    } else {
        let line = assembled_line
            .saturating_sub(INJECTED_DIRECTIVE_LINES)
            .max(1);
        MappedError::Preamble {
            path: preamble.source_path.clone(),
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Range, line_count};

    fn preamble(content: &str) -> Preamble {
        Preamble {
            content: content.to_string(),
            source_line_count: line_count(content),
            source_path: None,
            warning: None,
        }
    }

    fn snippet_at(start_row: usize) -> Snippet {
        Snippet {
            text: "\\begin{tikzpicture}\n\\draw (0,0);\n\\end{tikzpicture}".to_string(),
            range: Range::full_lines(start_row, start_row + 2),
        }
    }

    #[test]
    fn test_body_error_maps_into_buffer() {
        // Preamble occupies 3 lines; body starts at assembled line 5.
        let p = preamble("a\nb\nc");
        let s = snippet_at(10);

        let mapped = map_error_line(5, &p, &s);
        assert_eq!(
            mapped,
            MappedError::Body {
                position: Position::new(10, 0)
            }
        );

        let mapped = map_error_line(7, &p, &s);
        assert_eq!(
            mapped,
            MappedError::Body {
                position: Position::new(12, 0)
            }
        );
    }

    #[test]
    fn test_inverse_consistency_with_assembler() {
        // An error reported at line N + HEADER_LINES + k maps back to
        // original row L + k, for every line of the snippet body.
        let p = preamble("line1\nline2\nline3\nline4");
        let start_row = 23;
        let s = snippet_at(start_row);

        for k in 0..3 {
            let assembled_line = p.source_line_count + HEADER_LINES + k;
            let mapped = map_error_line(assembled_line, &p, &s);
            assert_eq!(
                mapped,
                MappedError::Body {
                    position: Position::new(start_row + k, 0)
                }
            );
        }
    }

    #[test]
    fn test_preamble_error_maps_to_root_line() {
        let mut p = preamble("d1\nd2\nreal preamble line");
        p.source_path = Some(PathBuf::from("/proj/main.tex"));
        let s = snippet_at(0);

        // Assembled line 3 is the first real preamble line, i.e. root line 1.
        let mapped = map_error_line(3, &p, &s);
        assert_eq!(
            mapped,
            MappedError::Preamble {
                path: Some(PathBuf::from("/proj/main.tex")),
                line: 1
            }
        );
    }

    #[test]
    fn test_preamble_error_on_injected_lines_clamps_to_one() {
        let p = preamble("d1\nd2\nrest");
        let s = snippet_at(0);

        for assembled_line in [1, 2] {
            let mapped = map_error_line(assembled_line, &p, &s);
            assert_eq!(
                mapped,
                MappedError::Preamble {
                    path: None,
                    line: 1
                }
            );
        }
    }

    #[test]
    fn test_unsaved_root_has_no_path() {
        let p = preamble("d1\nd2\nx");
        let mapped = map_error_line(3, &p, &snippet_at(4));
        match mapped {
            MappedError::Preamble { path, .. } => assert!(path.is_none()),
            other => panic!("expected preamble mapping, got {other:?}"),
        }
    }
}
