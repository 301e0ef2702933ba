/*
 * compiler/error_parser.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Parse TeX log output for human-meaningful diagnostics.
 */

//! Parse TeX log output to recover an error message and source line.
//!
//! TeX interleaves errors with warnings, box chatter, and page numbers, and
//! the exact shape varies between engines. Parsers are tried in order of
//! specificity; absence of a match is an expected, handled case, never a
//! panic.
//!
//! # Error patterns
//!
//! ## file-line-error form
//! ```text
//! ./tikz.tex:7: Undefined control sequence.
//! ```
//!
//! ## Bang form
//! ```text
//! ! Undefined control sequence.
//! <recently read> \foo
//! l.7 \foo
//! ```
//!
//! The explanatory text runs from the introducer to the `l.<N>` line
//! reference, which also carries the candidate line number.

use regex::Regex;
use serde::Serialize;

/// Message reported when nothing recognizable is found in the log.
pub const UNKNOWN_ERROR: &str = "Unknown compilation error";

/// A diagnostic recovered from compiler output.
///
/// `line` is 1-based in the *assembled* document; `None` means the log
/// carried no navigable location and callers must not invent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TexDiagnostic {
    pub message: String,
    pub line: Option<usize>,
}

/// Log parser bound to the known input file name.
#[derive(Debug, Clone)]
pub struct TexLogParser {
    file_name: String,
}

impl TexLogParser {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Extract the first error from a TeX log.
    ///
    /// Never fails: unmatched or empty input falls back to a generic
    /// message with no line.
    pub fn parse(&self, log: &str) -> TexDiagnostic {
        if let Some(diagnostic) = self.parse_file_line_error(log) {
            return diagnostic;
        }

        if let Some(diagnostic) = parse_bang_error(log) {
            return diagnostic;
        }

        TexDiagnostic {
            message: UNKNOWN_ERROR.to_string(),
            line: None,
        }
    }

    /// `<file>:<line>: message`, produced under `-file-line-error`. Most
    /// specific: it names our input file and carries the line directly.
    fn parse_file_line_error(&self, log: &str) -> Option<TexDiagnostic> {
        let pattern = format!(r"(?m)^.*{}:(\d+):\s*(.+)$", regex::escape(&self.file_name));
        let re = Regex::new(&pattern).unwrap();

        let caps = re.captures(log)?;
        let line = caps.get(1)?.as_str().parse().ok()?;
        let message = clean_message(caps.get(2)?.as_str());
        if message.is_empty() {
            return None;
        }

        Some(TexDiagnostic {
            message,
            line: Some(line),
        })
    }
}

/// `!`-introduced error. The message is everything between the introducer
/// and the `l.<N>` reference (or the next error/prompt boundary); the
/// reference, when present, yields the line.
fn parse_bang_error(log: &str) -> Option<TexDiagnostic> {
    let lines: Vec<&str> = log.lines().collect();
    let start = lines.iter().position(|line| line.starts_with('!'))?;

    let line_reference = Regex::new(r"^l\.(\d+)").unwrap();

    let mut message_lines = vec![lines[start].trim_start_matches('!').trim().to_string()];
    let mut error_line = None;
    for line in &lines[start + 1..] {
        if let Some(caps) = line_reference.captures(line) {
            error_line = caps.get(1).and_then(|m| m.as_str().parse().ok());
            break;
        }
        // A fresh error or the interactive prompt ends the capture.
        if line.starts_with('!') || line.starts_with('?') {
            break;
        }
        message_lines.push(line.to_string());
    }

    let message = clean_message(&message_lines.join("\n"));
    if message.is_empty() {
        return None;
    }

    Some(TexDiagnostic {
        message,
        line: error_line,
    })
}

/// Trim the captured text and collapse runs of blank lines.
fn clean_message(message: &str) -> String {
    let collapsed = Regex::new(r"\n{3,}")
        .unwrap()
        .replace_all(message, "\n\n")
        .into_owned();
    collapsed.trim().to_string()
}
