/*
 * preamble.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Preamble derivation from the root document.
 */

//! Preamble derivation from the root document.
//!
//! The snippet is compiled against the root document's own preamble so the
//! user's packages and macros are in scope. Deriving it means:
//!
//! - truncating the root source at `\begin{document}` (the body is supplied
//!   by the snippet)
//! - prepending two directive lines that put the `preview` package in
//!   charge of the page, so the output PDF is cropped to the drawn
//!   environment instead of a full page
//! - rewriting relative `\input{...}` arguments to absolute paths, since
//!   compilation happens in a temporary directory far from the root
//!
//! An unreadable file root degrades to an empty preamble with a warning
//! rather than an error; a preview against an empty preamble can still
//! succeed for snippets that need no packages.

use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use tracing::warn;

use crate::document::line_count;
use crate::locator::TIKZ_ENVIRONMENT;
use crate::root::RootDocument;

/// Number of directive lines injected ahead of the root preamble. The line
/// mapper subtracts these when navigating to preamble errors.
pub const INJECTED_DIRECTIVE_LINES: usize = 2;

/// A compilable preamble derived from the root document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub content: String,
    /// Line count of `content` under the pipeline's line-counting rule.
    pub source_line_count: usize,
    /// `None` when the root is an unsaved buffer; diagnostics then map back
    /// into the live buffer instead of a file.
    pub source_path: Option<PathBuf>,
    /// Recoverable problem hit while deriving the preamble, surfaced to the
    /// user without failing the request.
    pub warning: Option<String>,
}

/// Derives preambles for one target environment.
#[derive(Debug, Clone)]
pub struct PreambleBuilder {
    environment: String,
}

impl Default for PreambleBuilder {
    fn default() -> Self {
        Self::new(TIKZ_ENVIRONMENT)
    }
}

impl PreambleBuilder {
    pub fn new(environment: &str) -> Self {
        Self {
            environment: environment.to_string(),
        }
    }

    /// Derive a preamble from the resolved root document.
    pub fn build(&self, root: &RootDocument) -> Preamble {
        let (source, source_path) = match root {
            RootDocument::Buffer(text) => (text.clone(), None),
            RootDocument::File(path) => match std::fs::read_to_string(path) {
                Ok(text) => (text, Some(path.clone())),
                Err(err) => {
                    let warning =
                        format!("Could not read TeX root {}: {}", path.display(), err);
                    warn!("{warning}");
                    return Preamble {
                        content: String::new(),
                        source_line_count: 1,
                        source_path: Some(path.clone()),
                        warning: Some(warning),
                    };
                }
            },
        };

        let truncated = truncate_at_document_body(&source);
        let rewritten = match source_path.as_deref().and_then(Path::parent) {
            Some(dir) => rewrite_input_paths(&truncated, dir),
            None => truncated,
        };

        let content = format!("{}{}", self.preview_directives(), rewritten);
        Preamble {
            source_line_count: line_count(&content),
            content,
            source_path,
            warning: None,
        }
    }

    /// The two lines that make the `preview` package crop the output to the
    /// target environment (tight bounding box instead of a full page).
    fn preview_directives(&self) -> String {
        format!(
            "\\PassOptionsToPackage{{active,tightpage}}{{preview}}\n\
             \\AtBeginDocument{{\\ifx\\ifPreview\\undefined\\RequirePackage{{preview}}\\PreviewEnvironment{{{}}}\\fi}}\n",
            self.environment
        )
    }
}

/// Everything from `\begin{document}` onward belongs to the body, which the
/// snippet supplies on its own.
fn truncate_at_document_body(source: &str) -> String {
    match source.find("\\begin{document}") {
        Some(index) => source[..index].to_string(),
        None => source.to_string(),
    }
}

/// Rewrite relative `\input{...}` arguments against the root's directory.
/// Absolute arguments are left untouched.
fn rewrite_input_paths(preamble: &str, root_dir: &Path) -> String {
    let re = Regex::new(r"\\input\{([^}]+)\}").unwrap();
    re.replace_all(preamble, |caps: &Captures<'_>| {
        let target = Path::new(&caps[1]);
        if target.is_absolute() {
            caps[0].to_string()
        } else {
            format!("\\input{{{}}}", root_dir.join(target).display())
        }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_truncates_at_document_body() {
        let root = RootDocument::Buffer(
            "\\documentclass{article}\n\\usepackage{tikz}\n\\begin{document}\nbody\n\\end{document}\n"
                .to_string(),
        );
        let preamble = PreambleBuilder::default().build(&root);

        assert!(preamble.content.contains("\\usepackage{tikz}"));
        assert!(!preamble.content.contains("body"));
        assert!(!preamble.content.contains("\\begin{document}"));
    }

    #[test]
    fn test_build_prepends_preview_directives() {
        let root = RootDocument::Buffer("\\documentclass{article}\n".to_string());
        let preamble = PreambleBuilder::default().build(&root);

        let mut lines = preamble.content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\\PassOptionsToPackage{active,tightpage}{preview}"
        );
        assert!(lines.next().unwrap().contains("\\PreviewEnvironment{tikzpicture}"));
        assert_eq!(lines.next().unwrap(), "\\documentclass{article}");
    }

    #[test]
    fn test_build_counts_lines_of_final_content() {
        let root = RootDocument::Buffer("\\documentclass{article}\n\\usepackage{tikz}\n".to_string());
        let preamble = PreambleBuilder::default().build(&root);
        assert_eq!(preamble.source_line_count, line_count(&preamble.content));
        // 2 directives + 2 source lines + trailing newline segment
        assert_eq!(preamble.source_line_count, 5);
    }

    #[test]
    fn test_buffer_root_has_no_source_path() {
        let root = RootDocument::Buffer("\\documentclass{article}\n".to_string());
        let preamble = PreambleBuilder::default().build(&root);
        assert!(preamble.source_path.is_none());
        assert!(preamble.warning.is_none());
    }

    #[test]
    fn test_file_root_rewrites_relative_input_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root_path = dir.path().join("main.tex");
        std::fs::write(
            &root_path,
            "\\documentclass{article}\n\\input{sections/fig.tex}\n\\begin{document}\n",
        )
        .unwrap();

        let preamble = PreambleBuilder::default().build(&RootDocument::File(root_path));
        let expected = format!("\\input{{{}}}", dir.path().join("sections/fig.tex").display());
        assert!(
            preamble.content.contains(&expected),
            "content was:\n{}",
            preamble.content
        );
    }

    #[test]
    fn test_every_input_occurrence_is_rewritten() {
        let rewritten = rewrite_input_paths(
            "\\input{a.tex}\n\\input{b.tex}\n",
            Path::new("/proj"),
        );
        assert!(rewritten.contains("\\input{/proj/a.tex}"));
        assert!(rewritten.contains("\\input{/proj/b.tex}"));
    }

    #[test]
    fn test_absolute_input_paths_left_alone() {
        let rewritten = rewrite_input_paths("\\input{/etc/macros.tex}\n", Path::new("/proj"));
        assert!(rewritten.contains("\\input{/etc/macros.tex}"));
    }

    #[test]
    fn test_unreadable_root_degrades_to_empty_preamble() {
        let root = RootDocument::File(PathBuf::from("/nonexistent/never/main.tex"));
        let preamble = PreambleBuilder::default().build(&root);

        assert!(preamble.content.is_empty());
        assert_eq!(preamble.source_line_count, 1);
        assert!(preamble.warning.unwrap().contains("Could not read"));
    }
}
