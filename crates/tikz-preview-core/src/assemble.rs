/*
 * assemble.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Assembly of the synthetic compilable document.
 */

//! Assembly of the synthetic compilable document.
//!
//! Pure concatenation: preamble, `\begin{document}`, snippet body,
//! `\end{document}`. No inspection of either part happens here.

use crate::preamble::Preamble;

/// Lines separating the preamble's last line from the snippet's first in
/// the assembled document: the preamble's trailing newline segment plus the
/// `\begin{document}` line. The line mapper depends on this constant.
pub const HEADER_LINES: usize = 2;

/// The self-contained compilable unit handed to the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    pub content: String,
}

/// Concatenate a preamble and a snippet body into one compilable document.
pub fn assemble(preamble: &Preamble, snippet_text: &str) -> AssembledDocument {
    AssembledDocument {
        content: format!(
            "{}\n\\begin{{document}}\n{}\n\\end{{document}}",
            preamble.content, snippet_text
        ),
    }
}
