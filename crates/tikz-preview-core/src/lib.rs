//! Snippet compilation and diagnostics pipeline for TikZ previews
//!
//! This crate extracts a `tikzpicture` environment from a LaTeX buffer,
//! assembles a minimal self-contained document around the root file's
//! preamble, compiles it in an isolated temporary workspace, and maps
//! compiler diagnostics back to the original source.
//!
//! # Architecture
//!
//! The pipeline is organized around these pieces, leaf first:
//!
//! - [`SnippetLocator`] - environment boundary detection around the cursor
//! - [`resolve_root`] / [`PreambleBuilder`] - root resolution and preamble
//!   derivation
//! - [`assemble`] - synthetic document assembly
//! - [`CompilerRunner`] - latexmk under a timeout in a temp workspace
//! - [`TexLogParser`] - error recovery from the TeX log
//! - [`map_error_line`] - translating assembled-document lines back to the
//!   original buffer or root file
//! - [`PreviewCoordinator`] - per-request lifecycle and the marker registry
//!
//! # Example
//!
//! ```ignore
//! use tikz_preview_core::{Position, PreviewCoordinator, PreviewRequest};
//!
//! let mut coordinator = PreviewCoordinator::new(host);
//! coordinator
//!     .preview(PreviewRequest {
//!         document: "main.tex".into(),
//!         buffer_text,
//!         cursor: Position::new(12, 0),
//!         selection: None,
//!         buffer_path: Some("main.tex".into()),
//!         external_root: None,
//!     })
//!     .await?;
//! ```

pub mod assemble;
pub mod compiler;
pub mod document;
pub mod error;
pub mod locator;
pub mod preamble;
pub mod preview;
pub mod root;
pub mod source_map;

// Re-export commonly used types
pub use assemble::{AssembledDocument, HEADER_LINES, assemble};
pub use compiler::{
    CompileFailure, CompileOutcome, Compiler, CompilerRunner, FailureStage, TexDiagnostic,
    TexLogParser, find_latexmk,
};
pub use document::{DocumentId, Position, Range, Selection, Snippet, line_count};
pub use error::PreviewError;
pub use locator::{SnippetLocator, TIKZ_ENVIRONMENT};
pub use preamble::{INJECTED_DIRECTIVE_LINES, Preamble, PreambleBuilder};
pub use preview::{Host, PresentationSlot, PreviewCoordinator, PreviewRequest, SlotState};
pub use root::{ResolvedRoot, RootDocument, resolve_root};
pub use source_map::{MappedError, map_error_line};
