/*
 * root.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Root document resolution.
 */

//! Root document resolution.
//!
//! The preamble that governs a snippet's compilation may live in a file
//! other than the one being edited. Resolution is three-tier:
//!
//! 1. The buffer itself, when it is a self-contained document
//!    (declares a class and a body)
//! 2. A `% !TEX root = ...` directive in the buffer, resolved against the
//!    buffer's directory and checked for existence
//! 3. An externally supplied root path (project setting, editor state)
//!
//! When all tiers fail, the current buffer is used anyway and a warning is
//! surfaced so the user knows the preamble may be incomplete.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::warn;

/// The document whose preamble governs compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootDocument {
    /// A file on disk.
    File(PathBuf),
    /// An unsaved buffer. Carries the live text, since there is no
    /// filesystem identity to read from later.
    Buffer(String),
}

impl RootDocument {
    /// Filesystem path, when the root has one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            RootDocument::File(path) => Some(path),
            RootDocument::Buffer(_) => None,
        }
    }
}

/// Outcome of root resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    pub root: RootDocument,
    /// Set when the fallback tier was used.
    pub warning: Option<String>,
}

/// Resolve the root document for a buffer.
///
/// `buffer_path` is the edited file's path if it is saved; `external_root`
/// is a host-supplied override tried last.
pub fn resolve_root(
    buffer_text: &str,
    buffer_path: Option<&Path>,
    external_root: Option<&Path>,
) -> ResolvedRoot {
    // A document that declares its own class and body is its own root.
    if buffer_text.contains("\\documentclass") && buffer_text.contains("\\begin{document}") {
        return ResolvedRoot {
            root: root_for_buffer(buffer_text, buffer_path),
            warning: None,
        };
    }

    // A % !TEX root directive, relative to the buffer's directory. Only
    // meaningful for saved buffers.
    if let Some(dir) = buffer_path.and_then(Path::parent) {
        let re = Regex::new(r"%\s*!TEX\s+root\s*=\s*(\S+\.tex)").unwrap();
        if let Some(caps) = re.captures(buffer_text) {
            let candidate = dir.join(caps.get(1).map(|m| m.as_str()).unwrap_or_default());
            if candidate.exists() {
                return ResolvedRoot {
                    root: RootDocument::File(candidate),
                    warning: None,
                };
            }
        }
    }

    if let Some(path) = external_root {
        if path.exists() {
            return ResolvedRoot {
                root: RootDocument::File(path.to_path_buf()),
                warning: None,
            };
        }
    }

    let warning = "No valid TeX root file available. Using current file with fingers crossed.";
    warn!("{warning}");
    ResolvedRoot {
        root: root_for_buffer(buffer_text, buffer_path),
        warning: Some(warning.to_string()),
    }
}

fn root_for_buffer(buffer_text: &str, buffer_path: Option<&Path>) -> RootDocument {
    match buffer_path {
        Some(path) => RootDocument::File(path.to_path_buf()),
        None => RootDocument::Buffer(buffer_text.to_string()),
    }
}
