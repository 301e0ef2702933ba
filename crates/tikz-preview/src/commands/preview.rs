/*
 * commands/preview.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Preview command implementation.
 */

//! Preview command implementation.
//!
//! Drives the pipeline end to end from the command line: locate the TikZ
//! picture at the given cursor position, compile it against the resolved
//! root's preamble, and write the cropped PDF next to the input. The CLI is
//! its own presentation layer: the slot writes the PDF file and prints
//! diagnostics with their mapped original-source location.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use tikz_preview_core::{
    CompilerRunner, DocumentId, Host, MappedError, Position, PresentationSlot, PreviewCoordinator,
    PreviewError, PreviewRequest, Range,
};

/// Arguments for the preview command
#[derive(Debug)]
pub struct PreviewArgs {
    /// Input .tex file
    pub input: String,
    /// 1-based cursor line
    pub line: usize,
    /// 0-based cursor column
    pub column: usize,
    /// Output PDF path
    pub output: Option<String>,
    /// TeX root override
    pub root: Option<String>,
    /// Compile timeout in milliseconds
    pub timeout_ms: u64,
    /// Emit the failure record as JSON
    pub json: bool,
    /// Suppress console output
    pub quiet: bool,
}

/// Execute the preview command
pub fn execute(args: PreviewArgs) -> Result<()> {
    let input = PathBuf::from(&args.input);
    let buffer_text = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;

    let output = match &args.output {
        Some(path) => PathBuf::from(path),
        None => default_output_path(&input),
    };

    let host = CliHost {
        input: input.clone(),
        output,
        quiet: args.quiet,
    };
    let runner = CompilerRunner::new(Duration::from_millis(args.timeout_ms));
    let mut coordinator = PreviewCoordinator::with_compiler(host, Box::new(runner));

    let request = PreviewRequest {
        document: DocumentId::from_path(&input),
        buffer_text,
        cursor: Position::new(args.line.saturating_sub(1), args.column),
        selection: None,
        buffer_path: Some(input),
        external_root: args.root.map(PathBuf::from),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;

    match runtime.block_on(coordinator.preview(request)) {
        Ok(()) => Ok(()),
        Err(err) => {
            if args.json {
                println!("{}", failure_json(&err)?);
            }
            anyhow::bail!("preview failed: {err}");
        }
    }
}

/// `<stem>-tikz.pdf` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tikz".to_string());
    input.with_file_name(format!("{stem}-tikz.pdf"))
}

/// Serialize the failure for `--json` consumers.
fn failure_json(err: &PreviewError) -> Result<String> {
    let value = match err {
        PreviewError::Compile(failure) => serde_json::to_value(failure)?,
        other => serde_json::json!({
            "stage": "locate",
            "message": other.to_string(),
        }),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

/// CLI-side presentation: files and log lines instead of editor decorations.
struct CliHost {
    input: PathBuf,
    output: PathBuf,
    quiet: bool,
}

impl Host for CliHost {
    fn create_slot(&mut self, _document: &DocumentId, _range: &Range) -> Box<dyn PresentationSlot> {
        Box::new(CliSlot {
            input: self.input.clone(),
            output: self.output.clone(),
            quiet: self.quiet,
        })
    }

    fn warn(&mut self, message: &str) {
        warn!("{message}");
    }
}

struct CliSlot {
    input: PathBuf,
    output: PathBuf,
    quiet: bool,
}

impl PresentationSlot for CliSlot {
    fn show(&mut self, pdf: &[u8]) {
        match std::fs::write(&self.output, pdf) {
            Ok(()) => {
                if !self.quiet {
                    info!(bytes = pdf.len(), "Wrote {}", self.output.display());
                }
            }
            Err(err) => error!("Could not write {}: {}", self.output.display(), err),
        }
    }

    fn show_error(&mut self, message: &str, navigate_to: Option<&MappedError>) {
        error!("{message}");
        match navigate_to {
            Some(MappedError::Body { position }) => {
                error!("--> {}:{}", self.input.display(), position.row + 1);
            }
            Some(MappedError::Preamble {
                path: Some(path),
                line,
            }) => {
                error!("--> {}:{}", path.display(), line);
            }
            Some(MappedError::Preamble { path: None, line }) => {
                error!("--> preamble line {line}");
            }
            None => {}
        }
    }

    fn close(&mut self) {}
}
