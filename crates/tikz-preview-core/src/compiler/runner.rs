/*
 * compiler/runner.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * LaTeX subprocess management.
 */

//! LaTeX subprocess management.
//!
//! This module provides functions for:
//! - Finding the latexmk binary on the system
//! - Compiling an assembled document in an isolated temporary workspace
//!
//! # Finding latexmk
//!
//! The [`find_latexmk`] function searches in this order:
//! 1. `TIKZ_PREVIEW_LATEXMK` environment variable (direct path to the
//!    binary, or a directory containing it)
//! 2. System PATH via `which`
//!
//! # Workspace lifecycle
//!
//! Each compile gets its own uniquely named temporary directory holding
//! `tikz.tex` and, on success, `tikz.pdf`. The directory is removed when
//! the compile result has been fully materialized; removal is best-effort
//! and never blocks the result.

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::error_parser::TexLogParser;
use super::{CompileFailure, CompileOutcome, Compiler, FailureStage};
use crate::assemble::AssembledDocument;

/// Name of the TeX source written into the temp workspace.
pub const INPUT_FILE_NAME: &str = "tikz.tex";

/// Name of the PDF the toolchain is expected to produce.
pub const OUTPUT_FILE_NAME: &str = "tikz.pdf";

/// Default bound on one compile attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Find the latexmk binary on the system.
///
/// Searches in this order:
/// 1. `TIKZ_PREVIEW_LATEXMK` environment variable - can be:
///    - Direct path to the latexmk binary
///    - Path to a directory containing it
/// 2. System PATH via `which`
///
/// # Returns
///
/// `Some(path)` if latexmk is found, `None` otherwise.
pub fn find_latexmk() -> Option<PathBuf> {
    if let Ok(configured) = std::env::var("TIKZ_PREVIEW_LATEXMK") {
        let configured_path = PathBuf::from(&configured);

        if configured_path.is_file() {
            return Some(configured_path);
        }

        if configured_path.is_dir() {
            let in_dir = configured_path.join(latexmk_name());
            if in_dir.is_file() {
                return Some(in_dir);
            }
        }
    }

    which::which("latexmk").ok()
}

/// Get the platform-appropriate latexmk binary name.
fn latexmk_name() -> &'static str {
    #[cfg(windows)]
    {
        "latexmk.exe"
    }
    #[cfg(not(windows))]
    {
        "latexmk"
    }
}

/// Runs one isolated compile per call.
#[derive(Debug, Clone)]
pub struct CompilerRunner {
    timeout: Duration,
    parser: TexLogParser,
}

impl Default for CompilerRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl CompilerRunner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            parser: TexLogParser::new(INPUT_FILE_NAME),
        }
    }

    /// Compile the assembled document in an isolated temp workspace.
    ///
    /// Exactly one attempt, no retries; the caller decides whether the user
    /// may retry. A timeout or non-zero exit is a compile failure like any
    /// other, with the captured log run through the diagnostics parser. A
    /// compiler that reports success without producing the PDF yields a
    /// typed read-output failure rather than a panic.
    pub async fn compile(&self, document: &AssembledDocument) -> CompileOutcome {
        let Some(latexmk) = find_latexmk() else {
            return CompileOutcome::Failure(CompileFailure::new(
                FailureStage::CompilerNotFound,
                "latexmk not found; install a TeX distribution or set TIKZ_PREVIEW_LATEXMK",
            ));
        };

        let workspace = match tempfile::Builder::new().prefix("tikzpreview").tempdir() {
            Ok(dir) => dir,
            Err(err) => {
                return CompileOutcome::Failure(CompileFailure::new(
                    FailureStage::TempDir,
                    format!("Could not create temporary directory: {err}"),
                ));
            }
        };

        let input_path = workspace.path().join(INPUT_FILE_NAME);
        if let Err(err) = tokio::fs::write(&input_path, &document.content).await {
            return CompileOutcome::Failure(CompileFailure::new(
                FailureStage::Write,
                format!("Could not write {INPUT_FILE_NAME}: {err}"),
            ));
        }

        debug!(workspace = %workspace.path().display(), "Compiling snippet");

        let mut command = Command::new(&latexmk);
        command
            .arg("-pdf")
            .arg("-latexoption=-interaction=nonstopmode")
            .arg(INPUT_FILE_NAME)
            .current_dir(workspace.path())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return CompileOutcome::Failure(CompileFailure::new(
                    FailureStage::Compile,
                    format!("Could not spawn {}: {}", latexmk.display(), err),
                ));
            }
            Err(_) => {
                // Dropping the output future kills the process (kill_on_drop).
                warn!(timeout_ms = self.timeout.as_millis() as u64, "latexmk timed out");
                return CompileOutcome::Failure(CompileFailure::new(
                    FailureStage::Compile,
                    format!("Compilation timed out after {} ms", self.timeout.as_millis()),
                ));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            // TeX writes its errors to stdout; stderr is latexmk chatter.
            let diagnostic = self.parser.parse(&stdout);
            warn!(status = %output.status, "latexmk failed");
            return CompileOutcome::Failure(CompileFailure {
                stage: FailureStage::Compile,
                message: format!("latexmk exited with {}", output.status),
                stdout,
                stderr,
                parsed_error: Some(diagnostic.message),
                error_line: diagnostic.line,
            });
        }

        let output_path = workspace.path().join(OUTPUT_FILE_NAME);
        match tokio::fs::read(&output_path).await {
            Ok(pdf) => {
                debug!(bytes = pdf.len(), "Compilation succeeded");
                CompileOutcome::Success { pdf }
            }
            Err(err) => CompileOutcome::Failure(CompileFailure {
                stage: FailureStage::ReadOutput,
                message: format!("Could not read {OUTPUT_FILE_NAME}: {err}"),
                stdout,
                stderr,
                parsed_error: None,
                error_line: None,
            }),
        }
        // `workspace` drops here, after the result is fully materialized.
    }
}

#[async_trait::async_trait]
impl Compiler for CompilerRunner {
    async fn run(&self, document: &AssembledDocument) -> CompileOutcome {
        self.compile(document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === find_latexmk tests ===

    #[test]
    fn test_latexmk_name_unix() {
        #[cfg(not(windows))]
        assert_eq!(latexmk_name(), "latexmk");
    }

    #[test]
    fn test_latexmk_name_windows() {
        #[cfg(windows)]
        assert_eq!(latexmk_name(), "latexmk.exe");
    }

    #[test]
    fn test_find_latexmk_env_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("latexmk");
        std::fs::write(&fake, "#!/bin/sh\n").unwrap();

        // SAFETY: Test runs in a single thread context
        unsafe { std::env::set_var("TIKZ_PREVIEW_LATEXMK", &fake) };
        assert_eq!(find_latexmk(), Some(fake));
        // Clean up
        // SAFETY: Test runs in a single thread context
        unsafe { std::env::remove_var("TIKZ_PREVIEW_LATEXMK") };
    }

    #[test]
    fn test_find_latexmk_env_override_directory() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("latexmk");
        std::fs::write(&fake, "#!/bin/sh\n").unwrap();

        // SAFETY: Test runs in a single thread context
        unsafe { std::env::set_var("TIKZ_PREVIEW_LATEXMK", dir.path()) };
        assert_eq!(find_latexmk(), Some(fake));
        // SAFETY: Test runs in a single thread context
        unsafe { std::env::remove_var("TIKZ_PREVIEW_LATEXMK") };
    }

    // === Runner construction ===

    #[test]
    fn test_default_runner_uses_default_timeout() {
        let runner = CompilerRunner::default();
        assert_eq!(runner.timeout, DEFAULT_TIMEOUT);
    }
}
