/*
 * compiler/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compilation of assembled documents via the external LaTeX toolchain.
 */

//! Compilation of assembled documents via the external LaTeX toolchain.
//!
//! The runner shells out to `latexmk` in an isolated temporary workspace
//! and reports every failure as a typed stage rather than an error to
//! propagate: a failed compile is an expected outcome the caller turns
//! into user-facing diagnostics.

pub mod error_parser;
pub mod runner;

use serde::Serialize;

use crate::assemble::AssembledDocument;

pub use error_parser::{TexDiagnostic, TexLogParser, UNKNOWN_ERROR};
pub use runner::{
    CompilerRunner, DEFAULT_TIMEOUT, INPUT_FILE_NAME, OUTPUT_FILE_NAME, find_latexmk,
};

/// Stage at which a compilation attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The LaTeX toolchain is not installed or not on PATH.
    CompilerNotFound,
    /// The temporary workspace could not be created.
    TempDir,
    /// The TeX source could not be written into the workspace.
    Write,
    /// The compiler exited non-zero, timed out, or failed to spawn.
    Compile,
    /// The compiler reported success but the output PDF was absent or
    /// unreadable.
    ReadOutput,
}

/// Structured record of a failed compilation attempt.
#[derive(Debug, Clone, Serialize)]
pub struct CompileFailure {
    pub stage: FailureStage,
    pub message: String,
    pub stdout: String,
    pub stderr: String,
    /// Human-meaningful error recovered from the TeX log, when the failure
    /// reached the compile stage.
    pub parsed_error: Option<String>,
    /// 1-based line in the *assembled* document; callers map it back to the
    /// original source before navigating.
    pub error_line: Option<usize>,
}

impl CompileFailure {
    /// A failure with no captured compiler output.
    pub fn new(stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            stdout: String::new(),
            stderr: String::new(),
            parsed_error: None,
            error_line: None,
        }
    }
}

/// Result of one compile attempt.
#[derive(Debug, Clone)]
pub enum CompileOutcome {
    Success { pdf: Vec<u8> },
    Failure(CompileFailure),
}

/// Seam for the compile step, implemented by [`CompilerRunner`]. Hosts and
/// tests can substitute their own compiler.
#[async_trait::async_trait]
pub trait Compiler: Send + Sync {
    async fn run(&self, document: &AssembledDocument) -> CompileOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_stage_serializes_snake_case() {
        let json = serde_json::to_string(&FailureStage::ReadOutput).unwrap();
        assert_eq!(json, "\"read_output\"");
        let json = serde_json::to_string(&FailureStage::CompilerNotFound).unwrap();
        assert_eq!(json, "\"compiler_not_found\"");
    }

    #[test]
    fn test_failure_record_serializes() {
        let failure = CompileFailure {
            stage: FailureStage::Compile,
            message: "latexmk exited with exit status: 12".to_string(),
            stdout: "! Undefined control sequence.".to_string(),
            stderr: String::new(),
            parsed_error: Some("Undefined control sequence.".to_string()),
            error_line: Some(7),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["stage"], "compile");
        assert_eq!(json["error_line"], 7);
        assert_eq!(json["parsed_error"], "Undefined control sequence.");
    }

    #[test]
    fn test_new_failure_has_no_captured_output() {
        let failure = CompileFailure::new(FailureStage::TempDir, "disk full");
        assert!(failure.stdout.is_empty());
        assert!(failure.stderr.is_empty());
        assert!(failure.parsed_error.is_none());
        assert!(failure.error_line.is_none());
    }
}
