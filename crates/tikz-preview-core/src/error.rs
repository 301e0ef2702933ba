/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Failure taxonomy for the preview pipeline.
 */

//! Failure taxonomy for the preview pipeline.
//!
//! Every failure is handled at the stage it occurs and surfaced as exactly
//! one user-visible notification; none are fatal to the process, and a
//! failed preview never corrupts state for subsequent requests.

use thiserror::Error;

use crate::compiler::CompileFailure;

/// Errors a preview request can end in.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Snippet boundaries could not be determined. Nothing was compiled.
    #[error("Could not find any {environment} picture near the cursor")]
    Locate {
        /// The environment that was searched for.
        environment: String,
    },

    /// A staged compilation failure; carries the full failure record.
    #[error("{}", .0.message)]
    Compile(CompileFailure),
}

impl PreviewError {
    /// Create a "locate" error for the given environment.
    pub fn locate(environment: impl Into<String>) -> Self {
        Self::Locate {
            environment: environment.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::FailureStage;

    #[test]
    fn test_locate_error_names_the_environment() {
        let err = PreviewError::locate("tikzpicture");
        let msg = format!("{err}");
        assert!(msg.contains("tikzpicture"));
        assert!(msg.contains("near the cursor"));
    }

    #[test]
    fn test_compile_error_shows_stage_message() {
        let err = PreviewError::Compile(CompileFailure::new(
            FailureStage::Write,
            "Could not write tikz.tex: disk full",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("disk full"));
    }
}
