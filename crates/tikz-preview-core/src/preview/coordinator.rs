/*
 * preview/coordinator.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-request orchestration and the marker registry.
 */

//! Per-request orchestration and the marker registry.
//!
//! One coordinator owns the registry of live preview markers, keyed by
//! document. A request locates the snippet, derives the preamble from the
//! resolved root, assembles and compiles, then either hands the PDF to the
//! slot or dispatches one stage-specific notification, navigates to the
//! mapped error location when one exists, and tears the marker down.
//!
//! Markers replace, never stack: installing a marker first tears down any
//! marker in the same document whose range overlaps the new one.
//! Non-overlapping previews in the same document coexist. Within one slot,
//! a request's effects are fully replaced before the next request's effects
//! are installed; across documents there is no ordering guarantee and none
//! is needed.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, info};

use super::slot::{Host, PresentationSlot};
use crate::assemble::assemble;
use crate::compiler::{CompileFailure, CompileOutcome, Compiler, CompilerRunner, FailureStage};
use crate::document::{DocumentId, Position, Range, Selection};
use crate::error::PreviewError;
use crate::locator::{SnippetLocator, TIKZ_ENVIRONMENT};
use crate::preamble::PreambleBuilder;
use crate::root::resolve_root;
use crate::source_map::map_error_line;

/// One preview invocation, as supplied by the host.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub document: DocumentId,
    pub buffer_text: String,
    pub cursor: Position,
    pub selection: Option<Selection>,
    /// Path of the edited buffer, if it is saved.
    pub buffer_path: Option<PathBuf>,
    /// Root override supplied by the host (project setting).
    pub external_root: Option<PathBuf>,
}

/// Lifecycle of one marker. An absent marker is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Compiling,
    Rendering,
    Failed,
}

struct ActiveMarker {
    range: Range,
    state: SlotState,
    slot: Box<dyn PresentationSlot>,
}

/// Orchestrates preview requests and owns all live markers.
pub struct PreviewCoordinator<H: Host> {
    host: H,
    locator: SnippetLocator,
    builder: PreambleBuilder,
    compiler: Box<dyn Compiler>,
    markers: HashMap<DocumentId, Vec<ActiveMarker>>,
}

impl<H: Host> PreviewCoordinator<H> {
    pub fn new(host: H) -> Self {
        Self::with_compiler(host, Box::new(CompilerRunner::default()))
    }

    /// Build a coordinator with a specific compiler (custom timeout, test
    /// double).
    pub fn with_compiler(host: H, compiler: Box<dyn Compiler>) -> Self {
        Self {
            host,
            locator: SnippetLocator::default(),
            builder: PreambleBuilder::default(),
            compiler,
            markers: HashMap::new(),
        }
    }

    /// Handle one preview request end to end.
    ///
    /// Location failures short-circuit before any compilation. Every other
    /// failure is surfaced through the slot as one notification and removes
    /// the marker; the returned error mirrors what was surfaced.
    pub async fn preview(&mut self, request: PreviewRequest) -> Result<(), PreviewError> {
        let Some(snippet) =
            self.locator
                .locate(&request.buffer_text, request.cursor, request.selection.as_ref())
        else {
            let err = PreviewError::locate(TIKZ_ENVIRONMENT);
            self.host.warn(&err.to_string());
            return Err(err);
        };

        let resolved = resolve_root(
            &request.buffer_text,
            request.buffer_path.as_deref(),
            request.external_root.as_deref(),
        );
        if let Some(warning) = &resolved.warning {
            self.host.warn(warning);
        }

        let preamble = self.builder.build(&resolved.root);
        if let Some(warning) = &preamble.warning {
            self.host.warn(warning);
        }

        let assembled = assemble(&preamble, &snippet.text);

        self.install_marker(&request.document, snippet.range);

        debug!(document = %request.document, "Starting compile");
        let outcome = self.compiler.run(&assembled).await;

        match outcome {
            CompileOutcome::Success { pdf } => {
                info!(document = %request.document, bytes = pdf.len(), "Preview ready");
                if let Some(marker) = self.marker_mut(&request.document, &snippet.range) {
                    marker.slot.show(&pdf);
                    marker.state = SlotState::Rendering;
                }
                Ok(())
            }
            CompileOutcome::Failure(failure) => {
                let navigate = failure
                    .error_line
                    .map(|line| map_error_line(line, &preamble, &snippet));
                let message = notification_for(&failure);
                if let Some(marker) = self.marker_mut(&request.document, &snippet.range) {
                    marker.state = SlotState::Failed;
                    marker.slot.show_error(&message, navigate.as_ref());
                }
                self.remove_marker(&request.document, &snippet.range);
                Err(PreviewError::Compile(failure))
            }
        }
    }

    /// The host closed a preview view; forget its marker.
    pub fn marker_closed(&mut self, document: &DocumentId, range: &Range) {
        self.remove_marker(document, range);
    }

    /// Number of live markers for a document.
    pub fn marker_count(&self, document: &DocumentId) -> usize {
        self.markers.get(document).map_or(0, Vec::len)
    }

    /// State of the marker at `range`, if one is live.
    pub fn marker_state(&self, document: &DocumentId, range: &Range) -> Option<SlotState> {
        self.markers
            .get(document)?
            .iter()
            .find(|marker| marker.range == *range)
            .map(|marker| marker.state)
    }

    fn install_marker(&mut self, document: &DocumentId, range: Range) {
        let entries = self.markers.entry(document.clone()).or_default();

        // Replace, never stack: anything overlapping the new range goes
        // down before the new marker is installed.
        entries.retain_mut(|marker| {
            if marker.range.overlaps(&range) {
                marker.slot.close();
                false
            } else {
                true
            }
        });

        let slot = self.host.create_slot(document, &range);
        entries.push(ActiveMarker {
            range,
            state: SlotState::Compiling,
            slot,
        });
    }

    fn marker_mut(&mut self, document: &DocumentId, range: &Range) -> Option<&mut ActiveMarker> {
        self.markers
            .get_mut(document)?
            .iter_mut()
            .find(|marker| marker.range == *range)
    }

    fn remove_marker(&mut self, document: &DocumentId, range: &Range) {
        if let Some(entries) = self.markers.get_mut(document) {
            entries.retain_mut(|marker| {
                if marker.range == *range {
                    marker.slot.close();
                    false
                } else {
                    true
                }
            });
            if entries.is_empty() {
                self.markers.remove(document);
            }
        }
    }
}

/// One user-visible notification per failed stage.
fn notification_for(failure: &CompileFailure) -> String {
    match failure.stage {
        FailureStage::CompilerNotFound => {
            format!("Compilation failed: {}", failure.message)
        }
        FailureStage::TempDir => format!(
            "Compilation failed: could not create temporary directory.\n{}",
            failure.message
        ),
        FailureStage::Write => format!(
            "Compilation failed: could not write LaTeX file.\n{}",
            failure.message
        ),
        FailureStage::Compile => match &failure.parsed_error {
            Some(parsed) => format!("Compilation failed. Possible cause:\n{parsed}"),
            None => format!("Compilation failed: {}", failure.message),
        },
        FailureStage::ReadOutput => format!(
            "Compilation failed: could not read output PDF.\n{}",
            failure.message
        ),
    }
}
