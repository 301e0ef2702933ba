/*
 * preview/slot.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Presentation capabilities provided by the host.
 */

//! Presentation capabilities provided by the host.

use crate::document::{DocumentId, Range};
use crate::source_map::MappedError;

/// A live preview anchor tied to one buffer region.
///
/// An editor backs this with an inline decoration; the CLI backs it with an
/// output file and stderr. The coordinator calls exactly one of [`show`] or
/// [`show_error`] per request, and [`close`] when the anchor is torn down.
///
/// [`show`]: PresentationSlot::show
/// [`show_error`]: PresentationSlot::show_error
/// [`close`]: PresentationSlot::close
pub trait PresentationSlot: Send {
    /// Display the rendered PDF bytes.
    fn show(&mut self, pdf: &[u8]);

    /// Display a failure, optionally navigating to the mapped location.
    fn show_error(&mut self, message: &str, navigate_to: Option<&MappedError>);

    /// Tear down the anchor and release its resources.
    fn close(&mut self);
}

/// Host surface the coordinator talks to.
pub trait Host: Send {
    /// Create a slot anchored at `range` in `document`.
    fn create_slot(&mut self, document: &DocumentId, range: &Range) -> Box<dyn PresentationSlot>;

    /// Surface a non-fatal warning.
    fn warn(&mut self, message: &str);
}
