/*
 * preview/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Preview request lifecycle and presentation seams.
 */

//! Preview request lifecycle and presentation seams.
//!
//! The coordinator owns all live preview markers and drives a request from
//! snippet location through compilation to presentation. The host side
//! (editor decorations, a CLI, a test harness) plugs in behind the
//! [`Host`] and [`PresentationSlot`] traits; the pipeline never touches a
//! UI directly.

pub mod coordinator;
pub mod slot;

pub use coordinator::{PreviewCoordinator, PreviewRequest, SlotState};
pub use slot::{Host, PresentationSlot};
