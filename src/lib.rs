//! # Plan Sheet Editor
//!
//! The interaction core of a survey plan sheet editor. Surveyed coordinates,
//! the lines between them and their labels are drawn inside diagrams placed
//! on sheet pages; this crate implements how they are selected, dragged and
//! resized, and how the results are written back into the document.
//!
//! ## Features
//! - Constrained move and aspect-preserving resize of boxes
//! - Selection tracking with line-group closure and related-label highlights
//! - Move gestures with ghost feedback for origins and adjacent edges
//! - Diagram move/resize controls with eight handles
//! - Single-level undo, with cut and paste undone as one step
//!
//! Rendering and hit-testing belong to the host. It provides a
//! [`SceneGraph`] and a [`CoordinateMapper`], or uses the in-memory [`Scene`]
//! and [`PageMapper`] shipped here.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod config;
mod constants;
mod editor;
mod error;
mod geometry;
mod interaction;
mod mapper;
mod scene;
mod selection;
mod sheet;
mod types;

pub use config::EditorConfig;
pub use constants::*;
pub use editor::{ClipboardItem, ClipboardPayload, EditorState, PlanSheetEditor, UndoBuffer};
pub use error::EditorError;
pub use geometry::*;
pub use interaction::{DiagramController, GesturePhase, MoveController};
pub use mapper::{CoordinateMapper, PageMapper};
pub use scene::{share, Attr, Scene, SceneGraph, SceneHandle};
pub use selection::{is_feature_id, related_elements, Selection, SelectionMode, SelectionTracker};
pub use sheet::*;
pub use types::*;

/// Routes `log` output through the test harness. Safe to call from every test.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
