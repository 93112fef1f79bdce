//! Pointer-driven interaction on the scene graph.
//!
//! Two controllers live here:
//!
//! - `move_controller` - drags the current selection, with ghost feedback for
//!   origins, move vectors and adjacent edges
//! - `diagram_controller` - moves and resizes a diagram box through a body
//!   control and eight resize handles
//!
//! Both follow the same gesture lifecycle: `begin` arms the gesture and
//! snapshots everything it will touch, `update` recomputes from that snapshot,
//! and `end` commits and tears down. Dropping a controller mid-gesture cancels
//! it, so transient elements and listeners never outlive the controller.

mod diagram_controller;
mod move_controller;

pub use diagram_controller::DiagramController;
pub use move_controller::MoveController;

use crate::scene::SceneGraph;
use crate::types::Cursor;

/// Where a controller is in its gesture lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    /// No gesture in progress
    #[default]
    Idle,
    /// Pointer is down, nothing moved yet
    Armed,
    /// At least one update has been processed
    Dragging,
}

/// Scene interaction flags a gesture overrides and must give back.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SceneFlags {
    box_selection: bool,
    panning: bool,
    cursor: Cursor,
}

impl SceneFlags {
    fn capture<S: SceneGraph + ?Sized>(scene: &S) -> Self {
        Self {
            box_selection: scene.box_selection_enabled(),
            panning: scene.panning_enabled(),
            cursor: scene.cursor(),
        }
    }

    /// Disables box selection and panning and shows `cursor`.
    fn lock<S: SceneGraph + ?Sized>(scene: &mut S, cursor: Cursor) {
        scene.set_box_selection_enabled(false);
        scene.set_panning_enabled(false);
        scene.set_cursor(cursor);
    }

    fn restore<S: SceneGraph + ?Sized>(self, scene: &mut S) {
        scene.set_box_selection_enabled(self.box_selection);
        scene.set_panning_enabled(self.panning);
        scene.set_cursor(self.cursor);
    }
}

#[cfg(test)]
mod tests;
