//! Shared crate-wide constants.
//! Centralizes the marker names and id conventions used by the interaction controllers.

// Class markers
/// Marker applied to labels related to the current selection.
pub const RELATED_CLASS: &str = "related";
/// Marker that hides a real edge while a ghost clone stands in for it during a drag.
pub const HIDDEN_CLASS: &str = "transparent";
/// Marker applied to every transient ghost element.
pub const GHOST_CLASS: &str = "ghost";
/// Marker applied to move vectors (origin to live position).
pub const VECTOR_CLASS: &str = "move-vector";
/// Marker applied to diagram resize/move control elements.
pub const CONTROL_CLASS: &str = "control";

// Ghost id suffixes
/// Suffix of the fixed clone that shows where a moving node started.
pub const ORIGIN_SUFFIX: &str = "__origin";
/// Suffix of the vector edge from a node's origin clone to its live position.
pub const VECTOR_SUFFIX: &str = "__vector";
/// Suffix of the clone that stands in for a hidden adjacent edge.
pub const EDGE_CLONE_SUFFIX: &str = "__clone";
/// Suffix of the vector from an adjacent edge's fixed end to its live end.
pub const ADJACENT_VECTOR_SUFFIX: &str = "__adjacent";
/// Id of the control node that follows the pointer during a move.
pub const MOVE_CONTROL_ID: &str = "__move_control";

/// Suffix marking a synthetic edge produced by splitting a broken line.
pub const BROKEN_LINE_SUFFIX: &str = "_B";

// Diagram controls
/// Suffix of the body control that moves the whole diagram.
pub const DIAGRAM_BODY_SUFFIX: &str = "__body";
/// Infix placed between the diagram id and the handle name of a resize handle.
pub const DIAGRAM_HANDLE_INFIX: &str = "__handle_";

// Listener owners
/// Listener owner name used by the move controller.
pub const MOVE_LISTENER: &str = "move-controller";
/// Listener owner name used by the diagram controller.
pub const DIAGRAM_LISTENER: &str = "diagram-controller";
