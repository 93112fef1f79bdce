//! Scene element types shared by the scene graph and the interaction controllers.
//!
//! Scene positions are always in screen space. Conversion to ground or page
//! space goes through a [`crate::mapper::CoordinateMapper`].

use egui::Pos2;
use std::collections::BTreeSet;

/// Identifier of a scene element.
pub type ElementId = String;

/// The class of a scene element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A surveyed coordinate (line endpoint)
    Coordinate,
    /// A text label, either tied to a feature or floating on the page
    Label,
    /// A line segment between two coordinates
    Line,
    /// A diagram corner or region marker
    Diagram,
    /// Transient feedback element created during a gesture
    Ghost,
    /// Transient handle used to drive a diagram move or resize
    Control,
}

impl ElementKind {
    /// Ghosts and controls are never part of the persisted scene.
    pub fn is_transient(self) -> bool {
        matches!(self, ElementKind::Ghost | ElementKind::Control)
    }
}

/// Linkage and placement attributes of a scene element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementData {
    /// Groups a label with the feature it annotates
    pub feature_id: Option<String>,
    /// Groups the segments that form one logical line
    pub line_id: Option<String>,
    /// Diagram whose ground space the element belongs to; `None` for page space
    pub diagram_id: Option<String>,
    /// Angle of a label's anchor around its feature, in degrees
    pub anchor_angle: Option<f32>,
    /// Distance of a label from its anchor point
    pub point_offset: Option<f32>,
    /// Text rotation in degrees
    pub text_rotation: Option<f32>,
    /// For broken-line fragments: the node recorded as the line's break point
    pub broken_coordinate_id: Option<ElementId>,
}

impl ElementData {
    /// Data for a label annotating `feature_id`.
    pub fn with_feature(feature_id: impl Into<String>) -> Self {
        Self {
            feature_id: Some(feature_id.into()),
            ..Default::default()
        }
    }

    /// Data for a segment of line `line_id`.
    pub fn with_line(line_id: impl Into<String>) -> Self {
        Self {
            line_id: Some(line_id.into()),
            ..Default::default()
        }
    }

    /// Places the element in `diagram_id`'s ground space.
    pub fn in_diagram(mut self, diagram_id: impl Into<String>) -> Self {
        self.diagram_id = Some(diagram_id.into());
        self
    }
}

/// A point-like scene element.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Unique within the scene
    pub id: ElementId,
    /// What the node stands for
    pub kind: ElementKind,
    /// Position in screen space
    pub position: Pos2,
    /// Linkage attributes
    pub data: ElementData,
    /// Non-persistent markers such as highlight or hidden
    pub classes: BTreeSet<String>,
    /// Selection state as shown by the host
    pub selected: bool,
}

impl SceneNode {
    /// Creates an unselected node with no class markers.
    pub fn new(id: impl Into<ElementId>, kind: ElementKind, position: Pos2) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data: ElementData::default(),
            classes: BTreeSet::new(),
            selected: false,
        }
    }

    /// Replaces the node's data.
    pub fn with_data(mut self, data: ElementData) -> Self {
        self.data = data;
        self
    }

    /// Adds a class marker.
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }
}

/// A segment connecting two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEdge {
    /// Unique within the scene
    pub id: ElementId,
    /// What the edge stands for
    pub kind: ElementKind,
    /// Node the segment starts at
    pub source: ElementId,
    /// Node the segment ends at
    pub target: ElementId,
    /// Linkage attributes
    pub data: ElementData,
    /// Non-persistent markers such as highlight or hidden
    pub classes: BTreeSet<String>,
    /// Selection state as shown by the host
    pub selected: bool,
}

impl SceneEdge {
    /// Creates an unselected edge with no class markers.
    pub fn new(
        id: impl Into<ElementId>,
        kind: ElementKind,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            source: source.into(),
            target: target.into(),
            data: ElementData::default(),
            classes: BTreeSet::new(),
            selected: false,
        }
    }

    /// Replaces the edge's data.
    pub fn with_data(mut self, data: ElementData) -> Self {
        self.data = data;
        self
    }

    /// Adds a class marker.
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    /// Returns the endpoint on the other side of `node_id`, if the edge touches it.
    pub fn opposite(&self, node_id: &str) -> Option<&ElementId> {
        if self.source == node_id {
            Some(&self.target)
        } else if self.target == node_id {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// Emitted once per completed move gesture.
///
/// Carries every node whose position changed, in screen space. Edges carry no
/// position of their own and follow their endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementsChanged {
    /// Nodes in screen space, each listed once
    pub elements: Vec<SceneNode>,
}

impl ElementsChanged {
    /// Number of changed nodes.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Finds a changed node by id.
    pub fn get(&self, id: &str) -> Option<&SceneNode> {
        self.elements.iter().find(|n| n.id == id)
    }
}

/// Committed result of a diagram move or resize, in the diagram's own terms.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramPlacement {
    /// The diagram that was moved or resized
    pub diagram_id: String,
    /// Page position (mm) of the diagram's top-left corner
    pub origin: (f32, f32),
    /// Page millimetres per ground unit
    pub zoom: f32,
}

/// Mouse cursor requested by the active interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Platform default pointer
    #[default]
    Default,
    /// Drag in progress
    Move,
    /// Resizing through a handle
    Resize(crate::geometry::ResizeControl),
}

/// Pointer events a controller can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PointerEventKind {
    /// Button pressed
    Down,
    /// Pointer moved
    Move,
    /// Button released
    Up,
}
