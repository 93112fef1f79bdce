//! The scene graph the interaction controllers operate on.
//!
//! [`SceneGraph`] is the seam towards whatever renders the sheet. [`Scene`] is
//! the in-memory implementation used when the editor owns its own scene.

use crate::error::EditorError;
use crate::mapper::CoordinateMapper;
use crate::sheet::Page;
use crate::types::*;
use egui::Pos2;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Shared, single-threaded handle to a scene graph.
///
/// The hosting canvas owns the scene; controllers keep a clone of the handle
/// and borrow it for the duration of a single call.
pub type SceneHandle<S> = Rc<RefCell<S>>;

/// Wraps a scene into a [`SceneHandle`].
pub fn share<S: SceneGraph>(scene: S) -> SceneHandle<S> {
    Rc::new(RefCell::new(scene))
}

/// Attributes that can be used in equality queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    /// Matches [`ElementData::feature_id`]
    FeatureId,
    /// Matches [`ElementData::line_id`]
    LineId,
    /// Matches [`ElementData::diagram_id`]
    DiagramId,
}

impl Attr {
    fn read(self, data: &ElementData) -> Option<&str> {
        match self {
            Attr::FeatureId => data.feature_id.as_deref(),
            Attr::LineId => data.line_id.as_deref(),
            Attr::DiagramId => data.diagram_id.as_deref(),
        }
    }
}

/// Query and mutation API over a scene of nodes and edges.
pub trait SceneGraph {
    /// Looks up a node.
    fn node(&self, id: &str) -> Option<&SceneNode>;
    /// Looks up an edge.
    fn edge(&self, id: &str) -> Option<&SceneEdge>;

    /// Adds a node, replacing any node with the same id.
    fn add_node(&mut self, node: SceneNode);
    /// Adds an edge, replacing any edge with the same id.
    fn add_edge(&mut self, edge: SceneEdge);
    /// Removes a node or edge. Removing a node also removes its edges.
    fn remove(&mut self, id: &str) -> bool;

    /// Ids of nodes whose `attr` equals `value`.
    fn nodes_where(&self, attr: Attr, value: &str) -> Vec<ElementId>;
    /// Ids of edges whose `attr` equals `value`.
    fn edges_where(&self, attr: Attr, value: &str) -> Vec<ElementId>;
    /// Ids of edges that have `node_id` as an endpoint.
    fn connected_edges(&self, node_id: &str) -> Vec<ElementId>;

    /// Moves a node. Fails for ids that are not nodes.
    fn set_position(&mut self, id: &str, position: Pos2) -> Result<(), EditorError>;

    /// Adds a class marker. Fails if the element does not exist.
    fn add_class(&mut self, id: &str, class: &str) -> Result<(), EditorError>;
    /// Removing an absent class, or a class from a missing element, is a no-op.
    fn remove_class(&mut self, id: &str, class: &str);
    /// True if the element exists and carries `class`.
    fn has_class(&self, id: &str, class: &str) -> bool;

    /// Marks an element selected or unselected.
    fn set_selected(&mut self, id: &str, selected: bool) -> Result<(), EditorError>;

    /// Turns rubber-band selection on or off.
    fn set_box_selection_enabled(&mut self, enabled: bool);
    /// Whether rubber-band selection is on.
    fn box_selection_enabled(&self) -> bool;
    /// Turns viewport panning on or off.
    fn set_panning_enabled(&mut self, enabled: bool);
    /// Whether viewport panning is on.
    fn panning_enabled(&self) -> bool;
    /// Requests a mouse cursor.
    fn set_cursor(&mut self, cursor: Cursor);
    /// The cursor last requested.
    fn cursor(&self) -> Cursor;

    /// Registers `owner` for pointer events of `kind`.
    fn attach_listener(&mut self, owner: &str, kind: PointerEventKind);
    /// Removes every listener registered by `owner`.
    fn detach_listeners(&mut self, owner: &str);
    /// True if `owner` listens for `kind`.
    fn has_listener(&self, owner: &str, kind: PointerEventKind) -> bool;

    /// True if a node or an edge has this id.
    fn contains(&self, id: &str) -> bool {
        self.node(id).is_some() || self.edge(id).is_some()
    }

    /// Screen position of a node.
    fn position(&self, id: &str) -> Option<Pos2> {
        self.node(id).map(|n| n.position)
    }

    /// Positions of an edge's source and target.
    fn edge_endpoints(&self, id: &str) -> Option<(Pos2, Pos2)> {
        let edge = self.edge(id)?;
        Some((self.position(&edge.source)?, self.position(&edge.target)?))
    }

    /// Point halfway between an edge's endpoints.
    fn edge_midpoint(&self, id: &str) -> Option<Pos2> {
        let (a, b) = self.edge_endpoints(id)?;
        Some(a.lerp(b, 0.5))
    }
}

/// In-memory scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    nodes: BTreeMap<ElementId, SceneNode>,
    edges: BTreeMap<ElementId, SceneEdge>,
    box_selection: bool,
    panning: bool,
    cursor: Cursor,
    listeners: BTreeSet<(String, PointerEventKind)>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            box_selection: true,
            panning: true,
            cursor: Cursor::Default,
            listeners: BTreeSet::new(),
        }
    }
}

impl Scene {
    /// An empty scene with box selection and panning enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the scene for one page, converting every position to screen
    /// space through `mapper`.
    ///
    /// Coordinates become `Coordinate` nodes, each line segment becomes an edge
    /// carrying the line's id as `line_id`, and labels become `Label` nodes with
    /// their feature as `feature_id`.
    pub fn from_page(page: &Page, mapper: &impl CoordinateMapper) -> Self {
        let mut scene = Scene::new();
        for diagram in &page.diagrams {
            let diagram_id = diagram.id.as_str();
            for coordinate in &diagram.coordinates {
                let ground = egui::pos2(coordinate.position.0, coordinate.position.1);
                scene.add_node(
                    SceneNode::new(coordinate.id.to_string(), ElementKind::Coordinate, mapper.ground_to_screen(ground, Some(diagram_id)))
                        .with_data(ElementData::default().in_diagram(diagram_id)),
                );
            }
            for line in &diagram.lines {
                let segments = line.coordinate_ids.windows(2).enumerate();
                let multi = line.coordinate_ids.len() > 2;
                for (i, pair) in segments {
                    let id = if multi {
                        format!("{}_{}", line.id, i)
                    } else {
                        line.id.to_string()
                    };
                    scene.add_edge(
                        SceneEdge::new(id, ElementKind::Line, pair[0].to_string(), pair[1].to_string())
                            .with_data(ElementData::with_line(line.id.to_string()).in_diagram(diagram_id)),
                    );
                }
            }
            for label in &diagram.labels {
                let ground = egui::pos2(label.position.0, label.position.1);
                let mut data = ElementData::default().in_diagram(diagram_id);
                data.feature_id = label.feature_id.map(|f| f.to_string());
                data.text_rotation = Some(label.rotation);
                scene.add_node(
                    SceneNode::new(label.id.clone(), ElementKind::Label, mapper.ground_to_screen(ground, Some(diagram_id)))
                        .with_data(data),
                );
            }
        }
        for label in &page.labels {
            let page_pos = egui::pos2(label.position.0, label.position.1);
            let data = ElementData {
                text_rotation: Some(label.rotation),
                ..Default::default()
            };
            scene.add_node(
                SceneNode::new(label.id.clone(), ElementKind::Label, mapper.ground_to_screen(page_pos, None)).with_data(data),
            );
        }
        log::debug!(
            "built scene for page {}: {} nodes, {} edges",
            page.number,
            scene.nodes.len(),
            scene.edges.len()
        );
        scene
    }

    /// Every node, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    /// Every edge, ordered by id.
    pub fn edges(&self) -> impl Iterator<Item = &SceneEdge> {
        self.edges.values()
    }

    /// Number of transient ghost or control elements currently in the scene.
    pub fn transient_count(&self) -> usize {
        self.nodes.values().filter(|n| n.kind.is_transient()).count()
            + self.edges.values().filter(|e| e.kind.is_transient()).count()
    }

    fn classes_mut(&mut self, id: &str) -> Option<&mut BTreeSet<String>> {
        if let Some(node) = self.nodes.get_mut(id) {
            return Some(&mut node.classes);
        }
        self.edges.get_mut(id).map(|e| &mut e.classes)
    }
}

impl SceneGraph for Scene {
    fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    fn edge(&self, id: &str) -> Option<&SceneEdge> {
        self.edges.get(id)
    }

    fn add_node(&mut self, node: SceneNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    fn add_edge(&mut self, edge: SceneEdge) {
        self.edges.insert(edge.id.clone(), edge);
    }

    fn remove(&mut self, id: &str) -> bool {
        if self.nodes.remove(id).is_some() {
            self.edges.retain(|_, e| e.source != id && e.target != id);
            return true;
        }
        self.edges.remove(id).is_some()
    }

    fn nodes_where(&self, attr: Attr, value: &str) -> Vec<ElementId> {
        self.nodes
            .values()
            .filter(|n| attr.read(&n.data) == Some(value))
            .map(|n| n.id.clone())
            .collect()
    }

    fn edges_where(&self, attr: Attr, value: &str) -> Vec<ElementId> {
        self.edges
            .values()
            .filter(|e| attr.read(&e.data) == Some(value))
            .map(|e| e.id.clone())
            .collect()
    }

    fn connected_edges(&self, node_id: &str) -> Vec<ElementId> {
        self.edges
            .values()
            .filter(|e| e.source == node_id || e.target == node_id)
            .map(|e| e.id.clone())
            .collect()
    }

    fn set_position(&mut self, id: &str, position: Pos2) -> Result<(), EditorError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| EditorError::UnknownElement(id.to_string()))?;
        node.position = position;
        Ok(())
    }

    fn add_class(&mut self, id: &str, class: &str) -> Result<(), EditorError> {
        let classes = self
            .classes_mut(id)
            .ok_or_else(|| EditorError::UnknownElement(id.to_string()))?;
        classes.insert(class.to_string());
        Ok(())
    }

    fn remove_class(&mut self, id: &str, class: &str) {
        if let Some(classes) = self.classes_mut(id) {
            classes.remove(class);
        }
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.nodes
            .get(id)
            .map(|n| n.classes.contains(class))
            .or_else(|| self.edges.get(id).map(|e| e.classes.contains(class)))
            .unwrap_or(false)
    }

    fn set_selected(&mut self, id: &str, selected: bool) -> Result<(), EditorError> {
        if let Some(node) = self.nodes.get_mut(id) {
            node.selected = selected;
            return Ok(());
        }
        let edge = self
            .edges
            .get_mut(id)
            .ok_or_else(|| EditorError::UnknownElement(id.to_string()))?;
        edge.selected = selected;
        Ok(())
    }

    fn set_box_selection_enabled(&mut self, enabled: bool) {
        self.box_selection = enabled;
    }

    fn box_selection_enabled(&self) -> bool {
        self.box_selection
    }

    fn set_panning_enabled(&mut self, enabled: bool) {
        self.panning = enabled;
    }

    fn panning_enabled(&self) -> bool {
        self.panning
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn attach_listener(&mut self, owner: &str, kind: PointerEventKind) {
        self.listeners.insert((owner.to_string(), kind));
    }

    fn detach_listeners(&mut self, owner: &str) {
        self.listeners.retain(|(o, _)| o != owner);
    }

    fn has_listener(&self, owner: &str, kind: PointerEventKind) -> bool {
        self.listeners.contains(&(owner.to_string(), kind))
    }
}
