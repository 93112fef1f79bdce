//! Dragging a selection of nodes, edges and their labels.

use super::{GesturePhase, SceneFlags};
use crate::constants::*;
use crate::error::EditorError;
use crate::geometry::{bounding_box, move_extent};
use crate::scene::{Attr, SceneGraph, SceneHandle};
use crate::selection::related_elements;
use crate::types::*;
use egui::{Pos2, Rect, Vec2};

/// An edge touching a moving node that is not itself selected.
#[derive(Debug, Clone)]
struct TrackedEdge {
    id: ElementId,
    line_id: Option<String>,
    start_midpoint: Pos2,
}

/// Everything captured at pointer-down. Updates only ever read from here.
#[derive(Debug)]
struct MoveGesture {
    start_pointer: Pos2,
    /// Box of the selected elements when the gesture began
    start_extent: Rect,
    moving: Vec<(ElementId, Pos2)>,
    tracked: Vec<TrackedEdge>,
    /// Transient elements to remove on teardown, in creation order
    ghosts: Vec<ElementId>,
    dragged: bool,
    restore: SceneFlags,
}

/// Drives a move gesture over a fixed selection.
///
/// The controller owns a handle to the scene and mutates it only while a
/// gesture is active. Whatever ends the gesture (`end`, `cancel`, another
/// `begin`, or dropping the controller) removes every ghost, unhides adjacent
/// edges, restores the scene flags and detaches the listeners.
///
/// # Example
///
/// ```
/// use plansheet_editor::{share, ElementKind, MoveController, Scene, SceneGraph, SceneNode};
/// use egui::pos2;
///
/// let mut scene = Scene::new();
/// scene.add_node(SceneNode::new("1", ElementKind::Coordinate, pos2(10.0, 10.0)));
/// let scene = share(scene);
///
/// let mut mover = MoveController::new(scene.clone(), vec!["1".into()], None).unwrap();
/// mover.begin(pos2(10.0, 10.0)).unwrap();
/// mover.update(pos2(15.0, 12.0));
/// let changed = mover.end(pos2(20.0, 10.0)).unwrap();
/// assert_eq!(changed.get("1").map(|n| n.position), Some(pos2(20.0, 10.0)));
/// ```
pub struct MoveController<S: SceneGraph> {
    scene: SceneHandle<S>,
    selection: Vec<ElementId>,
    limits: Option<Rect>,
    gesture: Option<MoveGesture>,
}

impl<S: SceneGraph> MoveController<S> {
    /// Creates a controller for `selection`.
    ///
    /// # Arguments
    ///
    /// * `scene` - The shared scene the selection lives in
    /// * `selection` - Selected node and edge ids
    /// * `limits` - Box every selected element must stay inside, in screen space
    ///
    /// # Returns
    ///
    /// `EditorError::UnknownElement` if any selected id is not in the scene.
    pub fn new(scene: SceneHandle<S>, selection: Vec<ElementId>, limits: Option<Rect>) -> Result<Self, EditorError> {
        {
            let graph = scene.try_borrow().map_err(|_| EditorError::SceneBusy)?;
            if let Some(missing) = selection.iter().find(|id| !graph.contains(id)) {
                return Err(EditorError::UnknownElement(missing.clone()));
            }
        }
        Ok(Self {
            scene,
            selection,
            limits,
            gesture: None,
        })
    }

    /// Ids the controller was created for.
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    /// Where the current gesture is in its lifecycle.
    pub fn phase(&self) -> GesturePhase {
        match &self.gesture {
            None => GesturePhase::Idle,
            Some(gesture) if gesture.dragged => GesturePhase::Dragging,
            Some(_) => GesturePhase::Armed,
        }
    }

    /// Arms a gesture at `pointer`.
    ///
    /// Snapshots every moving node and adjacent edge, creates the ghost
    /// feedback elements, hides the adjacent edges and locks box selection
    /// and panning. A gesture already in progress is cancelled first.
    pub fn begin(&mut self, pointer: Pos2) -> Result<(), EditorError> {
        if self.gesture.is_some() {
            log::debug!("move restarted before the previous gesture ended");
            self.cancel();
        }

        let mut scene = self.scene.try_borrow_mut().map_err(|_| EditorError::SceneBusy)?;
        if let Some(missing) = self.selection.iter().find(|id| !scene.contains(id)) {
            return Err(EditorError::UnknownElement(missing.clone()));
        }
        let Some(start_extent) = selection_extent(&*scene, &self.selection) else {
            log::debug!("move requested with an empty selection");
            return Ok(());
        };

        let moving_ids = moving_nodes(&*scene, &self.selection);
        let moving: Vec<(ElementId, Pos2)> = moving_ids
            .iter()
            .filter_map(|id| scene.position(id).map(|p| (id.clone(), p)))
            .collect();
        let labels_only = self
            .selection
            .iter()
            .all(|id| scene.node(id).is_some_and(|n| n.kind == ElementKind::Label));
        let tracked = if labels_only {
            Vec::new()
        } else {
            adjacent_edges(&*scene, &self.selection, &moving_ids)
        };

        let restore = SceneFlags::capture(&*scene);
        let mut ghosts = spawn_ghosts(&mut *scene, &moving, &tracked, &moving_ids);
        for edge in &tracked {
            if let Err(err) = scene.add_class(&edge.id, HIDDEN_CLASS) {
                log::warn!("could not hide adjacent edge: {err}");
            }
        }
        scene.add_node(
            SceneNode::new(MOVE_CONTROL_ID, ElementKind::Control, start_extent.center()).with_class(CONTROL_CLASS),
        );
        ghosts.push(MOVE_CONTROL_ID.to_string());

        SceneFlags::lock(&mut *scene, Cursor::Move);
        scene.attach_listener(MOVE_LISTENER, PointerEventKind::Move);
        scene.attach_listener(MOVE_LISTENER, PointerEventKind::Up);
        drop(scene);

        log::debug!(
            "move armed: {} moving nodes, {} adjacent edges",
            moving.len(),
            tracked.len()
        );
        self.gesture = Some(MoveGesture {
            start_pointer: pointer,
            start_extent,
            moving,
            tracked,
            ghosts,
            dragged: false,
            restore,
        });
        Ok(())
    }

    /// Moves everything to follow `pointer`.
    ///
    /// Positions are recomputed from the start snapshot, never accumulated.
    /// The displacement is clamped so every selected element stays inside the
    /// limits. Connected nodes and related labels do not take part in the
    /// clamp.
    ///
    /// # Returns
    ///
    /// The applied displacement, or `None` when no gesture is active, the
    /// clamped displacement is zero, or the scene is borrowed elsewhere.
    pub fn update(&mut self, pointer: Pos2) -> Option<Vec2> {
        let gesture = self.gesture.as_mut()?;
        let requested = pointer - gesture.start_pointer;
        let moved = move_extent(gesture.start_extent, requested.x, requested.y, self.limits);
        let delta = moved.min - gesture.start_extent.min;
        let Ok(mut scene) = self.scene.try_borrow_mut() else {
            log::warn!("scene busy during move update; pointer ignored");
            return None;
        };
        gesture.dragged = true;

        for (id, start) in &gesture.moving {
            if let Err(err) = scene.set_position(id, *start + delta) {
                log::warn!("skipping position update during move: {err}");
            }
        }
        if let Err(err) = scene.set_position(MOVE_CONTROL_ID, moved.center()) {
            log::warn!("move control lost: {err}");
        }
        (delta != Vec2::ZERO).then_some(delta)
    }

    /// Finishes the gesture at `pointer`.
    ///
    /// # Returns
    ///
    /// One event listing every node that ended up somewhere else, including
    /// labels re-homed along adjacent edges. `None` if no gesture was active or
    /// nothing moved.
    pub fn end(&mut self, pointer: Pos2) -> Option<ElementsChanged> {
        let delta = self.update(pointer);
        let gesture = self.gesture.take()?;
        let event = delta.and_then(|_| self.commit(&gesture));
        self.teardown(gesture);
        match &event {
            Some(event) => log::debug!("move committed: {} elements changed", event.len()),
            None => log::debug!("move ended without displacement"),
        }
        event
    }

    /// Abandons the gesture, putting every moved node back where it started.
    pub fn cancel(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        match self.scene.try_borrow_mut() {
            Ok(mut scene) => {
                for (id, start) in &gesture.moving {
                    if let Err(err) = scene.set_position(id, *start) {
                        log::warn!("could not restore position on cancel: {err}");
                    }
                }
            }
            Err(_) => log::warn!("scene busy while cancelling move; positions not restored"),
        }
        self.teardown(gesture);
        log::debug!("move cancelled");
    }

    /// Re-homes labels of adjacent lines and collects the changed nodes.
    fn commit(&self, gesture: &MoveGesture) -> Option<ElementsChanged> {
        let Ok(mut scene) = self.scene.try_borrow_mut() else {
            log::warn!("scene busy at move release; no change emitted");
            return None;
        };
        let mut changed: Vec<ElementId> = gesture.moving.iter().map(|(id, _)| id.clone()).collect();

        for (line_id, shift) in label_shifts(&*scene, &gesture.tracked) {
            for label in scene.nodes_where(Attr::FeatureId, &line_id) {
                if changed.contains(&label) {
                    continue;
                }
                let Some(node) = scene.node(&label) else { continue };
                if node.kind.is_transient() {
                    continue;
                }
                let position = node.position + shift;
                match scene.set_position(&label, position) {
                    Ok(()) => changed.push(label),
                    Err(err) => log::warn!("could not re-home label: {err}"),
                }
            }
        }

        let elements = changed.iter().filter_map(|id| scene.node(id).cloned()).collect();
        Some(ElementsChanged { elements })
    }

    fn teardown(&self, gesture: MoveGesture) {
        let Ok(mut scene) = self.scene.try_borrow_mut() else {
            log::warn!("scene busy during move teardown; transient elements left in place");
            return;
        };
        for id in gesture.ghosts.iter().rev() {
            scene.remove(id);
        }
        for edge in &gesture.tracked {
            scene.remove_class(&edge.id, HIDDEN_CLASS);
        }
        gesture.restore.restore(&mut *scene);
        scene.detach_listeners(MOVE_LISTENER);
    }
}

impl<S: SceneGraph> Drop for MoveController<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn push_unique(ids: &mut Vec<ElementId>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

fn element_points<S: SceneGraph + ?Sized>(scene: &S, id: &str) -> Vec<Pos2> {
    match scene.edge_endpoints(id) {
        Some((a, b)) => vec![a, b],
        None => scene.position(id).into_iter().collect(),
    }
}

/// Box around every selected element, without the nodes and labels dragged
/// along with them.
fn selection_extent<S: SceneGraph + ?Sized>(scene: &S, selection: &[ElementId]) -> Option<Rect> {
    bounding_box(selection.iter().flat_map(|id| element_points(scene, id)))
}

/// Selected nodes, endpoints of selected edges, and the labels related to
/// either.
fn moving_nodes<S: SceneGraph + ?Sized>(scene: &S, selection: &[ElementId]) -> Vec<ElementId> {
    let mut moving = Vec::new();
    for id in selection {
        if let Some(edge) = scene.edge(id) {
            push_unique(&mut moving, &edge.source);
            push_unique(&mut moving, &edge.target);
        } else if scene.node(id).is_some() {
            push_unique(&mut moving, id);
        }
        for related in related_elements(scene, id) {
            push_unique(&mut moving, &related);
        }
    }
    moving
}

fn adjacent_edges<S: SceneGraph + ?Sized>(scene: &S, selection: &[ElementId], moving: &[ElementId]) -> Vec<TrackedEdge> {
    let mut tracked: Vec<TrackedEdge> = Vec::new();
    for node in moving {
        for id in scene.connected_edges(node) {
            if selection.contains(&id) || tracked.iter().any(|t| t.id == id) {
                continue;
            }
            let Some(edge) = scene.edge(&id) else { continue };
            if edge.kind.is_transient() {
                continue;
            }
            let Some(start_midpoint) = scene.edge_midpoint(&id) else { continue };
            tracked.push(TrackedEdge {
                line_id: edge.data.line_id.clone(),
                start_midpoint,
                id,
            });
        }
    }
    tracked
}

fn origin_id(id: &str) -> ElementId {
    format!("{id}{ORIGIN_SUFFIX}")
}

/// The recorded break point of a broken-line fragment, if it is in the scene.
fn broken_anchor<S: SceneGraph + ?Sized>(scene: &S, edge: &SceneEdge) -> Option<ElementId> {
    if !edge.id.ends_with(BROKEN_LINE_SUFFIX) {
        return None;
    }
    let anchor = edge.data.broken_coordinate_id.as_ref()?;
    scene.node(anchor).map(|_| anchor.clone())
}

/// Creates origin clones and move vectors for every moving node, and a fixed
/// clone plus a vector for every adjacent edge. Returns the created ids.
fn spawn_ghosts<S: SceneGraph + ?Sized>(
    scene: &mut S,
    moving: &[(ElementId, Pos2)],
    tracked: &[TrackedEdge],
    moving_ids: &[ElementId],
) -> Vec<ElementId> {
    let mut ghosts = Vec::new();
    for (id, start) in moving {
        let origin = origin_id(id);
        let vector = format!("{id}{VECTOR_SUFFIX}");
        scene.add_node(SceneNode::new(origin.clone(), ElementKind::Ghost, *start).with_class(GHOST_CLASS));
        scene.add_edge(
            SceneEdge::new(vector.clone(), ElementKind::Ghost, origin.clone(), id.clone())
                .with_class(GHOST_CLASS)
                .with_class(VECTOR_CLASS),
        );
        ghosts.push(origin);
        ghosts.push(vector);
    }

    let is_moving = |node: &str| moving_ids.iter().any(|m| m == node);
    let fixed_end = |node: &ElementId| if is_moving(node) { origin_id(node) } else { node.clone() };
    for edge in tracked {
        let Some(real) = scene.edge(&edge.id).cloned() else { continue };
        let clone = format!("{}{EDGE_CLONE_SUFFIX}", real.id);
        scene.add_edge(
            SceneEdge::new(clone.clone(), ElementKind::Ghost, fixed_end(&real.source), fixed_end(&real.target))
                .with_class(GHOST_CLASS),
        );
        ghosts.push(clone);

        let ends = match (is_moving(&real.source), is_moving(&real.target)) {
            (true, false) => Some((&real.target, &real.source)),
            (false, true) => Some((&real.source, &real.target)),
            _ => None,
        };
        if let Some((fixed, live)) = ends {
            let fixed = broken_anchor(&*scene, &real).unwrap_or_else(|| fixed.clone());
            let vector = format!("{}{ADJACENT_VECTOR_SUFFIX}", real.id);
            scene.add_edge(
                SceneEdge::new(vector.clone(), ElementKind::Ghost, fixed, live.clone())
                    .with_class(GHOST_CLASS)
                    .with_class(VECTOR_CLASS),
            );
            ghosts.push(vector);
        }
    }
    ghosts
}

/// Average midpoint displacement of the tracked segments of each line.
fn label_shifts<S: SceneGraph + ?Sized>(scene: &S, tracked: &[TrackedEdge]) -> Vec<(String, Vec2)> {
    let mut sums: Vec<(String, Vec2, usize)> = Vec::new();
    for edge in tracked {
        let Some(line_id) = &edge.line_id else { continue };
        let Some(midpoint) = scene.edge_midpoint(&edge.id) else { continue };
        let shift = midpoint - edge.start_midpoint;
        match sums.iter_mut().find(|(id, ..)| id == line_id) {
            Some((_, sum, count)) => {
                *sum += shift;
                *count += 1;
            }
            None => sums.push((line_id.clone(), shift, 1)),
        }
    }
    sums.into_iter()
        .map(|(id, sum, count)| (id, sum / count as f32))
        .filter(|(_, shift)| *shift != Vec2::ZERO)
        .collect()
}
