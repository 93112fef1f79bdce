//! Selection tracking.
//!
//! The tracker follows select/unselect events for one element class at a time,
//! closes line groups (selecting one segment selects the whole logical line),
//! and highlights the labels related to whatever is selected.

use crate::constants::RELATED_CLASS;
use crate::error::EditorError;
use crate::scene::{Attr, SceneGraph, SceneHandle};
use crate::types::{ElementId, ElementKind};

/// Which element class the user is currently selecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Surveyed coordinates
    #[default]
    Coordinates,
    /// Labels
    Labels,
    /// Line segments
    Lines,
}

impl SelectionMode {
    /// True if elements of `kind` can be selected in this mode.
    pub fn accepts(self, kind: ElementKind) -> bool {
        matches!(
            (self, kind),
            (SelectionMode::Coordinates, ElementKind::Coordinate)
                | (SelectionMode::Labels, ElementKind::Label)
                | (SelectionMode::Lines, ElementKind::Line)
        )
    }
}

/// True for ids that name a feature directly (bare numeric ids).
pub fn is_feature_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Elements related to `id`: the labels of a line for an edge carrying a
/// `line_id`, or the labels of a feature for a node whose id is a feature id.
pub fn related_elements<S: SceneGraph + ?Sized>(scene: &S, id: &str) -> Vec<ElementId> {
    if let Some(edge) = scene.edge(id) {
        return match &edge.data.line_id {
            Some(line_id) => scene.nodes_where(Attr::FeatureId, line_id),
            None => Vec::new(),
        };
    }
    if scene.node(id).is_some() && is_feature_id(id) {
        return scene
            .nodes_where(Attr::FeatureId, id)
            .into_iter()
            .filter(|related| related != id)
            .collect();
    }
    Vec::new()
}

/// The current selection and the labels derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    elements: Vec<ElementId>,
    related: Vec<ElementId>,
}

impl Selection {
    /// Selected ids, in selection order.
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// Labels highlighted because of the selection.
    pub fn related(&self) -> &[ElementId] {
        &self.related
    }

    /// The element standing for the whole selection (the first one selected).
    pub fn representative(&self) -> Option<&ElementId> {
        self.elements.first()
    }

    /// True if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True if `id` is selected.
    pub fn contains(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e == id)
    }
}

/// Keeps a [`Selection`] in step with the scene's select/unselect events.
///
/// Highlights placed on related labels are removed when the tracker is
/// dropped, whichever way that happens.
pub struct SelectionTracker<S: SceneGraph> {
    scene: SceneHandle<S>,
    mode: SelectionMode,
    selection: Selection,
}

impl<S: SceneGraph> SelectionTracker<S> {
    /// Starts tracking with nothing selected.
    pub fn new(scene: SceneHandle<S>, mode: SelectionMode) -> Self {
        Self {
            scene,
            mode,
            selection: Selection::default(),
        }
    }

    /// Element class currently selectable.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Switches the selectable element class, clearing the current selection.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if mode != self.mode {
            self.clear();
            self.mode = mode;
        }
    }

    /// Handles a select event. Returns `Ok(false)` when the element is not
    /// selectable in the current mode.
    pub fn on_select(&mut self, id: &str) -> Result<bool, EditorError> {
        let group = {
            let scene = self.scene.try_borrow().map_err(|_| EditorError::SceneBusy)?;
            let kind = element_kind(&*scene, id)?;
            if !self.mode.accepts(kind) {
                return Ok(false);
            }
            line_group(&*scene, id)
        };
        {
            let mut scene = self.scene.try_borrow_mut().map_err(|_| EditorError::SceneBusy)?;
            for member in &group {
                scene.set_selected(member, true)?;
                if !self.selection.contains(member) {
                    self.selection.elements.push(member.clone());
                }
            }
        }
        self.refresh_related();
        Ok(true)
    }

    /// Handles an unselect event. A segment of a multi-segment line unselects
    /// the whole line.
    pub fn on_unselect(&mut self, id: &str) -> Result<(), EditorError> {
        let group = {
            let scene = self.scene.try_borrow().map_err(|_| EditorError::SceneBusy)?;
            element_kind(&*scene, id)?;
            line_group(&*scene, id)
        };
        {
            let mut scene = self.scene.try_borrow_mut().map_err(|_| EditorError::SceneBusy)?;
            for member in &group {
                scene.set_selected(member, false)?;
            }
        }
        self.selection.elements.retain(|e| !group.contains(e));
        self.refresh_related();
        Ok(())
    }

    /// Unselects everything and removes all highlights.
    pub fn clear(&mut self) {
        {
            let mut scene = self.scene.borrow_mut();
            for id in self.selection.elements.drain(..) {
                if let Err(err) = scene.set_selected(&id, false) {
                    log::debug!("cleared selection entry no longer in the scene: {err}");
                }
            }
        }
        self.refresh_related();
    }

    fn refresh_related(&mut self) {
        let mut scene = self.scene.borrow_mut();
        for id in self.selection.related.drain(..) {
            scene.remove_class(&id, RELATED_CLASS);
        }
        let mut related: Vec<ElementId> = Vec::new();
        for id in &self.selection.elements {
            for r in related_elements(&*scene, id) {
                if !related.contains(&r) && !self.selection.elements.contains(&r) {
                    related.push(r);
                }
            }
        }
        for id in &related {
            if let Err(err) = scene.add_class(id, RELATED_CLASS) {
                log::warn!("could not highlight related element: {err}");
            }
        }
        self.selection.related = related;
    }
}

impl<S: SceneGraph> Drop for SelectionTracker<S> {
    fn drop(&mut self) {
        match self.scene.try_borrow_mut() {
            Ok(mut scene) => {
                for id in &self.selection.related {
                    scene.remove_class(id, RELATED_CLASS);
                }
            }
            Err(_) => log::warn!("scene busy while dropping selection tracker; highlights left in place"),
        }
    }
}

fn element_kind<S: SceneGraph + ?Sized>(scene: &S, id: &str) -> Result<ElementKind, EditorError> {
    scene
        .node(id)
        .map(|n| n.kind)
        .or_else(|| scene.edge(id).map(|e| e.kind))
        .ok_or_else(|| EditorError::UnknownElement(id.to_string()))
}

/// All segments sharing `id`'s `line_id`, or just `id`.
fn line_group<S: SceneGraph + ?Sized>(scene: &S, id: &str) -> Vec<ElementId> {
    match scene.edge(id).and_then(|e| e.data.line_id.as_deref()) {
        Some(line_id) => {
            let mut group = scene.edges_where(Attr::LineId, line_id);
            // keep the clicked segment first so it becomes the representative
            group.sort_by_key(|e| e != id);
            group
        }
        None => vec![id.to_string()],
    }
}
