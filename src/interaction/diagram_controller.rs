//! Moving and resizing a diagram box.
//!
//! The controller places a body control and eight resize handles on the
//! scene. Dragging the body moves the box within the page; dragging a handle
//! scales it about the opposite anchor, keeping the aspect ratio and the
//! minimum physical height.

use super::{GesturePhase, SceneFlags};
use crate::config::EditorConfig;
use crate::constants::*;
use crate::error::EditorError;
use crate::geometry::{get_resize_limits, move_extent, resize_extent, ResizeControl, ResizeLimits};
use crate::mapper::CoordinateMapper;
use crate::scene::{SceneGraph, SceneHandle};
use crate::types::*;
use egui::{Pos2, Rect};

#[derive(Debug)]
struct DiagramGesture {
    start_pointer: Pos2,
    start_extent: Rect,
    /// `None` when the body is dragged
    handle: Option<ResizeControl>,
    limits: Option<ResizeLimits>,
    dragged: bool,
    restore: SceneFlags,
}

/// Move/resize controls for one diagram.
pub struct DiagramController<S: SceneGraph> {
    scene: SceneHandle<S>,
    diagram_id: String,
    /// Current screen box
    extent: Rect,
    /// Page millimetres per ground unit at `extent`
    zoom: f32,
    /// Boxes the diagram must stay inside
    bounds: Vec<Rect>,
    min_height: f32,
    gesture: Option<DiagramGesture>,
}

impl<S: SceneGraph> DiagramController<S> {
    /// Places the controls for `diagram_id` on the scene.
    ///
    /// # Arguments
    ///
    /// * `scene` - The shared scene to place the controls on
    /// * `diagram_id` - Diagram known to `mapper`
    /// * `mapper` - Supplies the diagram's screen box, zoom and the page limits
    /// * `config` - Supplies the minimum physical diagram height
    pub fn new(
        scene: SceneHandle<S>,
        diagram_id: &str,
        mapper: &impl CoordinateMapper,
        config: &EditorConfig,
    ) -> Result<Self, EditorError> {
        let unknown = || EditorError::UnknownDiagram(diagram_id.to_string());
        let extent = mapper.diagram_extent(diagram_id).ok_or_else(unknown)?;
        let zoom = mapper.diagram_zoom(diagram_id).ok_or_else(unknown)?;
        let controller = Self {
            scene,
            diagram_id: diagram_id.to_string(),
            extent,
            zoom,
            bounds: vec![mapper.outer_limits()],
            min_height: config.min_diagram_height_mm * mapper.pixels_per_mm(),
            gesture: None,
        };
        controller.place_controls();
        Ok(controller)
    }

    /// The diagram these controls drive.
    pub fn diagram_id(&self) -> &str {
        &self.diagram_id
    }

    /// Current screen box of the diagram, following any active gesture.
    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Where the current gesture is in its lifecycle.
    pub fn phase(&self) -> GesturePhase {
        match &self.gesture {
            None => GesturePhase::Idle,
            Some(gesture) if gesture.dragged => GesturePhase::Dragging,
            Some(_) => GesturePhase::Armed,
        }
    }

    /// Id of the body control that moves the whole diagram.
    pub fn body_id(&self) -> ElementId {
        format!("{}{DIAGRAM_BODY_SUFFIX}", self.diagram_id)
    }

    /// Id of the handle control for `control`.
    pub fn handle_id(&self, control: ResizeControl) -> ElementId {
        format!("{}{DIAGRAM_HANDLE_INFIX}{}", self.diagram_id, control.name())
    }

    fn parse_handle(&self, control_id: &str) -> Option<ResizeControl> {
        control_id
            .strip_prefix(self.diagram_id.as_str())?
            .strip_prefix(DIAGRAM_HANDLE_INFIX)
            .and_then(ResizeControl::from_name)
    }

    /// Arms a move (body) or resize (handle) gesture.
    ///
    /// # Returns
    ///
    /// `EditorError::UnknownElement` if `control_id` is not one of this
    /// controller's controls, or `EditorError::MalformedLimits` if the diagram
    /// cannot satisfy its minimum height within the page from this handle.
    /// `EditorError::SceneBusy` if the scene is borrowed elsewhere.
    pub fn begin(&mut self, control_id: &str, pointer: Pos2) -> Result<(), EditorError> {
        let handle = self.parse_handle(control_id);
        if handle.is_none() && control_id != self.body_id() {
            return Err(EditorError::UnknownElement(control_id.to_string()));
        }
        let limits = match handle {
            Some(control) => {
                let floor = ResizeLimits {
                    min_height: Some(self.min_height),
                    ..Default::default()
                };
                let limits = get_resize_limits(self.extent, control, &self.bounds, Some(floor));
                limits.validate()?;
                Some(limits)
            }
            None => None,
        };
        if self.gesture.is_some() {
            self.cancel();
        }

        let mut scene = self.scene.try_borrow_mut().map_err(|_| EditorError::SceneBusy)?;
        let restore = SceneFlags::capture(&*scene);
        let cursor = handle.map_or(Cursor::Move, Cursor::Resize);
        SceneFlags::lock(&mut *scene, cursor);
        scene.attach_listener(DIAGRAM_LISTENER, PointerEventKind::Move);
        scene.attach_listener(DIAGRAM_LISTENER, PointerEventKind::Up);
        drop(scene);

        log::debug!("diagram {} {} armed", self.diagram_id, handle.map_or("move", |h| h.name()));
        self.gesture = Some(DiagramGesture {
            start_pointer: pointer,
            start_extent: self.extent,
            handle,
            limits,
            dragged: false,
            restore,
        });
        Ok(())
    }

    /// Recomputes the box from the start snapshot and moves the controls.
    ///
    /// # Returns
    ///
    /// The new box, or `None` if no gesture is active or the box is unchanged.
    pub fn update(&mut self, pointer: Pos2) -> Option<Rect> {
        let gesture = self.gesture.as_mut()?;
        let d = pointer - gesture.start_pointer;
        let extent = match gesture.handle {
            Some(control) => resize_extent(gesture.start_extent, control, d.x, d.y, gesture.limits),
            None => move_extent(gesture.start_extent, d.x, d.y, self.bounds.first().copied()),
        };
        gesture.dragged = true;
        let changed = extent != gesture.start_extent;
        self.extent = extent;
        self.place_controls();
        changed.then_some(extent)
    }

    /// Finishes the gesture and converts the final box into a placement.
    ///
    /// The origin is the page position of the box's top-left corner; the zoom
    /// grows with the box width.
    pub fn end(&mut self, pointer: Pos2, mapper: &impl CoordinateMapper) -> Option<DiagramPlacement> {
        let extent = self.update(pointer);
        let gesture = self.gesture.take()?;
        self.release(gesture.restore);
        let Some(extent) = extent else {
            log::debug!("diagram {} released unchanged", self.diagram_id);
            return None;
        };

        let origin = mapper.screen_to_ground(extent.min, None);
        self.zoom *= extent.width() / gesture.start_extent.width();
        let placement = DiagramPlacement {
            diagram_id: self.diagram_id.clone(),
            origin: (origin.x, origin.y),
            zoom: self.zoom,
        };
        log::debug!("diagram placement committed: {placement:?}");
        Some(placement)
    }

    /// Abandons the gesture and puts the box back.
    pub fn cancel(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        self.extent = gesture.start_extent;
        self.place_controls();
        self.release(gesture.restore);
        log::debug!("diagram {} gesture cancelled", self.diagram_id);
    }

    fn release(&self, restore: SceneFlags) {
        let Ok(mut scene) = self.scene.try_borrow_mut() else {
            log::warn!("scene busy while releasing diagram gesture");
            return;
        };
        restore.restore(&mut *scene);
        scene.detach_listeners(DIAGRAM_LISTENER);
    }

    /// Adds or repositions the body control and the eight handles.
    fn place_controls(&self) {
        let Ok(mut scene) = self.scene.try_borrow_mut() else {
            log::warn!("scene busy; diagram controls not placed");
            return;
        };
        let data = ElementData::default().in_diagram(self.diagram_id.as_str());
        let mut controls = vec![(self.body_id(), self.extent.center())];
        controls.extend(
            ResizeControl::ALL
                .iter()
                .map(|&control| (self.handle_id(control), control.handle_position(self.extent))),
        );
        for (id, position) in controls {
            if scene.node(&id).is_some() {
                if let Err(err) = scene.set_position(&id, position) {
                    log::warn!("could not move diagram control: {err}");
                }
            } else {
                scene.add_node(
                    SceneNode::new(id, ElementKind::Control, position)
                        .with_data(data.clone())
                        .with_class(CONTROL_CLASS),
                );
            }
        }
    }

    fn remove_controls(&self) {
        let Ok(mut scene) = self.scene.try_borrow_mut() else {
            log::warn!("scene busy; diagram controls left in place");
            return;
        };
        scene.remove(&self.body_id());
        for &control in ResizeControl::ALL.iter() {
            scene.remove(&self.handle_id(control));
        }
    }
}

impl<S: SceneGraph> Drop for DiagramController<S> {
    fn drop(&mut self) {
        self.cancel();
        self.remove_controls();
    }
}
