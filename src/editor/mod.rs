//! The plan sheet editor.
//!
//! [`PlanSheetEditor`] owns the document and routes every edit through a
//! single-level [`UndoBuffer`]. Results of interaction gestures come in as
//! [`ElementsChanged`] and [`DiagramPlacement`] values and are written back
//! into ground or page coordinates.
//!
//! # Module Organization
//!
//! - `undo` - snapshot-pair undo buffer
//! - `clipboard` - cut/copy/paste payloads

mod clipboard;
mod undo;

pub use clipboard::{ClipboardItem, ClipboardPayload};
pub use undo::UndoBuffer;

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::mapper::{CoordinateMapper, PageMapper};
use crate::scene::Scene;
use crate::selection::SelectionMode;
use crate::sheet::{Page, PlanSheet};
use crate::types::*;
use uuid::Uuid;

/// Everything the undo buffer snapshots.
///
/// `mode` and `active_page` are UI state: they are changed without recording
/// and survive undo.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    /// The document
    pub sheet: PlanSheet,
    /// Element class currently selectable
    pub mode: SelectionMode,
    /// Number of the page being edited
    pub active_page: u32,
}

/// Editor for one plan sheet.
#[derive(Debug)]
pub struct PlanSheetEditor {
    config: EditorConfig,
    buffer: UndoBuffer<EditorState>,
    clipboard: Option<ClipboardPayload>,
    /// Recorded unit in which the clipboard's item was cut
    pending_cut: Option<u64>,
    /// Number of recorded units so far
    units: u64,
    has_unsaved_changes: bool,
}

impl PlanSheetEditor {
    /// Creates an editor showing the first page of `sheet`.
    ///
    /// # Returns
    ///
    /// `EditorError::DuplicateId` if a page reuses an id, since its scene could
    /// not tell those elements apart.
    pub fn new(sheet: PlanSheet, config: EditorConfig) -> Result<Self, EditorError> {
        sheet.validate()?;
        let active_page = sheet.pages.first().map_or(1, |p| p.number);
        Ok(Self {
            config,
            buffer: UndoBuffer::new(EditorState {
                sheet,
                mode: SelectionMode::default(),
                active_page,
            }),
            clipboard: None,
            pending_cut: None,
            units: 0,
            has_unsaved_changes: false,
        })
    }

    /// Opens a sheet from its JSON form.
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self, EditorError> {
        Self::new(PlanSheet::from_json(json)?, config)
    }

    /// Serializes the current sheet.
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(self.sheet().to_json()?)
    }

    /// The sheet as it currently stands.
    pub fn sheet(&self) -> &PlanSheet {
        &self.buffer.current().sheet
    }

    /// Configuration the editor was created with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Selectable element class.
    pub fn mode(&self) -> SelectionMode {
        self.buffer.current().mode
    }

    /// Number of the page being edited.
    pub fn active_page(&self) -> u32 {
        self.buffer.current().active_page
    }

    /// What cut or copy last put on the clipboard.
    pub fn clipboard(&self) -> Option<&ClipboardPayload> {
        self.clipboard.as_ref()
    }

    /// True once anything was recorded or undone since the last save.
    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    /// Clears the unsaved-changes flag.
    pub fn mark_saved(&mut self) {
        self.has_unsaved_changes = false;
    }

    /// Switches the selectable element class. Not recorded for undo.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.buffer.apply_untracked(|state| state.mode = mode);
    }

    /// Switches the active page. Not recorded for undo.
    pub fn select_page(&mut self, number: u32) -> Result<(), EditorError> {
        self.sheet().page(number)?;
        self.buffer.apply_untracked(|state| state.active_page = number);
        log::debug!("active page is now {number}");
        Ok(())
    }

    fn page(&self) -> Result<&Page, EditorError> {
        self.sheet().page(self.active_page())
    }

    /// Mapper for the active page.
    pub fn mapper(&self) -> Result<PageMapper, EditorError> {
        Ok(PageMapper::new(self.page()?, &self.config))
    }

    /// Builds a fresh scene for the active page.
    pub fn build_scene(&self) -> Result<Scene, EditorError> {
        let page = self.page()?;
        Ok(Scene::from_page(page, &PageMapper::new(page, &self.config)))
    }

    /// Returns true if [`PlanSheetEditor::perform_undo`] would change anything.
    pub fn can_undo(&self) -> bool {
        self.buffer.can_undo()
    }

    /// Reverts the last recorded action.
    ///
    /// # Returns
    ///
    /// `true` if something was undone
    pub fn perform_undo(&mut self) -> bool {
        if !self.buffer.undo() {
            log::debug!("nothing to undo");
            return false;
        }
        // The cut item is back on its page, so the clipboard only holds a copy.
        if self.pending_cut == Some(self.units) {
            self.pending_cut = None;
            if let Some(clipboard) = self.clipboard.as_mut() {
                clipboard.cut_from = None;
            }
        }
        self.has_unsaved_changes = true;
        log::info!("undid last action");
        true
    }

    fn record<R>(&mut self, action: impl FnOnce(&mut EditorState) -> Result<R, EditorError>) -> Result<R, EditorError> {
        let result = self.buffer.try_apply(action)?;
        self.units += 1;
        self.has_unsaved_changes = true;
        Ok(result)
    }

    /// Writes the result of a move gesture back into the active page.
    ///
    /// Every element is validated before anything changes; the whole event is
    /// one undo step.
    ///
    /// # Arguments
    ///
    /// * `event` - Moved nodes in screen space
    /// * `mapper` - The mapper the scene was built with
    pub fn apply_elements_changed(
        &mut self,
        event: &ElementsChanged,
        mapper: &impl CoordinateMapper,
    ) -> Result<(), EditorError> {
        if event.is_empty() {
            return Ok(());
        }
        let page_number = self.active_page();
        self.record(|state| {
            let page = state.sheet.page_mut(page_number)?;
            event
                .elements
                .iter()
                .try_for_each(|node| apply_moved_node(page, node, mapper))
        })?;
        log::info!("moved {} elements on page {page_number}", event.len());
        Ok(())
    }

    /// Applies a diagram move or resize as one undo step.
    pub fn apply_diagram_placement(&mut self, placement: &DiagramPlacement) -> Result<(), EditorError> {
        let unknown = || EditorError::UnknownDiagram(placement.diagram_id.clone());
        let page_number = self.sheet().page_of_diagram(&placement.diagram_id).ok_or_else(unknown)?;
        self.record(|state| {
            let diagram = state
                .sheet
                .page_mut(page_number)?
                .diagram_mut(&placement.diagram_id)
                .ok_or_else(unknown)?;
            diagram.origin = placement.origin;
            diagram.zoom = placement.zoom;
            Ok(())
        })?;
        log::info!(
            "diagram {} placed at {:?} with zoom {}",
            placement.diagram_id,
            placement.origin,
            placement.zoom
        );
        Ok(())
    }

    /// Puts a copy of a page label or diagram on the clipboard. Not recorded.
    pub fn copy(&mut self, page: u32, element_id: &str) -> Result<(), EditorError> {
        let item = ClipboardItem::find(self.sheet().page(page)?, element_id)?;
        self.clipboard = Some(ClipboardPayload { item, cut_from: None });
        self.pending_cut = None;
        log::debug!("copied {element_id} from page {page}");
        Ok(())
    }

    /// Removes a page label or diagram and puts it on the clipboard.
    pub fn cut(&mut self, page: u32, element_id: &str) -> Result<(), EditorError> {
        let item = self.record(|state| ClipboardItem::take(state.sheet.page_mut(page)?, element_id))?;
        self.clipboard = Some(ClipboardPayload {
            item,
            cut_from: Some(page),
        });
        self.pending_cut = Some(self.units);
        log::info!("cut {element_id} from page {page}");
        Ok(())
    }

    /// Pastes the clipboard onto `page`.
    ///
    /// A paste directly following its cut joins the cut's undo step, so one
    /// undo puts the element back where it came from. Copies get a fresh id.
    /// A diagram whose features clash with ids already on `page` is refused
    /// and nothing changes.
    ///
    /// # Returns
    ///
    /// The id of the pasted element
    pub fn paste(&mut self, page: u32) -> Result<ElementId, EditorError> {
        let payload = self.clipboard.clone().ok_or(EditorError::EmptyClipboard)?;
        let mut item = payload.item;
        if payload.cut_from.is_none() {
            item.set_id(Uuid::new_v4().to_string());
        }
        let id = item.id().to_string();
        let insert = |state: &mut EditorState| -> Result<(), EditorError> {
            let target = state.sheet.page_mut(page)?;
            item.put(target);
            target.validate()
        };

        if payload.cut_from.is_some() && self.pending_cut == Some(self.units) {
            self.buffer.try_amend(insert)?;
            self.has_unsaved_changes = true;
        } else {
            self.record(insert)?;
        }
        // Later pastes of the same payload are copies.
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.cut_from = None;
        }
        self.pending_cut = None;
        log::info!("pasted {id} onto page {page}");
        Ok(id)
    }
}

/// Writes one moved node back into `page`, converting from screen space.
fn apply_moved_node(page: &mut Page, node: &SceneNode, mapper: &impl CoordinateMapper) -> Result<(), EditorError> {
    let unknown = || EditorError::UnknownElement(node.id.clone());
    let diagram_id = node.data.diagram_id.as_deref();
    let point = mapper.screen_to_ground(node.position, diagram_id);
    let position = (point.x, point.y);

    let Some(diagram_id) = diagram_id else {
        if node.kind != ElementKind::Label {
            return Err(unknown());
        }
        let label = page.label_mut(&node.id).ok_or_else(unknown)?;
        label.position = position;
        if let Some(rotation) = node.data.text_rotation {
            label.rotation = rotation;
        }
        return Ok(());
    };

    let diagram = page
        .diagram_mut(diagram_id)
        .ok_or_else(|| EditorError::UnknownDiagram(diagram_id.to_string()))?;
    match node.kind {
        ElementKind::Coordinate => {
            let id: u32 = node.id.parse().map_err(|_| unknown())?;
            diagram.coordinate_mut(id).ok_or_else(unknown)?.position = position;
        }
        ElementKind::Label => {
            let label = diagram.label_mut(&node.id).ok_or_else(unknown)?;
            label.position = position;
            if let Some(rotation) = node.data.text_rotation {
                label.rotation = rotation;
            }
        }
        _ => return Err(unknown()),
    }
    Ok(())
}
