//! Clipboard contents for cut, copy and paste.
//!
//! Payloads serialize to JSON so a host can also place them on the system
//! clipboard.

use crate::error::EditorError;
use crate::sheet::{Diagram, Page, PageLabel};
use serde::{Deserialize, Serialize};

/// A page element that can travel through the clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClipboardItem {
    /// A free label lifted off a page
    PageLabel(PageLabel),
    /// A whole diagram with its features
    Diagram(Diagram),
}

impl ClipboardItem {
    /// Id of the carried element.
    pub fn id(&self) -> &str {
        match self {
            ClipboardItem::PageLabel(label) => &label.id,
            ClipboardItem::Diagram(diagram) => &diagram.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: String) {
        match self {
            ClipboardItem::PageLabel(label) => label.id = id,
            ClipboardItem::Diagram(diagram) => diagram.id = id,
        }
    }

    /// Clones the element `id` from `page`.
    pub(crate) fn find(page: &Page, id: &str) -> Result<Self, EditorError> {
        if let Some(label) = page.labels.iter().find(|l| l.id == id) {
            return Ok(ClipboardItem::PageLabel(label.clone()));
        }
        page.diagram(id)
            .map(|d| ClipboardItem::Diagram(d.clone()))
            .ok_or_else(|| EditorError::UnknownElement(id.to_string()))
    }

    /// Removes the element `id` from `page`.
    pub(crate) fn take(page: &mut Page, id: &str) -> Result<Self, EditorError> {
        if let Some(index) = page.labels.iter().position(|l| l.id == id) {
            return Ok(ClipboardItem::PageLabel(page.labels.remove(index)));
        }
        match page.diagrams.iter().position(|d| d.id == id) {
            Some(index) => Ok(ClipboardItem::Diagram(page.diagrams.remove(index))),
            None => Err(EditorError::UnknownElement(id.to_string())),
        }
    }

    pub(crate) fn put(self, page: &mut Page) {
        match self {
            ClipboardItem::PageLabel(label) => page.labels.push(label),
            ClipboardItem::Diagram(diagram) => page.diagrams.push(diagram),
        }
    }
}

/// What is on the clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    /// The carried element
    pub item: ClipboardItem,
    /// Page the item was cut from; `None` for a copy
    #[serde(default)]
    pub cut_from: Option<u32>,
}

impl ClipboardPayload {
    /// Serializes the payload for the system clipboard.
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads a payload back from the system clipboard.
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_tagged_by_item_type() {
        let payload = ClipboardPayload {
            item: ClipboardItem::PageLabel(PageLabel {
                id: "title".into(),
                text: "Plan".into(),
                position: (5.0, 5.0),
                rotation: 0.0,
            }),
            cut_from: Some(1),
        };
        let json = payload.to_json().unwrap();
        assert!(json.contains(r#""type":"page_label""#), "{json}");
        assert_eq!(ClipboardPayload::from_json(&json).unwrap(), payload);
    }

    #[test]
    fn take_and_put_move_an_element() {
        let mut from = Page::new(1);
        from.labels.push(PageLabel {
            id: "x".into(),
            text: String::new(),
            position: (0.0, 0.0),
            rotation: 0.0,
        });
        let mut to = Page::new(2);
        let item = ClipboardItem::take(&mut from, "x").unwrap();
        assert!(from.labels.is_empty());
        item.put(&mut to);
        assert_eq!(to.labels.len(), 1);
        assert!(matches!(ClipboardItem::find(&from, "x"), Err(EditorError::UnknownElement(_))));
    }
}
