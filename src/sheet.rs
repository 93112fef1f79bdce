//! The editable plan sheet: pages, diagrams and the features drawn on them.
//!
//! This is the state the undo buffer snapshots. Ground positions use the
//! survey convention (y grows northwards); page positions are millimetres from
//! the page's top-left corner.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A surveyed point inside a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Feature id, unique among the page's coordinates and lines
    pub id: u32,
    /// Ground position
    pub position: (f32, f32),
}

/// A line through two or more coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Feature id, unique among the page's coordinates and lines
    pub id: u32,
    /// Coordinates the line passes through, in order
    pub coordinate_ids: Vec<u32>,
}

/// A label inside a diagram, optionally annotating a feature (line or coordinate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Label id, unique on its page
    pub id: String,
    /// Displayed text
    pub text: String,
    /// Line or coordinate the label annotates
    #[serde(default)]
    pub feature_id: Option<u32>,
    /// Ground position
    pub position: (f32, f32),
    /// Text rotation in degrees
    #[serde(default)]
    pub rotation: f32,
}

/// A free-floating label placed directly on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLabel {
    /// Label id, unique on its page
    pub id: String,
    /// Displayed text
    pub text: String,
    /// Page position in millimetres
    pub position: (f32, f32),
    /// Text rotation in degrees
    #[serde(default)]
    pub rotation: f32,
}

/// A rectangular window onto a region of ground, placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    /// Diagram id, unique across the sheet
    pub id: String,
    /// Page position (mm) of the diagram's top-left corner
    pub origin: (f32, f32),
    /// Page millimetres per ground unit
    pub zoom: f32,
    /// Ground position shown at the diagram's top-left corner
    pub ground_origin: (f32, f32),
    /// Ground width and height covered by the diagram
    pub ground_size: (f32, f32),
    /// Surveyed points
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
    /// Lines between the coordinates
    #[serde(default)]
    pub lines: Vec<Line>,
    /// Labels in ground space
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Diagram {
    /// Size of the diagram box on the page, in millimetres.
    pub fn page_size(&self) -> (f32, f32) {
        (self.ground_size.0 * self.zoom, self.ground_size.1 * self.zoom)
    }

    /// Finds a coordinate by feature id.
    pub fn coordinate_mut(&mut self, id: u32) -> Option<&mut Coordinate> {
        self.coordinates.iter_mut().find(|c| c.id == id)
    }

    /// Finds a diagram label by id.
    pub fn label_mut(&mut self, id: &str) -> Option<&mut Label> {
        self.labels.iter_mut().find(|l| l.id == id)
    }
}

/// One sheet page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number as printed on the sheet
    pub number: u32,
    /// Diagrams placed on the page
    #[serde(default)]
    pub diagrams: Vec<Diagram>,
    /// Labels placed directly on the page
    #[serde(default)]
    pub labels: Vec<PageLabel>,
}

impl Page {
    /// An empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            diagrams: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Finds a diagram by id.
    pub fn diagram(&self, id: &str) -> Option<&Diagram> {
        self.diagrams.iter().find(|d| d.id == id)
    }

    /// Mutable version of [`Page::diagram`].
    pub fn diagram_mut(&mut self, id: &str) -> Option<&mut Diagram> {
        self.diagrams.iter_mut().find(|d| d.id == id)
    }

    /// Finds a page label by id.
    pub fn label_mut(&mut self, id: &str) -> Option<&mut PageLabel> {
        self.labels.iter_mut().find(|l| l.id == id)
    }

    /// Checks that every coordinate, line and label on the page has its own
    /// id. All diagrams of a page share one scene, where these ids must not
    /// clash.
    pub fn validate(&self) -> Result<(), EditorError> {
        let mut seen = HashSet::new();
        let diagram_ids = self.diagrams.iter().flat_map(|d| {
            d.coordinates
                .iter()
                .map(|c| c.id.to_string())
                .chain(d.lines.iter().map(|l| l.id.to_string()))
                .chain(d.labels.iter().map(|l| l.id.clone()))
        });
        for id in diagram_ids.chain(self.labels.iter().map(|l| l.id.clone())) {
            if !seen.insert(id.clone()) {
                return Err(EditorError::DuplicateId { page: self.number, id });
            }
        }
        Ok(())
    }
}

/// The whole editable document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSheet {
    /// Pages in display order
    pub pages: Vec<Page>,
}

impl PlanSheet {
    /// A sheet without pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the sheet to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a sheet from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Looks up a page by number.
    pub fn page(&self, number: u32) -> Result<&Page, EditorError> {
        self.pages
            .iter()
            .find(|p| p.number == number)
            .ok_or(EditorError::UnknownPage(number))
    }

    /// Mutable version of [`PlanSheet::page`].
    pub fn page_mut(&mut self, number: u32) -> Result<&mut Page, EditorError> {
        self.pages
            .iter_mut()
            .find(|p| p.number == number)
            .ok_or(EditorError::UnknownPage(number))
    }

    /// Validates every page, see [`Page::validate`].
    pub fn validate(&self) -> Result<(), EditorError> {
        self.pages.iter().try_for_each(Page::validate)
    }

    /// Finds the page holding a diagram.
    pub fn page_of_diagram(&self, diagram_id: &str) -> Option<u32> {
        self.pages
            .iter()
            .find(|p| p.diagram(diagram_id).is_some())
            .map(|p| p.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> PlanSheet {
        let mut page = Page::new(1);
        page.diagrams.push(Diagram {
            id: "A".into(),
            origin: (20.0, 30.0),
            zoom: 2.0,
            ground_origin: (0.0, 0.0),
            ground_size: (100.0, 60.0),
            coordinates: vec![Coordinate { id: 1, position: (10.0, -10.0) }],
            lines: Vec::new(),
            labels: Vec::new(),
        });
        page.labels.push(PageLabel {
            id: "title".into(),
            text: "Plan".into(),
            position: (5.0, 5.0),
            rotation: 0.0,
        });
        PlanSheet { pages: vec![page] }
    }

    #[test]
    fn json_round_trip() {
        let sheet = sample();
        let json = sheet.to_json().unwrap();
        assert_eq!(PlanSheet::from_json(&json).unwrap(), sheet);
    }

    #[test]
    fn lookups() {
        let mut sheet = sample();
        assert!(matches!(sheet.page(9), Err(EditorError::UnknownPage(9))));
        assert_eq!(sheet.page_of_diagram("A"), Some(1));
        assert_eq!(sheet.page_of_diagram("B"), None);
        let page = sheet.page_mut(1).unwrap();
        assert_eq!(page.diagram("A").map(|d| d.page_size()), Some((200.0, 120.0)));
        assert!(page.label_mut("title").is_some());
        let diagram = page.diagram_mut("A").unwrap();
        assert!(diagram.coordinate_mut(1).is_some());
        assert!(diagram.coordinate_mut(2).is_none());
    }

    #[test]
    fn coordinate_and_line_may_not_share_an_id() {
        let mut sheet = sample();
        assert!(sheet.validate().is_ok());
        let diagram = sheet.page_mut(1).unwrap().diagram_mut("A").unwrap();
        diagram.coordinates.push(Coordinate { id: 7, position: (0.0, 0.0) });
        diagram.lines.push(Line {
            id: 7,
            coordinate_ids: vec![1, 7],
        });
        assert!(matches!(
            sheet.validate(),
            Err(EditorError::DuplicateId { page: 1, id }) if id == "7"
        ));
    }

    #[test]
    fn ids_clash_across_diagrams_of_a_page() {
        let mut sheet = sample();
        let mut copy = sheet.pages[0].diagrams[0].clone();
        copy.id = "B".into();
        sheet.pages[0].diagrams.push(copy.clone());
        assert!(matches!(sheet.validate(), Err(EditorError::DuplicateId { id, .. }) if id == "1"));

        // The same ids on another page are fine.
        sheet.pages[0].diagrams.pop();
        let mut other = Page::new(2);
        other.diagrams.push(copy);
        sheet.pages.push(other);
        assert!(sheet.validate().is_ok());
    }
}
