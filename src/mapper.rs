//! Conversion between ground/page space and screen space.
//!
//! Every diagram has its own ground space. Elements without a diagram live in
//! page space (millimetres from the page's top-left corner).

use crate::config::EditorConfig;
use crate::sheet::Page;
use egui::{pos2, vec2, Pos2, Rect, Vec2};
use std::collections::BTreeMap;

/// Maps points between ground/page coordinates and screen coordinates.
pub trait CoordinateMapper {
    /// Converts a ground point of `diagram_id` (or a page point when `None`) to screen space.
    fn ground_to_screen(&self, point: Pos2, diagram_id: Option<&str>) -> Pos2;

    /// Inverse of [`CoordinateMapper::ground_to_screen`].
    fn screen_to_ground(&self, point: Pos2, diagram_id: Option<&str>) -> Pos2;

    /// The page rectangle in screen units.
    fn outer_limits(&self) -> Rect;

    /// Screen box of a diagram.
    fn diagram_extent(&self, diagram_id: &str) -> Option<Rect>;

    /// Page millimetres per ground unit of a diagram.
    fn diagram_zoom(&self, diagram_id: &str) -> Option<f32>;

    /// Screen pixels per page millimetre.
    fn pixels_per_mm(&self) -> f32;

    /// Area an element of `diagram_id` may be moved within.
    fn area_limits(&self, diagram_id: Option<&str>) -> Rect {
        diagram_id
            .and_then(|id| self.diagram_extent(id))
            .unwrap_or_else(|| self.outer_limits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DiagramTransform {
    origin: Pos2,
    zoom: f32,
    ground_origin: Pos2,
    ground_size: Vec2,
}

impl DiagramTransform {
    fn ground_to_page(&self, g: Pos2) -> Pos2 {
        pos2(
            self.origin.x + (g.x - self.ground_origin.x) * self.zoom,
            self.origin.y - (g.y - self.ground_origin.y) * self.zoom,
        )
    }

    fn page_to_ground(&self, p: Pos2) -> Pos2 {
        pos2(
            self.ground_origin.x + (p.x - self.origin.x) / self.zoom,
            self.ground_origin.y - (p.y - self.origin.y) / self.zoom,
        )
    }
}

/// Mapper for a single page laid out at a fixed screen offset and density.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMapper {
    pixels_per_mm: f32,
    screen_offset: Vec2,
    page_size: Vec2,
    diagrams: BTreeMap<String, DiagramTransform>,
}

impl PageMapper {
    /// Captures the placement of every diagram on `page`.
    pub fn new(page: &Page, config: &EditorConfig) -> Self {
        let diagrams = page
            .diagrams
            .iter()
            .map(|d| {
                let transform = DiagramTransform {
                    origin: pos2(d.origin.0, d.origin.1),
                    zoom: d.zoom,
                    ground_origin: pos2(d.ground_origin.0, d.ground_origin.1),
                    ground_size: vec2(d.ground_size.0, d.ground_size.1),
                };
                (d.id.clone(), transform)
            })
            .collect();
        Self {
            pixels_per_mm: config.pixels_per_mm,
            screen_offset: vec2(config.screen_offset.0, config.screen_offset.1),
            page_size: vec2(config.page_width_mm, config.page_height_mm),
            diagrams,
        }
    }

    fn page_to_screen(&self, p: Pos2) -> Pos2 {
        (p.to_vec2() * self.pixels_per_mm + self.screen_offset).to_pos2()
    }

    fn screen_to_page(&self, s: Pos2) -> Pos2 {
        ((s.to_vec2() - self.screen_offset) / self.pixels_per_mm).to_pos2()
    }

    fn transform(&self, diagram_id: Option<&str>) -> Option<&DiagramTransform> {
        let id = diagram_id?;
        let transform = self.diagrams.get(id);
        if transform.is_none() {
            log::warn!("no transform for diagram `{id}`, using page space");
        }
        transform
    }
}

impl CoordinateMapper for PageMapper {
    fn ground_to_screen(&self, point: Pos2, diagram_id: Option<&str>) -> Pos2 {
        let page = match self.transform(diagram_id) {
            Some(t) => t.ground_to_page(point),
            None => point,
        };
        self.page_to_screen(page)
    }

    fn screen_to_ground(&self, point: Pos2, diagram_id: Option<&str>) -> Pos2 {
        let page = self.screen_to_page(point);
        match self.transform(diagram_id) {
            Some(t) => t.page_to_ground(page),
            None => page,
        }
    }

    fn outer_limits(&self) -> Rect {
        Rect::from_min_max(self.page_to_screen(Pos2::ZERO), self.page_to_screen(self.page_size.to_pos2()))
    }

    fn diagram_extent(&self, diagram_id: &str) -> Option<Rect> {
        let t = self.diagrams.get(diagram_id)?;
        let size = t.ground_size * t.zoom;
        Some(Rect::from_min_max(
            self.page_to_screen(t.origin),
            self.page_to_screen(t.origin + size),
        ))
    }

    fn diagram_zoom(&self, diagram_id: &str) -> Option<f32> {
        self.diagrams.get(diagram_id).map(|t| t.zoom)
    }

    fn pixels_per_mm(&self) -> f32 {
        self.pixels_per_mm
    }
}
