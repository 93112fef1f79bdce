//! Constrained move and resize of axis-aligned boxes.
//!
//! All functions here are pure. Boxes are [`egui::Rect`]s in screen space;
//! every returned box is normalized (`min <= max` on both axes).

use crate::error::EditorError;
use egui::{pos2, vec2, Pos2, Rect, Vec2};

/// One of the 8 resize handles of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeControl {
    /// Top edge
    N,
    /// Bottom edge
    S,
    /// Right edge
    E,
    /// Left edge
    W,
    /// Top-right corner
    NE,
    /// Top-left corner
    NW,
    /// Bottom-right corner
    SE,
    /// Bottom-left corner
    SW,
}

impl ResizeControl {
    /// Every handle, clockwise from the top-left corner.
    pub const ALL: [ResizeControl; 8] = [
        ResizeControl::NW,
        ResizeControl::N,
        ResizeControl::NE,
        ResizeControl::E,
        ResizeControl::SE,
        ResizeControl::S,
        ResizeControl::SW,
        ResizeControl::W,
    ];

    /// Lower-case handle name used in control element ids.
    pub fn name(self) -> &'static str {
        match self {
            ResizeControl::N => "n",
            ResizeControl::S => "s",
            ResizeControl::E => "e",
            ResizeControl::W => "w",
            ResizeControl::NE => "ne",
            ResizeControl::NW => "nw",
            ResizeControl::SE => "se",
            ResizeControl::SW => "sw",
        }
    }

    /// Parses a name produced by [`ResizeControl::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// True for the four corner handles, which drive both axes.
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeControl::NE | ResizeControl::NW | ResizeControl::SE | ResizeControl::SW
        )
    }

    /// Where the handle sits on `extent`.
    pub fn handle_position(self, extent: Rect) -> Pos2 {
        match self {
            ResizeControl::N => extent.center_top(),
            ResizeControl::S => extent.center_bottom(),
            ResizeControl::E => extent.right_center(),
            ResizeControl::W => extent.left_center(),
            ResizeControl::NE => extent.right_top(),
            ResizeControl::NW => extent.left_top(),
            ResizeControl::SE => extent.right_bottom(),
            ResizeControl::SW => extent.left_bottom(),
        }
    }

    /// The point that stays fixed while this handle is dragged: the opposite
    /// corner for corner handles, the centre of the opposite side otherwise.
    pub fn anchor(self, extent: Rect) -> Pos2 {
        self.opposite().handle_position(extent)
    }

    /// The handle on the far side of the box.
    pub fn opposite(self) -> Self {
        match self {
            ResizeControl::N => ResizeControl::S,
            ResizeControl::S => ResizeControl::N,
            ResizeControl::E => ResizeControl::W,
            ResizeControl::W => ResizeControl::E,
            ResizeControl::NE => ResizeControl::SW,
            ResizeControl::NW => ResizeControl::SE,
            ResizeControl::SE => ResizeControl::NW,
            ResizeControl::SW => ResizeControl::NE,
        }
    }

    /// Sign of growth per unit of pointer delta on each axis (0 when the axis
    /// does not drive this handle).
    fn growth_sign(self) -> (f32, f32) {
        match self {
            ResizeControl::N => (0.0, -1.0),
            ResizeControl::S => (0.0, 1.0),
            ResizeControl::E => (1.0, 0.0),
            ResizeControl::W => (-1.0, 0.0),
            ResizeControl::NE => (1.0, -1.0),
            ResizeControl::NW => (-1.0, -1.0),
            ResizeControl::SE => (1.0, 1.0),
            ResizeControl::SW => (-1.0, 1.0),
        }
    }
}

/// Size limits for a resize. Absent fields are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResizeLimits {
    /// Narrowest allowed width
    pub min_width: Option<f32>,
    /// Widest allowed width
    pub max_width: Option<f32>,
    /// Lowest allowed height
    pub min_height: Option<f32>,
    /// Highest allowed height
    pub max_height: Option<f32>,
}

impl ResizeLimits {
    /// Lower width bound, `-inf` when unbounded.
    pub fn min_width(&self) -> f32 {
        self.min_width.unwrap_or(f32::NEG_INFINITY)
    }

    /// Upper width bound, `inf` when unbounded.
    pub fn max_width(&self) -> f32 {
        self.max_width.unwrap_or(f32::INFINITY)
    }

    /// Lower height bound, `-inf` when unbounded.
    pub fn min_height(&self) -> f32 {
        self.min_height.unwrap_or(f32::NEG_INFINITY)
    }

    /// Upper height bound, `inf` when unbounded.
    pub fn max_height(&self) -> f32 {
        self.max_height.unwrap_or(f32::INFINITY)
    }

    /// Rejects limits that no box can satisfy.
    pub fn validate(&self) -> Result<(), EditorError> {
        let fields = [self.min_width, self.max_width, self.min_height, self.max_height];
        if fields.iter().flatten().any(|v| v.is_nan()) {
            return Err(EditorError::MalformedLimits("NaN limit".into()));
        }
        if self.min_width() > self.max_width() {
            return Err(EditorError::MalformedLimits(format!(
                "min width {} exceeds max width {}",
                self.min_width(),
                self.max_width()
            )));
        }
        if self.min_height() > self.max_height() {
            return Err(EditorError::MalformedLimits(format!(
                "min height {} exceeds max height {}",
                self.min_height(),
                self.max_height()
            )));
        }
        Ok(())
    }
}

fn min_opt(a: Option<f32>, b: f32) -> Option<f32> {
    Some(a.map_or(b, |a| a.min(b)))
}

/// Translates `extent` by `(dx, dy)`, keeping it inside `limits`.
///
/// Each axis is clamped independently; the box size never changes. Clamping
/// only shortens the requested delta, so a box already overflowing `limits`
/// is never pushed back by a zero move.
pub fn move_extent(extent: Rect, dx: f32, dy: f32, limits: Option<Rect>) -> Rect {
    let Some(limits) = limits else {
        return extent.translate(vec2(dx, dy));
    };
    let dx = clamp_delta(dx, limits.min.x - extent.min.x, limits.max.x - extent.max.x);
    let dy = clamp_delta(dy, limits.min.y - extent.min.y, limits.max.y - extent.max.y);
    extent.translate(vec2(dx, dy))
}

fn clamp_delta(d: f32, room_before: f32, room_after: f32) -> f32 {
    if d < 0.0 {
        d.max(room_before.min(0.0))
    } else if d > 0.0 {
        d.min(room_after.max(0.0))
    } else {
        d
    }
}

/// Largest size the box may reach through `control` before the growing sides
/// leave any of `bounds`, intersected with `limits`.
pub fn get_resize_limits(
    extent: Rect,
    control: ResizeControl,
    bounds: &[Rect],
    limits: Option<ResizeLimits>,
) -> ResizeLimits {
    let anchor = control.anchor(extent);
    let mut result = limits.unwrap_or_default();
    for bound in bounds {
        let right = bound.max.x - anchor.x;
        let left = anchor.x - bound.min.x;
        let down = bound.max.y - anchor.y;
        let up = anchor.y - bound.min.y;
        let (max_width, max_height) = match control {
            ResizeControl::E => (right, 2.0 * up.min(down)),
            ResizeControl::W => (left, 2.0 * up.min(down)),
            ResizeControl::S => (2.0 * left.min(right), down),
            ResizeControl::N => (2.0 * left.min(right), up),
            ResizeControl::SE => (right, down),
            ResizeControl::NE => (right, up),
            ResizeControl::SW => (left, down),
            ResizeControl::NW => (left, up),
        };
        result.max_width = min_opt(result.max_width, max_width);
        result.max_height = min_opt(result.max_height, max_height);
    }
    result
}

/// New `(width, height)` for a resize through `control` by `(dx, dy)`.
///
/// The scale is uniform so the box keeps its aspect ratio. Corner handles take
/// the larger of the two per-axis factors; side handles ignore the cross axis.
pub fn scale_extent(
    extent: Rect,
    control: ResizeControl,
    dx: f32,
    dy: f32,
    limits: Option<ResizeLimits>,
) -> Vec2 {
    let w = extent.width();
    let h = extent.height();
    if dx == 0.0 && dy == 0.0 {
        return vec2(w, h);
    }

    let (sign_x, sign_y) = control.growth_sign();
    let scale_x = 1.0 + sign_x * dx / w;
    let scale_y = 1.0 + sign_y * dy / h;
    let scale = if control.is_corner() {
        scale_x.max(scale_y)
    } else if sign_x != 0.0 {
        scale_x
    } else {
        scale_y
    };

    let mut scaled_w = w * scale;
    let mut scaled_h = h * scale;
    let Some(limits) = limits else {
        return vec2(scaled_w, scaled_h);
    };

    if scaled_h > limits.max_height() {
        scaled_h = limits.max_height();
        scaled_w = w * scaled_h / h;
    } else if scaled_h < limits.min_height() {
        scaled_h = limits.min_height();
        scaled_w = w * scaled_h / h;
    }
    if scaled_w > limits.max_width() {
        scaled_w = limits.max_width();
        scaled_h = h * scaled_w / w;
    } else if scaled_w < limits.min_width() {
        scaled_w = limits.min_width();
        scaled_h = h * scaled_w / w;
    }
    // Width clamping can push the height back past its maximum; maxima win.
    if scaled_h > limits.max_height() {
        scaled_h = limits.max_height();
        scaled_w = w * scaled_h / h;
    }
    vec2(scaled_w, scaled_h)
}

/// Resizes `extent` through `control`, keeping the handle's anchor fixed.
pub fn resize_extent(
    extent: Rect,
    control: ResizeControl,
    dx: f32,
    dy: f32,
    limits: Option<ResizeLimits>,
) -> Rect {
    let size = scale_extent(extent, control, dx, dy, limits);
    let anchor = control.anchor(extent);
    let (w, h) = (size.x, size.y);
    let (x1, x2) = match control {
        ResizeControl::E | ResizeControl::NE | ResizeControl::SE => (anchor.x, anchor.x + w),
        ResizeControl::W | ResizeControl::NW | ResizeControl::SW => (anchor.x - w, anchor.x),
        ResizeControl::N | ResizeControl::S => (anchor.x - w / 2.0, anchor.x + w / 2.0),
    };
    let (y1, y2) = match control {
        ResizeControl::S | ResizeControl::SE | ResizeControl::SW => (anchor.y, anchor.y + h),
        ResizeControl::N | ResizeControl::NE | ResizeControl::NW => (anchor.y - h, anchor.y),
        ResizeControl::E | ResizeControl::W => (anchor.y - h / 2.0, anchor.y + h / 2.0),
    };
    Rect::from_two_pos(pos2(x1, y1), pos2(x2, y2))
}

/// Bounding box of a set of points, or `None` for an empty set.
pub fn bounding_box(points: impl IntoIterator<Item = Pos2>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold(Rect::from_min_max(first, first), |rect, p| rect.union(Rect::from_min_max(p, p))))
}
