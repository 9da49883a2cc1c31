//! Pure geometry for board layout: camera transforms, bounding boxes, grid
//! placement, even spacing, and fit-to-view.
//!
//! Everything here is side-effect free; the interpreter and gesture layers
//! feed results back through the store.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::consts::{
    FIT_PADDING_PX, FIT_ZOOM_MAX, FIT_ZOOM_MIN, SIZE_MULTIPLIER_MAX, SIZE_MULTIPLIER_MIN,
};
use crate::object::BoardObject;

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Whether `p` lies inside (or on the edge of) the rectangle.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// `pan_x` / `pan_y` are in screen pixels. `zoom` is a scale factor
/// (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }
}

/// Bounding box of an object, treating unsized (edge) kinds as points.
#[must_use]
pub fn object_bounds(obj: &BoardObject) -> Rect {
    Rect::new(obj.x, obj.y, obj.width.unwrap_or(0.0), obj.height.unwrap_or(0.0))
}

/// Bounding box of a set of objects. `None` when the set is empty.
#[must_use]
pub fn bounding_box<'a>(objects: impl IntoIterator<Item = &'a BoardObject>) -> Option<Rect> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut any = false;
    for obj in objects {
        let b = object_bounds(obj);
        min_x = min_x.min(b.x);
        min_y = min_y.min(b.y);
        max_x = max_x.max(b.x + b.width);
        max_y = max_y.max(b.y + b.height);
        any = true;
    }
    any.then(|| Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Derived grid dimensions for `n` items: `cols = ceil(sqrt(n))`,
/// `rows = ceil(n / cols)`. Returns `(0, 0)` for zero items.
#[must_use]
pub fn grid_dims(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    (cols, rows)
}

/// Top-left cell positions for `n` items in a grid of `cols` columns starting
/// at `origin`, with uniform `cell_width` × `cell_height` cells separated by
/// `gap`. Cells never overlap.
#[must_use]
pub fn grid_positions(origin: Point, n: usize, cols: usize, cell_width: f64, cell_height: f64, gap: f64) -> Vec<Point> {
    if cols == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let col = i % cols;
            let row = i / cols;
            #[allow(clippy::cast_precision_loss)]
            Point::new(
                origin.x + col as f64 * (cell_width + gap),
                origin.y + row as f64 * (cell_height + gap),
            )
        })
        .collect()
}

/// Top-left positions for one horizontal row of `sizes.len()` items with
/// equal `gap` between footprints, the row centered on `center` both ways
/// (each item vertically centered on `center.y`).
#[must_use]
pub fn space_evenly_x(center: Point, sizes: &[(f64, f64)], gap: f64) -> Vec<Point> {
    if sizes.is_empty() {
        return Vec::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let total: f64 = sizes.iter().map(|(w, _)| w).sum::<f64>() + gap * (sizes.len() - 1) as f64;
    let mut cursor = center.x - total * 0.5;
    sizes
        .iter()
        .map(|&(w, h)| {
            let p = Point::new(cursor, center.y - h * 0.5);
            cursor += w + gap;
            p
        })
        .collect()
}

/// Camera that fits `bounds` inside a `viewport_width` × `viewport_height`
/// viewport with padding, the content bounding box centered.
///
/// Zoom is clamped to `[FIT_ZOOM_MIN, FIT_ZOOM_MAX]`; degenerate (zero-area)
/// bounds fit at maximum zoom, centered.
#[must_use]
pub fn fit_view(bounds: Rect, viewport_width: f64, viewport_height: f64) -> Camera {
    let usable_w = (viewport_width - 2.0 * FIT_PADDING_PX).max(1.0);
    let usable_h = (viewport_height - 2.0 * FIT_PADDING_PX).max(1.0);
    let zoom = if bounds.width <= 0.0 || bounds.height <= 0.0 {
        FIT_ZOOM_MAX
    } else {
        (usable_w / bounds.width).min(usable_h / bounds.height)
    }
    .clamp(FIT_ZOOM_MIN, FIT_ZOOM_MAX);
    let center = bounds.center();
    Camera {
        pan_x: viewport_width * 0.5 - center.x * zoom,
        pan_y: viewport_height * 0.5 - center.y * zoom,
        zoom,
    }
}

/// Multiplier applied to default footprints so objects created at low zoom
/// stay legible on screen and objects created at high zoom don't dwarf the
/// viewport. `(1 / zoom)`, clamped.
#[must_use]
pub fn size_multiplier(zoom: f64) -> f64 {
    if zoom <= 0.0 {
        return SIZE_MULTIPLIER_MAX;
    }
    (1.0 / zoom).clamp(SIZE_MULTIPLIER_MIN, SIZE_MULTIPLIER_MAX)
}
