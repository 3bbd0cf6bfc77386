//! Grid-from-rect drawing.
//!
//! A square tiles the whole canvas: vertical and horizontal lines repeat at
//! every multiple of its side, rule-of-thirds lines subdivide the defining
//! square only, and the square's outline is stroked last.

use crate::surface::{DrawSurface, Rgba, StrokeStyle};
use sk_core::{CanvasSize, Point, SquareRect};

pub const TILE_VERTICAL: StrokeStyle = StrokeStyle::solid(Rgba::rgba(0, 123, 255, 0.75), 1.5);
pub const TILE_HORIZONTAL: StrokeStyle = StrokeStyle::solid(Rgba::rgba(255, 193, 7, 0.75), 1.5);
pub const THIRD_VERTICAL: StrokeStyle = StrokeStyle::solid(Rgba::rgba(0, 255, 0, 0.7), 0.5);
pub const THIRD_HORIZONTAL: StrokeStyle = StrokeStyle::solid(Rgba::rgba(255, 0, 0, 0.7), 0.5);
pub const OUTLINE: StrokeStyle = StrokeStyle::solid(Rgba::rgba(255, 0, 255, 0.9), 2.0);
pub const PREVIEW: StrokeStyle = StrokeStyle::dashed(Rgba::rgba(255, 0, 255, 0.8), 2.0, [5.0, 5.0]);

/// Smallest square side that tiles; anything below draws nothing.
pub const MIN_TILE_SIZE: f32 = 1.0;

/// Whether a square of side `size` produces a grid. `false` for NaN.
pub fn is_drawable(size: f32) -> bool {
    size >= MIN_TILE_SIZE && size.is_finite()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLineKind {
    TileVertical,
    TileHorizontal,
    ThirdVertical,
    ThirdHorizontal,
}

impl GridLineKind {
    pub fn style(&self) -> &'static StrokeStyle {
        match self {
            GridLineKind::TileVertical => &TILE_VERTICAL,
            GridLineKind::TileHorizontal => &TILE_HORIZONTAL,
            GridLineKind::ThirdVertical => &THIRD_VERTICAL,
            GridLineKind::ThirdHorizontal => &THIRD_HORIZONTAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub kind: GridLineKind,
    pub from: Point,
    pub to: Point,
}

/// Positions `origin ± k·size` inside the tiling band around `[0, extent]`.
///
/// Forward positions (k >= 0) may sit exactly on `-size`; backward ones may not.
fn tile_positions(origin: f32, size: f32, extent: f32) -> Vec<f32> {
    let mut out = Vec::new();
    if !is_drawable(size) || !origin.is_finite() || !extent.is_finite() {
        return out;
    }
    let lo = -size;
    let hi = extent + size;

    let mut k = ((lo - origin) / size).ceil().max(0.0) as u64;
    loop {
        let p = origin + k as f32 * size;
        if p >= hi {
            break;
        }
        if p >= lo {
            out.push(p);
        }
        k += 1;
    }

    let mut k = ((origin - hi) / size).floor().max(1.0) as u64;
    loop {
        let p = origin - k as f32 * size;
        if p <= lo {
            break;
        }
        if p < hi {
            out.push(p);
        }
        k += 1;
    }

    out
}

/// Every line of the grid in draw order, outline excluded.
/// Empty when `size` is below [`MIN_TILE_SIZE`].
pub fn grid_lines(rect: SquareRect, canvas: CanvasSize) -> Vec<GridLine> {
    if !is_drawable(rect.size) {
        return Vec::new();
    }
    let SquareRect { x, y, size } = rect;
    let (w, h) = (canvas.width, canvas.height);
    let mut lines = Vec::new();

    for cx in tile_positions(x, size, w) {
        lines.push(GridLine {
            kind: GridLineKind::TileVertical,
            from: Point::new(cx, 0.0),
            to: Point::new(cx, h),
        });
    }
    for cy in tile_positions(y, size, h) {
        lines.push(GridLine {
            kind: GridLineKind::TileHorizontal,
            from: Point::new(0.0, cy),
            to: Point::new(w, cy),
        });
    }

    let third = size / 3.0;
    for i in 1..=2 {
        let cx = x + third * i as f32;
        lines.push(GridLine {
            kind: GridLineKind::ThirdVertical,
            from: Point::new(cx, y),
            to: Point::new(cx, y + size),
        });
    }
    for i in 1..=2 {
        let cy = y + third * i as f32;
        lines.push(GridLine {
            kind: GridLineKind::ThirdHorizontal,
            from: Point::new(x, cy),
            to: Point::new(x + size, cy),
        });
    }

    lines
}

/// Draw the full grid for `rect`. Degenerate rects draw nothing.
pub fn draw_grid_from_rect(surface: &mut dyn DrawSurface, rect: SquareRect) {
    if !is_drawable(rect.size) {
        return;
    }
    let lines = grid_lines(rect, surface.size());
    log::trace!("grid {:?}: {} lines", rect, lines.len());
    for line in &lines {
        surface.stroke_line(line.from, line.to, line.kind.style());
    }
    surface.stroke_rect(rect, &OUTLINE);
}
