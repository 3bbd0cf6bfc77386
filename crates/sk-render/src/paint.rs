//! Overlay model → draw calls.
//!
//! One composite per frame: base (or sketch) image, face connectors with the
//! selected face's grid, pose skeletons, then exactly one grid layer. The
//! compositor reads the model and never writes it; anything the caller must
//! react to comes back in the [`RenderReport`].

use crate::grid::{self, draw_grid_from_rect};
use crate::sketch::{FilterError, SketchCache, pencil_sketch};
use crate::surface::{DrawSurface, Rgba, StrokeStyle};
use sk_core::topology::{FaceFeature, POSE_CONNECTIONS};
use sk_core::{CanvasSize, EngineConfig, InteractionMode, OverlayModel, SquareRect};

pub const POSE_LINE_COLORS: [Rgba; 3] = [
    Rgba::rgb(0x00, 0xFF, 0x00),
    Rgba::rgb(0x00, 0xFF, 0xFF),
    Rgba::rgb(0xFF, 0x00, 0xFF),
];
pub const POSE_POINT_COLORS: [Rgba; 3] = [
    Rgba::rgb(0xFF, 0x00, 0x00),
    Rgba::rgb(0xFF, 0xFF, 0x00),
    Rgba::rgb(0x00, 0x00, 0xFF),
];
pub const POSE_LINE_WIDTH: f32 = 2.0;
pub const DRAGGED_POINT: StrokeStyle = StrokeStyle::solid(Rgba::rgb(0x00, 0x00, 0xFF), 2.0);

const EYE_SELECTED: Rgba = Rgba::rgb(0xFF, 0x30, 0x30);
const EYE_UNSELECTED: Rgba = Rgba::rgb(0xFF, 0xA0, 0xA0);
const OUTLINE_SELECTED: Rgba = Rgba::rgb(0xE0, 0xE0, 0xE0);
const OUTLINE_UNSELECTED: Rgba = Rgba::rgb(0xB0, 0xB0, 0xB0);

/// Connector style for one face feature.
pub fn face_feature_style(feature: FaceFeature, selected: bool) -> StrokeStyle {
    let color = match (feature.is_eye(), selected) {
        (true, true) => EYE_SELECTED,
        (true, false) => EYE_UNSELECTED,
        (false, true) => OUTLINE_SELECTED,
        (false, false) => OUTLINE_UNSELECTED,
    };
    StrokeStyle::solid(color, 1.0)
}

/// Everything the compositor reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub model: &'a OverlayModel,
    pub mode: InteractionMode,
    pub show_face: bool,
    pub show_pose: bool,
    pub show_sketch: bool,
    /// `None` when no image is loaded.
    pub image_generation: Option<u64>,
    pub config: &'a EngineConfig,
}

/// Outcome of a composite the caller may need to act on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// The sketch could not be produced; the base image was drawn instead.
    pub sketch_failed: Option<FilterError>,
    pub sketch_drawn: bool,
    pub face_overlay_drawn: bool,
    pub pose_overlay_drawn: bool,
    /// Selected face whose bounding box was degenerate.
    pub face_grid_skipped: Option<usize>,
    /// Selected face with no landmarks.
    pub selected_face_empty: Option<usize>,
}

/// Draw one full frame.
pub fn composite(
    surface: &mut dyn DrawSurface,
    state: &RenderState<'_>,
    cache: &mut SketchCache,
) -> RenderReport {
    let mut report = RenderReport::default();
    surface.clear();

    let Some(generation) = state.image_generation else {
        return report;
    };

    if state.show_sketch {
        let dims = surface.size().pixel_dims();
        let sigma = state.config.sketch_blur_sigma;
        let sketch = cache.get_or_compute(generation, dims, || {
            let base = surface.base_pixels()?;
            pencil_sketch(&base, sigma)
        });
        match sketch {
            Ok(pixels) => {
                surface.draw_pixels(pixels);
                report.sketch_drawn = true;
            }
            Err(e) => {
                log::warn!("sketch unavailable, drawing base image: {e}");
                surface.draw_base_image();
                report.sketch_failed = Some(e);
            }
        }
    } else {
        surface.draw_base_image();
    }

    let defining = state.mode.is_defining_grid();
    let model = state.model;

    if state.show_face && !defining && model.faces.is_some() {
        paint_faces(surface, model, &mut report);
        report.face_overlay_drawn = true;
    }
    if state.show_pose && !defining && !model.poses.is_empty() {
        paint_poses(surface, state);
        report.pose_overlay_drawn = true;
    }

    match state.mode {
        InteractionMode::DrawingGrid { anchor, current } => {
            surface.stroke_rect(SquareRect::from_drag(anchor, current), &grid::PREVIEW);
        }
        mode if mode.is_adjusting() && model.adjustable().is_some() => {
            if let Some(rect) = model.adjustable().filter(|r| r.size > 0.0) {
                surface.stroke_rect(rect, &grid::OUTLINE);
            }
        }
        _ => {
            if model.show_confirmed
                && let Some(rect) = model.confirmed
            {
                draw_grid_from_rect(surface, rect);
            }
        }
    }

    log::trace!("composite {:?}: {:?}", state.mode.name(), report);
    report
}

// ─── Overlay painters ────────────────────────────────────────────────────

fn paint_faces(surface: &mut dyn DrawSurface, model: &OverlayModel, report: &mut RenderReport) {
    let canvas: CanvasSize = surface.size();
    for index in 0..model.face_count() {
        let selected = model.selected_face == Some(index);
        let points = model.face_points(index, canvas);
        if points.is_empty() {
            if selected {
                report.selected_face_empty = Some(index);
            }
            continue;
        }

        for feature in FaceFeature::ALL {
            let style = face_feature_style(feature, selected);
            for &(a, b) in feature.connections() {
                if let (Some(&from), Some(&to)) = (points.get(a), points.get(b)) {
                    surface.stroke_line(from, to, &style);
                }
            }
        }

        if selected {
            match model.face_grid_rect(canvas) {
                Some(rect) if grid::is_drawable(rect.size) => draw_grid_from_rect(surface, rect),
                _ => report.face_grid_skipped = Some(index),
            }
        }
    }
}

fn paint_poses(surface: &mut dyn DrawSurface, state: &RenderState<'_>) {
    let first = state.config.first_draggable_pose_point;
    let radius = state.config.point_radius;
    let dragged = match state.mode {
        InteractionMode::DraggingPoint { subject, point, .. } => Some((subject, point)),
        _ => None,
    };

    for (si, pose) in state.model.poses.iter().enumerate() {
        if pose.points.is_empty() {
            continue;
        }
        let line = StrokeStyle::solid(POSE_LINE_COLORS[si % 3], POSE_LINE_WIDTH);
        let fill = POSE_POINT_COLORS[si % 3];

        for &(a, b) in POSE_CONNECTIONS {
            if a < first || b < first {
                continue;
            }
            if let (Some(from), Some(to)) = (pose.points.get(a), pose.points.get(b)) {
                surface.stroke_line(from.pos, to.pos, &line);
            }
        }

        for (pi, p) in pose.points.iter().enumerate().skip(first) {
            surface.fill_circle(p.pos, radius, fill);
            if dragged == Some((si, pi)) {
                surface.stroke_circle(p.pos, radius, &DRAGGED_POINT);
            }
        }
    }
}
