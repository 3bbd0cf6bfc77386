//! Overlay data model.
//!
//! Everything drawn on top of the base image lives here: detector results
//! (face subjects kept normalized, pose subjects kept as draggable canvas-space
//! points), the adjustable and confirmed grid squares, and the handles
//! derived from the adjustable square. The model is plain owned data; the
//! editor's session is its only writer.

use crate::geometry::CanvasSize;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Points & detections ─────────────────────────────────────────────────

/// A canvas-space position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn clamped_to(&self, canvas: CanvasSize) -> Self {
        Self::new(
            self.x.clamp(0.0, canvas.width.max(0.0)),
            self.y.clamp(0.0, canvas.height.max(0.0)),
        )
    }
}

/// One detector point, normalized to `[0, 1]` per image axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    /// Project into canvas space.
    pub fn to_canvas(&self, canvas: CanvasSize) -> Point {
        Point::new(self.x * canvas.width, self.y * canvas.height)
    }
}

/// One detected face or body with its ordered landmarks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Subject {
    pub points: Vec<Landmark>,
}

/// Raw detector output for one image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Detections {
    pub subjects: Vec<Subject>,
}

impl Detections {
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// A pose point in canvas space. Visibility is carried through from the detector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PosePoint {
    pub pos: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

/// A draggable pose subject.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseSubject {
    pub points: Vec<PosePoint>,
}

impl PoseSubject {
    pub fn from_normalized(subject: &Subject, canvas: CanvasSize) -> Self {
        Self {
            points: subject
                .points
                .iter()
                .map(|lm| PosePoint {
                    pos: lm.to_canvas(canvas),
                    visibility: lm.visibility,
                })
                .collect(),
        }
    }
}

// ─── Grid square ─────────────────────────────────────────────────────────

/// Axis-aligned square, `size >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SquareRect {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl SquareRect {
    pub const fn new(x: f32, y: f32, size: f32) -> Self {
        Self { x, y, size }
    }

    /// The square spanned by a drag from `anchor` toward `current`.
    ///
    /// Side is `max(|dx|, |dy|)`; the square grows toward the pointer on
    /// both axes regardless of drag direction.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        let dx = current.x - anchor.x;
        let dy = current.y - anchor.y;
        let size = dx.abs().max(dy.abs());
        let x = if dx >= 0.0 { anchor.x } else { anchor.x - size };
        let y = if dy >= 0.0 { anchor.y } else { anchor.y - size };
        Self { x, y, size }
    }

    pub fn right(&self) -> f32 {
        self.x + self.size
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.size
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.size * factor)
    }

    /// Square centered on the bounding box of `points`, side = longer box side.
    /// `None` for no points or a degenerate box.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut min = Point::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        let size = (max.x - min.x).max(max.y - min.y);
        if !size.is_finite() || size <= 0.0 {
            return None;
        }
        let mid_x = (min.x + max.x) / 2.0;
        let mid_y = (min.y + max.y) / 2.0;
        Some(Self::new(mid_x - size / 2.0, mid_y - size / 2.0, size))
    }

    /// All eight handles in hit-test order.
    pub fn handles(&self) -> [Handle; 8] {
        HandleRole::ALL.map(|role| Handle {
            role,
            pos: self.handle_position(role),
        })
    }

    pub fn handle_position(&self, role: HandleRole) -> Point {
        let half = self.size / 2.0;
        let (x, y, r, b) = (self.x, self.y, self.right(), self.bottom());
        match role {
            HandleRole::Tl => Point::new(x, y),
            HandleRole::Tr => Point::new(r, y),
            HandleRole::Bl => Point::new(x, b),
            HandleRole::Br => Point::new(r, b),
            HandleRole::Tm => Point::new(x + half, y),
            HandleRole::Bm => Point::new(x + half, b),
            HandleRole::Ml => Point::new(x, y + half),
            HandleRole::Mr => Point::new(r, y + half),
        }
    }

    /// Recompute the square while `role` is dragged to `pointer`.
    ///
    /// The edge or corner opposite the handle stays fixed. Edge handles keep
    /// the square centered on the perpendicular axis. Size never drops below
    /// `min_size`.
    pub fn resized_by_handle(&self, role: HandleRole, pointer: Point, min_size: f32) -> Self {
        let Self { x, y, size } = *self;
        let right = self.right();
        let bottom = self.bottom();
        let (px, py) = (pointer.x, pointer.y);

        match role {
            HandleRole::Tl => {
                let s = (right - px).max(bottom - py).max(min_size);
                Self::new(right - s, bottom - s, s)
            }
            HandleRole::Tr => {
                let s = (px - x).max(bottom - py).max(min_size);
                Self::new(x, bottom - s, s)
            }
            HandleRole::Bl => {
                let s = (right - px).max(py - y).max(min_size);
                Self::new(right - s, y, s)
            }
            HandleRole::Br => {
                let s = (px - x).max(py - y).max(min_size);
                Self::new(x, y, s)
            }
            HandleRole::Tm => {
                let s = (bottom - py).max(min_size);
                Self::new(x + (size - s) / 2.0, bottom - s, s)
            }
            HandleRole::Bm => {
                let s = (py - y).max(min_size);
                Self::new(x + (size - s) / 2.0, y, s)
            }
            HandleRole::Ml => {
                let s = (right - px).max(min_size);
                Self::new(right - s, y + (size - s) / 2.0, s)
            }
            HandleRole::Mr => {
                let s = (px - x).max(min_size);
                Self::new(x, y + (size - s) / 2.0, s)
            }
        }
    }

    /// Move the square so its top-left sits at `pointer - grab`, kept fully
    /// inside the canvas.
    pub fn dragged_to(&self, pointer: Point, grab: Point, canvas: CanvasSize) -> Self {
        let max_x = (canvas.width - self.size).max(0.0);
        let max_y = (canvas.height - self.size).max(0.0);
        Self::new(
            (pointer.x - grab.x).clamp(0.0, max_x),
            (pointer.y - grab.y).clamp(0.0, max_y),
            self.size,
        )
    }
}

// ─── Handles ─────────────────────────────────────────────────────────────

/// Drag affordances around the adjustable square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleRole {
    Tl,
    Tr,
    Bl,
    Br,
    Tm,
    Bm,
    Ml,
    Mr,
}

impl HandleRole {
    /// Hit-test order; the first match wins.
    pub const ALL: [HandleRole; 8] = [
        HandleRole::Tl,
        HandleRole::Tr,
        HandleRole::Bl,
        HandleRole::Br,
        HandleRole::Tm,
        HandleRole::Bm,
        HandleRole::Ml,
        HandleRole::Mr,
    ];

    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            HandleRole::Tl | HandleRole::Tr | HandleRole::Bl | HandleRole::Br
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HandleRole::Tl => "tl",
            HandleRole::Tr => "tr",
            HandleRole::Bl => "bl",
            HandleRole::Br => "br",
            HandleRole::Tm => "tm",
            HandleRole::Bm => "bm",
            HandleRole::Ml => "ml",
            HandleRole::Mr => "mr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    pub role: HandleRole,
    pub pos: Point,
}

// ─── Interaction mode ────────────────────────────────────────────────────

/// The single active pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Manual grid mode is on; the next pointer-down starts a square.
    GridArmed,
    DrawingGrid {
        anchor: Point,
        current: Point,
    },
    AdjustingGrid,
    /// `grab` is the pointer offset from the square's top-left.
    DraggingGridSquare {
        grab: Point,
    },
    DraggingHandle(HandleRole),
    /// `grab` is the pointer offset from the point.
    DraggingPoint {
        subject: usize,
        point: usize,
        grab: Point,
    },
}

impl InteractionMode {
    /// Any manual-grid state; detection overlays are hidden while true.
    pub fn is_defining_grid(&self) -> bool {
        matches!(
            self,
            Self::GridArmed
                | Self::DrawingGrid { .. }
                | Self::AdjustingGrid
                | Self::DraggingGridSquare { .. }
                | Self::DraggingHandle(_)
        )
    }

    /// The adjustable square is live (possibly mid-drag).
    pub fn is_adjusting(&self) -> bool {
        matches!(
            self,
            Self::AdjustingGrid | Self::DraggingGridSquare { .. } | Self::DraggingHandle(_)
        )
    }

    /// A pointer gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            Self::DrawingGrid { .. }
                | Self::DraggingGridSquare { .. }
                | Self::DraggingHandle(_)
                | Self::DraggingPoint { .. }
        )
    }

    pub fn scaled(&self, factor: f32) -> Self {
        match *self {
            Self::DrawingGrid { anchor, current } => Self::DrawingGrid {
                anchor: anchor.scaled(factor),
                current: current.scaled(factor),
            },
            other => other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::GridArmed => "grid-armed",
            Self::DrawingGrid { .. } => "drawing-grid",
            Self::AdjustingGrid => "adjusting-grid",
            Self::DraggingGridSquare { .. } => "dragging-grid-square",
            Self::DraggingHandle(_) => "dragging-handle",
            Self::DraggingPoint { .. } => "dragging-point",
        }
    }
}

// ─── Overlay model ───────────────────────────────────────────────────────

/// All overlay geometry for the current image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayModel {
    /// Face detections, normalized; projected at draw time.
    pub faces: Option<Detections>,
    /// Face used as the grid reference. `None` until resolved.
    pub selected_face: Option<usize>,
    /// Raw pose detections, normalized; source for re-deriving `poses`.
    pub pose_raw: Option<Detections>,
    /// Draggable pose subjects in canvas space.
    pub poses: SmallVec<[PoseSubject; 3]>,
    adjustable: Option<SquareRect>,
    handles: SmallVec<[Handle; 8]>,
    pub confirmed: Option<SquareRect>,
    pub show_confirmed: bool,
}

impl OverlayModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn adjustable(&self) -> Option<SquareRect> {
        self.adjustable
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    /// Replace the adjustable square and regenerate its handles.
    pub fn set_adjustable(&mut self, rect: SquareRect) {
        self.adjustable = Some(rect);
        self.handles = SmallVec::from_slice(&rect.handles());
    }

    pub fn clear_adjustable(&mut self) {
        self.adjustable = None;
        self.handles.clear();
    }

    /// Copy the adjustable square into the confirmed slot.
    /// Returns `false` (and changes nothing) when there is nothing to confirm.
    pub fn confirm_adjustable(&mut self) -> bool {
        match self.adjustable {
            Some(rect) => {
                self.confirmed = Some(rect);
                self.show_confirmed = true;
                self.clear_adjustable();
                true
            }
            None => false,
        }
    }

    pub fn clear_grid(&mut self) {
        self.clear_adjustable();
        self.confirmed = None;
        self.show_confirmed = false;
    }

    pub fn clear_faces(&mut self) {
        self.faces = None;
        self.selected_face = None;
    }

    pub fn clear_poses(&mut self) {
        self.pose_raw = None;
        self.poses.clear();
    }

    pub fn face_count(&self) -> usize {
        self.faces.as_ref().map_or(0, Detections::len)
    }

    /// Rebuild draggable pose points from the raw detections.
    ///
    /// An empty canvas yields no points; the first resize to a real size
    /// derives them from `pose_raw`.
    pub fn derive_poses(&mut self, canvas: CanvasSize) {
        self.poses = match &self.pose_raw {
            Some(_) if canvas.is_empty() => SmallVec::new(),
            Some(raw) => raw
                .subjects
                .iter()
                .map(|s| PoseSubject::from_normalized(s, canvas))
                .collect(),
            None => SmallVec::new(),
        };
    }

    pub fn pose_point(&self, subject: usize, point: usize) -> Option<Point> {
        self.poses
            .get(subject)
            .and_then(|s| s.points.get(point))
            .map(|p| p.pos)
    }

    pub fn set_pose_point(&mut self, subject: usize, point: usize, pos: Point) -> bool {
        match self
            .poses
            .get_mut(subject)
            .and_then(|s| s.points.get_mut(point))
        {
            Some(p) => {
                p.pos = pos;
                true
            }
            None => false,
        }
    }

    /// Canvas-space points of face `index`.
    pub fn face_points(&self, index: usize, canvas: CanvasSize) -> Vec<Point> {
        self.faces
            .as_ref()
            .and_then(|f| f.subjects.get(index))
            .map(|s| s.points.iter().map(|lm| lm.to_canvas(canvas)).collect())
            .unwrap_or_default()
    }

    /// Grid square derived from the selected face's bounding box.
    pub fn face_grid_rect(&self, canvas: CanvasSize) -> Option<SquareRect> {
        let index = self.selected_face?;
        SquareRect::enclosing(self.face_points(index, canvas))
    }

    /// Multiply every canvas-space coordinate by `factor`.
    pub fn rescale(&mut self, factor: f32) {
        for subject in &mut self.poses {
            for p in &mut subject.points {
                p.pos = p.pos.scaled(factor);
            }
        }
        if let Some(rect) = self.adjustable.filter(|r| r.size > 0.0) {
            self.set_adjustable(rect.scaled(factor));
        }
        if let Some(rect) = self.confirmed.as_mut().filter(|r| r.size > 0.0) {
            *rect = rect.scaled(factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drag_square_grows_toward_pointer() {
        let anchor = Point::new(100.0, 100.0);
        assert_eq!(
            SquareRect::from_drag(anchor, Point::new(130.0, 110.0)),
            SquareRect::new(100.0, 100.0, 30.0)
        );
        assert_eq!(
            SquareRect::from_drag(anchor, Point::new(80.0, 60.0)),
            SquareRect::new(60.0, 60.0, 40.0)
        );
        assert_eq!(
            SquareRect::from_drag(anchor, Point::new(90.0, 150.0)),
            SquareRect::new(50.0, 100.0, 50.0)
        );
    }

    #[test]
    fn handles_follow_rect() {
        let mut model = OverlayModel::new();
        model.set_adjustable(SquareRect::new(10.0, 20.0, 100.0));
        let handles = model.handles();
        assert_eq!(handles.len(), 8);
        assert_eq!(handles[0].role, HandleRole::Tl);
        assert_eq!(handles[3].pos, Point::new(110.0, 120.0));
        assert_eq!(handles[4].pos, Point::new(60.0, 20.0));
        assert_eq!(handles[7].pos, Point::new(110.0, 70.0));

        model.set_adjustable(SquareRect::new(0.0, 0.0, 50.0));
        assert_eq!(model.handles()[3].pos, Point::new(50.0, 50.0));
    }

    #[test]
    fn corner_handle_respects_minimum() {
        let rect = SquareRect::new(100.0, 100.0, 50.0);
        let shrunk = rect.resized_by_handle(HandleRole::Br, Point::new(101.0, 101.0), 10.0);
        assert_eq!(shrunk, SquareRect::new(100.0, 100.0, 10.0));
        let tl = rect.resized_by_handle(HandleRole::Tl, Point::new(149.0, 149.0), 10.0);
        assert_eq!(tl, SquareRect::new(140.0, 140.0, 10.0));
    }

    #[test]
    fn edge_handle_recenters_perpendicular_axis() {
        let rect = SquareRect::new(100.0, 100.0, 50.0);
        let grown = rect.resized_by_handle(HandleRole::Mr, Point::new(170.0, 0.0), 10.0);
        assert_eq!(grown, SquareRect::new(100.0, 90.0, 70.0));
        assert_eq!(grown.y + grown.size / 2.0, 125.0);
    }

    #[test]
    fn drag_clamps_into_canvas() {
        let rect = SquareRect::new(10.0, 10.0, 50.0);
        let canvas = CanvasSize::new(200.0, 100.0);
        let moved = rect.dragged_to(Point::new(500.0, -40.0), Point::new(5.0, 5.0), canvas);
        assert_eq!(moved, SquareRect::new(150.0, 0.0, 50.0));
    }

    #[test]
    fn enclosing_square_is_centered_on_box() {
        let pts = [
            Point::new(10.0, 20.0),
            Point::new(50.0, 40.0),
            Point::new(30.0, 30.0),
        ];
        assert_eq!(
            SquareRect::enclosing(pts),
            Some(SquareRect::new(10.0, 10.0, 40.0))
        );
        assert_eq!(SquareRect::enclosing([Point::new(1.0, 1.0)]), None);
        assert_eq!(SquareRect::enclosing(std::iter::empty()), None);
    }

    #[test]
    fn rescale_touches_all_geometry() {
        let mut model = OverlayModel::new();
        model.poses.push(PoseSubject {
            points: vec![
                PosePoint {
                    pos: Point::new(200.0, 150.0),
                    visibility: Some(0.9),
                },
                PosePoint {
                    pos: Point::new(10.0, 20.0),
                    visibility: None,
                },
            ],
        });
        model.set_adjustable(SquareRect::new(40.0, 40.0, 20.0));
        model.confirmed = Some(SquareRect::new(100.0, 50.0, 60.0));

        model.rescale(0.5);

        assert_eq!(model.pose_point(0, 0), Some(Point::new(100.0, 75.0)));
        assert_eq!(model.pose_point(0, 1), Some(Point::new(5.0, 10.0)));
        assert_eq!(model.adjustable(), Some(SquareRect::new(20.0, 20.0, 10.0)));
        assert_eq!(model.handles()[3].pos, Point::new(30.0, 30.0));
        assert_eq!(model.confirmed, Some(SquareRect::new(50.0, 25.0, 30.0)));
        assert_eq!(model.poses[0].points[0].visibility, Some(0.9));
    }

    #[test]
    fn poses_wait_for_a_real_canvas() {
        let mut model = OverlayModel::new();
        model.pose_raw = Some(Detections {
            subjects: vec![Subject {
                points: vec![Landmark {
                    x: 0.5,
                    y: 0.25,
                    visibility: None,
                }],
            }],
        });
        model.derive_poses(CanvasSize::ZERO);
        assert!(model.poses.is_empty());
        model.derive_poses(CanvasSize::new(400.0, 300.0));
        assert_eq!(model.pose_point(0, 0), Some(Point::new(200.0, 75.0)));
    }

    #[test]
    fn confirm_moves_adjustable_into_confirmed() {
        let mut model = OverlayModel::new();
        assert!(!model.confirm_adjustable());
        model.set_adjustable(SquareRect::new(50.0, 50.0, 100.0));
        assert!(model.confirm_adjustable());
        assert_eq!(model.confirmed, Some(SquareRect::new(50.0, 50.0, 100.0)));
        assert!(model.show_confirmed);
        assert_eq!(model.adjustable(), None);
        assert!(model.handles().is_empty());
    }

    #[test]
    fn detections_deserialize_without_visibility() {
        let json = r#"{"subjects":[{"points":[{"x":0.5,"y":0.25},{"x":0.1,"y":0.2,"visibility":0.7}]}]}"#;
        let det: Detections = serde_json::from_str(json).unwrap();
        assert_eq!(det.len(), 1);
        assert_eq!(det.subjects[0].points[0].visibility, None);
        assert_eq!(det.subjects[0].points[1].visibility, Some(0.7));
    }
}
