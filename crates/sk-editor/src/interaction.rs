//! Pointer interaction state machine.
//!
//! Owns the single active [`InteractionMode`] and the hover flags. Every
//! handler reads the overlay model through a [`PointerContext`] and returns
//! a [`Transition`]: the model changes to apply, user notices, and how
//! urgently to redraw. The machine never writes the model itself.
//!
//! ```text
//! Idle ──arm──▶ GridArmed ──down──▶ DrawingGrid ──up(≥min)──▶ AdjustingGrid
//!  ▲                                     │                      │  ▲
//!  └──────────────up(<min)───────────────┘      down(handle/square) │
//!  ▲                                                            ▼  │ up
//!  │                                   DraggingHandle / DraggingGridSquare
//!  └──confirm / cancel── AdjustingGrid
//! Idle ──down(pose point)──▶ DraggingPoint ──up──▶ Idle
//! ```

use crate::mutation::OverlayMutation;
use sk_core::{
    CanvasSize, EngineConfig, HandleRole, InteractionMode, Notice, OverlayModel, Point, SquareRect,
};
use sk_render::{hit_handle, hit_pose_point, hit_square};
use smallvec::SmallVec;

/// Read-only view of everything a pointer handler needs.
#[derive(Debug, Clone, Copy)]
pub struct PointerContext<'a> {
    pub model: &'a OverlayModel,
    pub canvas: CanvasSize,
    /// Pose overlay toggle is on.
    pub pose_visible: bool,
    pub config: &'a EngineConfig,
}

/// What the pointer is over while nothing is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hover {
    pub over_point: bool,
    pub over_handle: Option<HandleRole>,
    pub over_square: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Redraw {
    #[default]
    None,
    /// Coalesce into the next frame.
    Frame,
    /// Render before returning to the host.
    Now,
}

impl Redraw {
    fn max(self, other: Redraw) -> Redraw {
        match (self, other) {
            (Redraw::Now, _) | (_, Redraw::Now) => Redraw::Now,
            (Redraw::Frame, _) | (_, Redraw::Frame) => Redraw::Frame,
            _ => Redraw::None,
        }
    }
}

/// The effect of one handler call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    pub mutations: SmallVec<[OverlayMutation; 2]>,
    pub notices: Vec<Notice>,
    pub redraw: Redraw,
    /// Toolbar or cursor state may have changed.
    pub ui_changed: bool,
}

impl Transition {
    pub fn none() -> Self {
        Self::default()
    }

    fn frame() -> Self {
        Self {
            redraw: Redraw::Frame,
            ..Self::default()
        }
    }

    fn now() -> Self {
        Self {
            redraw: Redraw::Now,
            ui_changed: true,
            ..Self::default()
        }
    }

    fn with(mut self, mutation: OverlayMutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    fn notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn is_noop(&self) -> bool {
        self.mutations.is_empty()
            && self.notices.is_empty()
            && self.redraw == Redraw::None
            && !self.ui_changed
    }

    /// Fold `other` into `self`, keeping order.
    pub fn merge(&mut self, other: Transition) {
        self.mutations.extend(other.mutations);
        self.notices.extend(other.notices);
        self.redraw = self.redraw.max(other.redraw);
        self.ui_changed |= other.ui_changed;
    }
}

#[derive(Debug, Default)]
pub struct InteractionMachine {
    mode: InteractionMode,
    hover: Hover,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn hover(&self) -> Hover {
        self.hover
    }

    fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode != mode {
            log::debug!("interaction: {} -> {}", self.mode.name(), mode.name());
            self.mode = mode;
        }
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, p: Point, ctx: &PointerContext<'_>) -> Transition {
        match self.mode {
            InteractionMode::AdjustingGrid => {
                let Some(rect) = ctx.model.adjustable() else {
                    return Transition::none();
                };
                if let Some(role) = hit_handle(ctx.model.handles(), p, ctx.config.handle_hit_radius)
                {
                    self.set_mode(InteractionMode::DraggingHandle(role));
                } else if hit_square(&rect, p) {
                    self.set_mode(InteractionMode::DraggingGridSquare {
                        grab: Point::new(p.x - rect.x, p.y - rect.y),
                    });
                } else {
                    return Transition::none();
                }
                self.hover = Hover::default();
                Transition::now()
            }
            InteractionMode::GridArmed => {
                self.set_mode(InteractionMode::DrawingGrid {
                    anchor: p,
                    current: p,
                });
                self.hover = Hover::default();
                Transition::now()
            }
            InteractionMode::Idle if ctx.pose_visible && !ctx.model.poses.is_empty() => {
                let Some(hit) = hit_pose_point(
                    &ctx.model.poses,
                    p,
                    ctx.config.point_hit_radius,
                    ctx.config.first_draggable_pose_point,
                ) else {
                    return Transition::none();
                };
                self.set_mode(InteractionMode::DraggingPoint {
                    subject: hit.subject,
                    point: hit.point,
                    grab: Point::new(p.x - hit.pos.x, p.y - hit.pos.y),
                });
                self.hover = Hover::default();
                Transition::now()
            }
            _ => Transition::none(),
        }
    }

    pub fn pointer_move(&mut self, p: Point, ctx: &PointerContext<'_>) -> Transition {
        match self.mode {
            InteractionMode::DraggingHandle(role) => match ctx.model.adjustable() {
                Some(rect) => Transition::frame().with(OverlayMutation::SetAdjustable(
                    rect.resized_by_handle(role, p, ctx.config.min_grid_size),
                )),
                None => Transition::none(),
            },
            InteractionMode::DraggingGridSquare { grab } => match ctx.model.adjustable() {
                Some(rect) => Transition::frame().with(OverlayMutation::SetAdjustable(
                    rect.dragged_to(p, grab, ctx.canvas),
                )),
                None => Transition::none(),
            },
            InteractionMode::DrawingGrid { anchor, .. } => {
                self.mode = InteractionMode::DrawingGrid { anchor, current: p };
                Transition::frame()
            }
            InteractionMode::DraggingPoint {
                subject,
                point,
                grab,
            } => {
                if ctx.model.pose_point(subject, point).is_none() {
                    return Transition::none();
                }
                let pos = Point::new(p.x - grab.x, p.y - grab.y).clamped_to(ctx.canvas);
                Transition::frame().with(OverlayMutation::MovePosePoint {
                    subject,
                    point,
                    pos,
                })
            }
            _ => {
                let hover = self.compute_hover(p, ctx);
                if hover == self.hover {
                    return Transition::none();
                }
                self.hover = hover;
                Transition {
                    ui_changed: true,
                    ..Transition::default()
                }
            }
        }
    }

    /// Also used for touch-cancel and pointer leaving the window.
    pub fn pointer_up(&mut self, ctx: &PointerContext<'_>) -> Transition {
        match self.mode {
            InteractionMode::DraggingHandle(_) | InteractionMode::DraggingGridSquare { .. } => {
                self.set_mode(InteractionMode::AdjustingGrid);
                Transition::now()
            }
            InteractionMode::DrawingGrid { anchor, current } => {
                let rect = SquareRect::from_drag(anchor, current);
                let min = ctx.config.min_grid_size;
                if rect.size >= min {
                    self.set_mode(InteractionMode::AdjustingGrid);
                    Transition::now()
                        .with(OverlayMutation::SetAdjustable(rect))
                        .notice(Notice::info(
                            "Grid square drawn. Adjust size/position and click Confirm.",
                        ))
                } else {
                    self.set_mode(InteractionMode::Idle);
                    Transition::now()
                        .with(OverlayMutation::ClearAdjustable)
                        .notice(Notice::warning(format!(
                            "Manual grid square too small (min {min}px), cancelled."
                        )))
                }
            }
            InteractionMode::DraggingPoint { .. } => {
                self.set_mode(InteractionMode::Idle);
                Transition::now()
            }
            _ => Transition::none(),
        }
    }

    fn compute_hover(&self, p: Point, ctx: &PointerContext<'_>) -> Hover {
        let mut hover = Hover::default();
        if ctx.pose_visible && !self.mode.is_defining_grid() {
            hover.over_point = hit_pose_point(
                &ctx.model.poses,
                p,
                ctx.config.point_hit_radius,
                ctx.config.first_draggable_pose_point,
            )
            .is_some();
        }
        if self.mode == InteractionMode::AdjustingGrid
            && let Some(rect) = ctx.model.adjustable()
        {
            hover.over_handle = hit_handle(ctx.model.handles(), p, ctx.config.handle_hit_radius);
            hover.over_square = hover.over_handle.is_none() && hit_square(&rect, p);
        }
        hover
    }

    // ─── Grid commands ───────────────────────────────────────────────────

    /// Enter manual grid mode. Only from `Idle`.
    pub fn arm_grid(&mut self) -> Transition {
        if self.mode != InteractionMode::Idle {
            return Transition::none();
        }
        self.set_mode(InteractionMode::GridArmed);
        self.hover = Hover::default();
        Transition::now().notice(Notice::info(
            "Manual Grid Mode: Click and drag on the image to define the grid square.",
        ))
    }

    /// Leave any grid-definition mode. The confirmed square is untouched.
    pub fn cancel_grid(&mut self) -> Transition {
        if !self.mode.is_defining_grid() {
            return Transition::none();
        }
        self.set_mode(InteractionMode::Idle);
        self.hover = Hover::default();
        Transition::now().with(OverlayMutation::ClearAdjustable)
    }

    /// Promote the adjustable square to the confirmed grid.
    pub fn confirm(&mut self, model: &OverlayModel) -> Transition {
        if !self.mode.is_adjusting() || model.adjustable().is_none() {
            return Transition::none();
        }
        self.set_mode(InteractionMode::Idle);
        self.hover = Hover::default();
        Transition::now()
            .with(OverlayMutation::ConfirmAdjustable)
            .notice(Notice::success("Manual grid confirmed."))
    }

    /// Back to `Idle` with no hover; used on image load, reset and clear.
    pub fn reset(&mut self) {
        self.set_mode(InteractionMode::Idle);
        self.hover = Hover::default();
    }

    /// Keep an in-progress drawing aligned with rescaled geometry.
    pub fn rescale(&mut self, factor: f32) {
        self.mode = self.mode.scaled(factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::apply_mutation;
    use pretty_assertions::assert_eq;
    use sk_core::{NoticeLevel, PosePoint, PoseSubject};

    const CANVAS: CanvasSize = CanvasSize {
        width: 400.0,
        height: 300.0,
    };

    struct Rig {
        machine: InteractionMachine,
        model: OverlayModel,
        config: EngineConfig,
        pose_visible: bool,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                machine: InteractionMachine::new(),
                model: OverlayModel::new(),
                config: EngineConfig::default(),
                pose_visible: false,
            }
        }

        fn run(&mut self, f: impl FnOnce(&mut InteractionMachine, &PointerContext<'_>) -> Transition) -> Transition {
            let ctx = PointerContext {
                model: &self.model,
                canvas: CANVAS,
                pose_visible: self.pose_visible,
                config: &self.config,
            };
            let t = f(&mut self.machine, &ctx);
            for m in &t.mutations {
                apply_mutation(&mut self.model, m);
            }
            t
        }

        fn down(&mut self, x: f32, y: f32) -> Transition {
            self.run(|m, ctx| m.pointer_down(Point::new(x, y), ctx))
        }

        fn drag(&mut self, x: f32, y: f32) -> Transition {
            self.run(|m, ctx| m.pointer_move(Point::new(x, y), ctx))
        }

        fn up(&mut self) -> Transition {
            self.run(|m, ctx| m.pointer_up(ctx))
        }
    }

    #[test]
    fn draw_commit_and_adjust() {
        let mut rig = Rig::new();
        rig.machine.arm_grid();
        rig.down(100.0, 100.0);
        rig.drag(60.0, 130.0);
        assert_eq!(
            rig.machine.mode(),
            InteractionMode::DrawingGrid {
                anchor: Point::new(100.0, 100.0),
                current: Point::new(60.0, 130.0),
            }
        );
        let t = rig.up();
        assert_eq!(t.notices[0].level, NoticeLevel::Info);
        assert_eq!(rig.machine.mode(), InteractionMode::AdjustingGrid);
        assert_eq!(rig.model.adjustable(), Some(SquareRect::new(60.0, 100.0, 40.0)));
    }

    #[test]
    fn small_drag_is_discarded() {
        let mut rig = Rig::new();
        rig.machine.arm_grid();
        rig.down(100.0, 100.0);
        rig.drag(104.0, 103.0);
        let t = rig.up();
        assert_eq!(t.notices[0].level, NoticeLevel::Warning);
        assert_eq!(
            t.notices[0].text,
            "Manual grid square too small (min 10px), cancelled."
        );
        assert_eq!(rig.machine.mode(), InteractionMode::Idle);
        assert_eq!(rig.model.adjustable(), None);
    }

    #[test]
    fn handle_wins_over_square_body() {
        let mut rig = Rig::new();
        rig.model.set_adjustable(SquareRect::new(100.0, 100.0, 100.0));
        rig.machine.mode = InteractionMode::AdjustingGrid;

        rig.down(195.0, 195.0);
        assert_eq!(rig.machine.mode(), InteractionMode::DraggingHandle(HandleRole::Br));
        rig.drag(250.0, 220.0);
        rig.up();
        assert_eq!(rig.model.adjustable(), Some(SquareRect::new(100.0, 100.0, 150.0)));
        assert_eq!(rig.machine.mode(), InteractionMode::AdjustingGrid);

        rig.down(160.0, 170.0);
        assert_eq!(
            rig.machine.mode(),
            InteractionMode::DraggingGridSquare {
                grab: Point::new(60.0, 70.0)
            }
        );
        rig.drag(1000.0, 1000.0);
        assert_eq!(rig.model.adjustable(), Some(SquareRect::new(250.0, 150.0, 150.0)));
    }

    #[test]
    fn click_outside_square_changes_nothing() {
        let mut rig = Rig::new();
        rig.model.set_adjustable(SquareRect::new(100.0, 100.0, 50.0));
        rig.machine.mode = InteractionMode::AdjustingGrid;
        assert!(rig.down(10.0, 10.0).is_noop());
        assert_eq!(rig.machine.mode(), InteractionMode::AdjustingGrid);
    }

    #[test]
    fn pose_point_drag_is_clamped() {
        let mut rig = Rig::new();
        rig.pose_visible = true;
        let mut pose = PoseSubject::default();
        for i in 0..13 {
            pose.points.push(PosePoint {
                pos: Point::new(20.0 * i as f32, 50.0),
                visibility: None,
            });
        }
        rig.model.poses.push(pose);

        // Index 5 is below the draggable range.
        assert!(rig.down(100.0, 50.0).is_noop());

        rig.down(222.0, 51.0);
        assert_eq!(
            rig.machine.mode(),
            InteractionMode::DraggingPoint {
                subject: 0,
                point: 11,
                grab: Point::new(2.0, 1.0)
            }
        );
        rig.drag(-50.0, 500.0);
        assert_eq!(rig.model.pose_point(0, 11), Some(Point::new(0.0, 300.0)));
        rig.up();
        assert_eq!(rig.machine.mode(), InteractionMode::Idle);
    }

    #[test]
    fn hover_tracks_handles_then_square() {
        let mut rig = Rig::new();
        rig.model.set_adjustable(SquareRect::new(100.0, 100.0, 100.0));
        rig.machine.mode = InteractionMode::AdjustingGrid;

        let t = rig.drag(101.0, 101.0);
        assert!(t.ui_changed);
        assert_eq!(rig.machine.hover().over_handle, Some(HandleRole::Tl));
        assert!(!rig.machine.hover().over_square);

        rig.drag(150.0, 130.0);
        assert_eq!(
            rig.machine.hover(),
            Hover {
                over_point: false,
                over_handle: None,
                over_square: true
            }
        );
        assert!(!rig.drag(151.0, 131.0).ui_changed);
    }

    #[test]
    fn confirm_only_while_adjusting() {
        let mut rig = Rig::new();
        assert!(rig.machine.confirm(&rig.model).is_noop());

        rig.model.set_adjustable(SquareRect::new(10.0, 10.0, 50.0));
        rig.machine.mode = InteractionMode::AdjustingGrid;
        let t = rig.run(|m, _| m.confirm(&OverlayModel::new()));
        assert!(t.is_noop());

        let model = rig.model.clone();
        let t = rig.run(|m, _| m.confirm(&model));
        assert_eq!(t.notices[0].level, NoticeLevel::Success);
        assert_eq!(rig.model.confirmed, Some(SquareRect::new(10.0, 10.0, 50.0)));
        assert_eq!(rig.machine.mode(), InteractionMode::Idle);
    }

    #[test]
    fn cancel_keeps_confirmed() {
        let mut rig = Rig::new();
        rig.model.confirmed = Some(SquareRect::new(1.0, 1.0, 20.0));
        rig.model.set_adjustable(SquareRect::new(10.0, 10.0, 50.0));
        rig.machine.mode = InteractionMode::DraggingHandle(HandleRole::Tm);
        rig.run(|m, _| m.cancel_grid());
        assert_eq!(rig.machine.mode(), InteractionMode::Idle);
        assert_eq!(rig.model.adjustable(), None);
        assert_eq!(rig.model.confirmed, Some(SquareRect::new(1.0, 1.0, 20.0)));
    }

    #[test]
    fn rescale_moves_drawing_anchor() {
        let mut machine = InteractionMachine::new();
        machine.mode = InteractionMode::DrawingGrid {
            anchor: Point::new(100.0, 80.0),
            current: Point::new(140.0, 90.0),
        };
        machine.rescale(0.5);
        assert_eq!(
            machine.mode(),
            InteractionMode::DrawingGrid {
                anchor: Point::new(50.0, 40.0),
                current: Point::new(70.0, 45.0),
            }
        );
    }
}
