//! Toolbar and cursor state reported to the host.
//!
//! Rebuilt from a [`UiInputs`] snapshot after every state change. The host
//! applies it verbatim: toggle classes and titles, canvas cursor classes,
//! confirm-button visibility, handle squares, and the face prompt.

use crate::interaction::Hover;
use serde::Serialize;
use sk_core::{CanvasSize, DetectorKind, DetectorStatus, Handle, InteractionMode, OverlayModel};

/// Why a toggle cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisabledReason {
    NoImage,
    NotReady,
    Unavailable,
    GridDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleState {
    pub active: bool,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DisabledReason>,
    pub title: String,
}

impl ToggleState {
    fn enabled(active: bool, title: impl Into<String>) -> Self {
        Self {
            active,
            enabled: true,
            reason: None,
            title: title.into(),
        }
    }

    fn disabled(reason: DisabledReason, title: impl Into<String>) -> Self {
        Self {
            active: false,
            enabled: false,
            reason: Some(reason),
            title: title.into(),
        }
    }
}

/// Canvas cursor classes; several may apply at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CursorClass {
    #[serde(rename = "manual-grid-drawing")]
    GridDrawing,
    #[serde(rename = "manual-grid-adjusting")]
    GridAdjusting,
    #[serde(rename = "dragging-pose")]
    DraggingPose,
    #[serde(rename = "dragging-grid-handle")]
    DraggingHandle,
    #[serde(rename = "dragging-grid-square")]
    DraggingSquare,
    #[serde(rename = "point-hover")]
    PointHover,
    #[serde(rename = "handle-hover")]
    HandleHover,
    #[serde(rename = "square-hover")]
    SquareHover,
}

/// Everything [`UiState::build`] reads.
#[derive(Debug, Clone, Copy)]
pub struct UiInputs<'a> {
    pub image_loaded: bool,
    pub mode: InteractionMode,
    pub hover: Hover,
    pub show_face: bool,
    pub show_pose: bool,
    pub show_sketch: bool,
    pub face_status: DetectorStatus,
    pub pose_status: DetectorStatus,
    pub model: &'a OverlayModel,
    pub face_prompt: Option<usize>,
    pub canvas: CanvasSize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiState {
    pub face: ToggleState,
    pub pose: ToggleState,
    pub grid: ToggleState,
    pub sketch: ToggleState,
    pub cursor: Vec<CursorClass>,
    pub confirm_available: bool,
    /// Handle squares to draw, empty unless adjusting.
    pub handles: Vec<Handle>,
    pub handle_size: f32,
    /// Face count when the selection prompt is open.
    pub face_prompt: Option<usize>,
    pub mode: &'static str,
    pub canvas: CanvasSize,
}

impl UiState {
    pub fn build(inputs: &UiInputs<'_>, handle_size: f32) -> Self {
        let defining = inputs.mode.is_defining_grid();
        let adjusting = inputs.image_loaded && inputs.mode.is_adjusting();
        Self {
            face: detector_toggle(DetectorKind::Face, inputs, inputs.show_face, inputs.face_status),
            pose: detector_toggle(DetectorKind::Pose, inputs, inputs.show_pose, inputs.pose_status),
            grid: grid_toggle(inputs),
            sketch: sketch_toggle(inputs),
            cursor: cursor_classes(inputs),
            confirm_available: adjusting && inputs.model.adjustable().is_some(),
            handles: if adjusting {
                inputs.model.handles().to_vec()
            } else {
                Vec::new()
            },
            handle_size,
            face_prompt: inputs.face_prompt.filter(|_| !defining),
            mode: inputs.mode.name(),
            canvas: inputs.canvas,
        }
    }
}

fn detector_toggle(
    kind: DetectorKind,
    inputs: &UiInputs<'_>,
    show: bool,
    status: DetectorStatus,
) -> ToggleState {
    if !inputs.image_loaded {
        return ToggleState::disabled(DisabledReason::NoImage, "Load an image first");
    }
    if inputs.mode.is_defining_grid() {
        return ToggleState::disabled(
            DisabledReason::GridDefinition,
            "Disabled during grid definition",
        );
    }
    let label = kind.label();
    match status {
        DetectorStatus::Ready => {}
        DetectorStatus::Loading => {
            return ToggleState::disabled(
                DisabledReason::NotReady,
                format!("{label} Landmarker not ready"),
            );
        }
        DetectorStatus::Unavailable => {
            return ToggleState::disabled(
                DisabledReason::Unavailable,
                format!("{label} Landmarker unavailable"),
            );
        }
    }
    let title = match (kind, show) {
        (DetectorKind::Face, true) => "Hide Face Landmarks / Grid",
        (DetectorKind::Face, false) => "Show Face Landmarks / Grid",
        (DetectorKind::Pose, true) => "Hide Pose Landmarks",
        (DetectorKind::Pose, false) => "Show Pose Landmarks",
    };
    ToggleState::enabled(show, title)
}

fn grid_toggle(inputs: &UiInputs<'_>) -> ToggleState {
    if !inputs.image_loaded {
        return ToggleState::disabled(DisabledReason::NoImage, "Load an image first");
    }
    let model = inputs.model;
    let shown = model.show_confirmed && model.confirmed.is_some();
    let active = inputs.mode.is_defining_grid() || shown;
    let title = match inputs.mode {
        m if m.is_adjusting() => "Cancel Grid Adjustment",
        InteractionMode::DrawingGrid { .. } => "Cancel Grid Drawing",
        InteractionMode::GridArmed => "Cancel Manual Grid Mode",
        _ if model.confirmed.is_some() && model.show_confirmed => "Hide Confirmed Grid",
        _ if model.confirmed.is_some() => "Show Confirmed Grid",
        _ => "Manually Draw Grid Square",
    };
    ToggleState::enabled(active, title)
}

fn sketch_toggle(inputs: &UiInputs<'_>) -> ToggleState {
    if !inputs.image_loaded {
        return ToggleState::disabled(DisabledReason::NoImage, "Load an image first");
    }
    let title = if inputs.show_sketch {
        "Remove Pencil Sketch"
    } else {
        "Apply Pencil Sketch"
    };
    ToggleState::enabled(inputs.show_sketch, title)
}

fn cursor_classes(inputs: &UiInputs<'_>) -> Vec<CursorClass> {
    let mut classes = Vec::new();
    if !inputs.image_loaded {
        return classes;
    }
    match inputs.mode {
        InteractionMode::DrawingGrid { .. } => classes.push(CursorClass::GridDrawing),
        InteractionMode::AdjustingGrid => classes.push(CursorClass::GridAdjusting),
        InteractionMode::DraggingHandle(_) => {
            classes.push(CursorClass::GridAdjusting);
            classes.push(CursorClass::DraggingHandle);
        }
        InteractionMode::DraggingGridSquare { .. } => {
            classes.push(CursorClass::GridAdjusting);
            classes.push(CursorClass::DraggingSquare);
        }
        InteractionMode::DraggingPoint { .. } => classes.push(CursorClass::DraggingPose),
        InteractionMode::Idle | InteractionMode::GridArmed => {}
    }
    if !inputs.mode.is_dragging() {
        let hover = inputs.hover;
        if hover.over_point {
            classes.push(CursorClass::PointHover);
        }
        if hover.over_handle.is_some() {
            classes.push(CursorClass::HandleHover);
        } else if hover.over_square {
            classes.push(CursorClass::SquareHover);
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sk_core::{HandleRole, SquareRect};

    fn inputs(model: &OverlayModel) -> UiInputs<'_> {
        UiInputs {
            image_loaded: true,
            mode: InteractionMode::Idle,
            hover: Hover::default(),
            show_face: false,
            show_pose: false,
            show_sketch: false,
            face_status: DetectorStatus::Ready,
            pose_status: DetectorStatus::Loading,
            model,
            face_prompt: None,
            canvas: CanvasSize::new(400.0, 300.0),
        }
    }

    #[test]
    fn no_image_disables_everything() {
        let model = OverlayModel::new();
        let mut i = inputs(&model);
        i.image_loaded = false;
        let ui = UiState::build(&i, 10.0);
        for t in [&ui.face, &ui.pose, &ui.grid, &ui.sketch] {
            assert!(!t.enabled);
            assert_eq!(t.reason, Some(DisabledReason::NoImage));
            assert_eq!(t.title, "Load an image first");
        }
        assert!(ui.cursor.is_empty());
    }

    #[test]
    fn detector_titles() {
        let model = OverlayModel::new();
        let mut i = inputs(&model);
        i.show_face = true;
        let ui = UiState::build(&i, 10.0);
        assert_eq!(ui.face, ToggleState::enabled(true, "Hide Face Landmarks / Grid"));
        assert_eq!(
            ui.pose,
            ToggleState::disabled(DisabledReason::NotReady, "Pose Landmarker not ready")
        );

        i.mode = InteractionMode::GridArmed;
        let ui = UiState::build(&i, 10.0);
        assert_eq!(ui.face.title, "Disabled during grid definition");
        assert!(!ui.face.active);
        assert_eq!(ui.grid.title, "Cancel Manual Grid Mode");
        assert!(ui.grid.active);
    }

    #[test]
    fn grid_titles_follow_confirmed_state() {
        let mut model = OverlayModel::new();
        assert_eq!(
            UiState::build(&inputs(&model), 10.0).grid.title,
            "Manually Draw Grid Square"
        );
        model.confirmed = Some(SquareRect::new(0.0, 0.0, 20.0));
        let ui = UiState::build(&inputs(&model), 10.0);
        assert_eq!(ui.grid, ToggleState::enabled(false, "Show Confirmed Grid"));
        model.show_confirmed = true;
        let ui = UiState::build(&inputs(&model), 10.0);
        assert_eq!(ui.grid, ToggleState::enabled(true, "Hide Confirmed Grid"));
    }

    #[test]
    fn adjusting_exposes_handles_and_confirm() {
        let mut model = OverlayModel::new();
        model.set_adjustable(SquareRect::new(10.0, 10.0, 40.0));
        let mut i = inputs(&model);
        i.mode = InteractionMode::DraggingHandle(HandleRole::Tr);
        i.hover.over_handle = Some(HandleRole::Tr);
        let ui = UiState::build(&i, 10.0);
        assert!(ui.confirm_available);
        assert_eq!(ui.handles.len(), 8);
        assert_eq!(ui.grid.title, "Cancel Grid Adjustment");
        assert_eq!(
            ui.cursor,
            vec![CursorClass::GridAdjusting, CursorClass::DraggingHandle]
        );
    }

    #[test]
    fn cursor_classes_serialize_to_css_names() {
        let json = serde_json::to_string(&[CursorClass::GridDrawing, CursorClass::SquareHover])
            .unwrap();
        assert_eq!(json, r#"["manual-grid-drawing","square-hover"]"#);
    }
}
