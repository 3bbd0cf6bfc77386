//! Overlay mutations.
//!
//! Interaction transitions and UI actions describe their effect on the
//! overlay model as `OverlayMutation`s; the session applies them in order.

use sk_core::{CanvasSize, Detections, OverlayModel, Point, SquareRect};

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayMutation {
    /// Replace the adjustable square (handles follow).
    SetAdjustable(SquareRect),
    ClearAdjustable,
    /// Adjustable → confirmed, confirmed shown.
    ConfirmAdjustable,
    /// Drop both squares.
    ClearGrid,
    SetConfirmedVisible(bool),
    MovePosePoint {
        subject: usize,
        point: usize,
        pos: Point,
    },
    SetFaceDetections(Detections),
    ClearFaces,
    SelectFace(Option<usize>),
    /// New pose results; draggable points derived at `canvas`.
    SetPoseDetections {
        raw: Detections,
        canvas: CanvasSize,
    },
    /// Re-derive draggable points from the retained raw detections.
    RestorePoses {
        canvas: CanvasSize,
    },
    ClearPoses,
    Rescale(f32),
    ClearAll,
}

/// Apply one mutation. Returns `false` when it was a guarded no-op.
pub fn apply_mutation(model: &mut OverlayModel, mutation: &OverlayMutation) -> bool {
    match mutation {
        OverlayMutation::SetAdjustable(rect) => {
            model.set_adjustable(*rect);
            true
        }
        OverlayMutation::ClearAdjustable => {
            model.clear_adjustable();
            true
        }
        OverlayMutation::ConfirmAdjustable => model.confirm_adjustable(),
        OverlayMutation::ClearGrid => {
            model.clear_grid();
            true
        }
        OverlayMutation::SetConfirmedVisible(visible) => {
            if model.confirmed.is_none() {
                return false;
            }
            model.show_confirmed = *visible;
            true
        }
        OverlayMutation::MovePosePoint {
            subject,
            point,
            pos,
        } => model.set_pose_point(*subject, *point, *pos),
        OverlayMutation::SetFaceDetections(detections) => {
            model.selected_face = (detections.len() == 1).then_some(0);
            model.faces = Some(detections.clone());
            true
        }
        OverlayMutation::ClearFaces => {
            model.clear_faces();
            true
        }
        OverlayMutation::SelectFace(index) => match index {
            Some(i) if *i >= model.face_count() => false,
            _ => {
                model.selected_face = *index;
                true
            }
        },
        OverlayMutation::SetPoseDetections { raw, canvas } => {
            model.pose_raw = Some(raw.clone());
            model.derive_poses(*canvas);
            true
        }
        OverlayMutation::RestorePoses { canvas } => {
            if model.pose_raw.is_none() {
                return false;
            }
            model.derive_poses(*canvas);
            true
        }
        OverlayMutation::ClearPoses => {
            model.clear_poses();
            true
        }
        OverlayMutation::Rescale(factor) => {
            model.rescale(*factor);
            true
        }
        OverlayMutation::ClearAll => {
            model.clear();
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sk_core::{Landmark, Subject};

    fn faces(n: usize) -> Detections {
        Detections {
            subjects: (0..n)
                .map(|_| Subject {
                    points: vec![Landmark {
                        x: 0.5,
                        y: 0.5,
                        visibility: None,
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn single_face_is_auto_selected() {
        let mut model = OverlayModel::new();
        apply_mutation(&mut model, &OverlayMutation::SetFaceDetections(faces(1)));
        assert_eq!(model.selected_face, Some(0));

        apply_mutation(&mut model, &OverlayMutation::SetFaceDetections(faces(3)));
        assert_eq!(model.selected_face, None);
    }

    #[test]
    fn select_out_of_range_is_noop() {
        let mut model = OverlayModel::new();
        apply_mutation(&mut model, &OverlayMutation::SetFaceDetections(faces(2)));
        assert!(!apply_mutation(&mut model, &OverlayMutation::SelectFace(Some(2))));
        assert_eq!(model.selected_face, None);
        assert!(apply_mutation(&mut model, &OverlayMutation::SelectFace(Some(1))));
        assert_eq!(model.selected_face, Some(1));
    }

    #[test]
    fn confirm_without_rect_is_noop() {
        let mut model = OverlayModel::new();
        assert!(!apply_mutation(&mut model, &OverlayMutation::ConfirmAdjustable));
        assert_eq!(model.confirmed, None);
        assert!(!apply_mutation(&mut model, &OverlayMutation::SetConfirmedVisible(true)));
        assert!(!model.show_confirmed);
    }

    #[test]
    fn restore_needs_raw_poses() {
        let mut model = OverlayModel::new();
        let canvas = CanvasSize::new(200.0, 100.0);
        assert!(!apply_mutation(&mut model, &OverlayMutation::RestorePoses { canvas }));

        apply_mutation(
            &mut model,
            &OverlayMutation::SetPoseDetections {
                raw: faces(1),
                canvas,
            },
        );
        model.poses.clear();
        assert!(apply_mutation(&mut model, &OverlayMutation::RestorePoses { canvas }));
        assert_eq!(model.pose_point(0, 0), Some(Point::new(100.0, 50.0)));
    }
}
