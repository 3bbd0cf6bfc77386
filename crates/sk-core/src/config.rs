//! Engine configuration.
//!
//! Every field has a default, so a partial JSON object (or none at all) is a
//! valid configuration.

use serde::{Deserialize, Serialize};

/// Cache key plus remote location for one detector model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAsset {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smallest grid square side, in canvas pixels.
    pub min_grid_size: f32,
    /// Drawn radius of a pose point.
    pub point_radius: f32,
    pub point_hit_radius: f32,
    /// Drawn side of a grid handle.
    pub handle_size: f32,
    pub handle_hit_radius: f32,
    /// Resize ratios within this distance of 1 are ignored.
    pub rescale_epsilon: f32,
    pub resize_debounce_ms: f64,
    pub sketch_blur_sigma: f32,
    /// Pose indices below this duplicate face landmarks and are neither drawn nor draggable.
    pub first_draggable_pose_point: usize,
    pub face_model: ModelAsset,
    pub pose_model: ModelAsset,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_grid_size: 10.0,
            point_radius: 5.0,
            point_hit_radius: 7.5,
            handle_size: 10.0,
            handle_hit_radius: 15.0,
            rescale_epsilon: 1e-4,
            resize_debounce_ms: 150.0,
            sketch_blur_sigma: 2.0,
            first_draggable_pose_point: 11,
            face_model: ModelAsset {
                key: "faceLandmarker_v1".into(),
                url: "https://storage.googleapis.com/mediapipe-models/face_landmarker/face_landmarker/float16/1/face_landmarker.task".into(),
            },
            pose_model: ModelAsset {
                key: "poseLandmarkerHeavy_v1".into(),
                url: "https://storage.googleapis.com/mediapipe-models/pose_landmarker/pose_landmarker_heavy/float16/1/pose_landmarker_heavy.task".into(),
            },
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_draggable_pose_index(&self, index: usize) -> bool {
        index >= self.first_draggable_pose_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(r#"{"min_grid_size": 24, "handle_hit_radius": 9}"#).unwrap();
        assert_eq!(cfg.min_grid_size, 24.0);
        assert_eq!(cfg.handle_hit_radius, 9.0);
        assert_eq!(cfg.point_hit_radius, 7.5);
        assert_eq!(cfg.face_model.key, "faceLandmarker_v1");
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn face_indices_are_not_draggable() {
        let cfg = EngineConfig::default();
        assert!(!cfg.is_draggable_pose_index(0));
        assert!(!cfg.is_draggable_pose_index(10));
        assert!(cfg.is_draggable_pose_index(11));
    }
}
