//! Landmark detection capability.
//!
//! Detection itself lives outside the engine. The host runs a detector and
//! reports the result back against the [`DetectionTicket`] it was given;
//! in-process detectors implement [`LandmarkDetector`].

use crate::error::DetectionError;
use crate::model::Detections;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Face,
    Pose,
}

impl DetectorKind {
    pub fn label(&self) -> &'static str {
        match self {
            DetectorKind::Face => "Face",
            DetectorKind::Pose => "Pose",
        }
    }
}

/// Readiness of one detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorStatus {
    #[default]
    Loading,
    Ready,
    /// Model asset could not be obtained; the overlay stays disabled.
    Unavailable,
}

impl DetectorStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, DetectorStatus::Ready)
    }
}

/// Synchronous detector over a decoded image.
///
/// Returns normalized landmarks; zero subjects is a valid result.
pub trait LandmarkDetector {
    fn kind(&self) -> DetectorKind;
    fn detect(&mut self, image: &RgbaImage) -> Result<Detections, DetectionError>;
}

/// Handle for one outstanding detection request.
///
/// Results are applied only while `generation` matches the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionTicket {
    pub kind: DetectorKind,
    pub generation: u64,
}
