//! Fit transform and resize scaling.
//!
//! The canvas is always the image scaled uniformly to fit ("contain") inside
//! its container, centered. Because the fit preserves aspect ratio, a resize
//! rescales every overlay coordinate by one scalar.

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

/// Rendered canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Integer pixel dimensions of the backing buffer.
    pub fn pixel_dims(&self) -> (u32, u32) {
        (
            self.width.max(0.0).round() as u32,
            self.height.max(0.0).round() as u32,
        )
    }
}

/// Result of fitting an image into a container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fit {
    pub scale: f32,
    pub rendered: CanvasSize,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Uniformly scale `natural` into `container` without cropping and center it.
///
/// # Errors
/// Returns an error when any dimension is `<= 0` or any value is non-finite;
/// callers must leave the canvas untouched in that case.
pub fn fit_image_to_container(
    natural_w: f32,
    natural_h: f32,
    container_w: f32,
    container_h: f32,
) -> Result<Fit, GeometryError> {
    let dims = [natural_w, natural_h, container_w, container_h];
    if dims.iter().any(|d| !d.is_finite()) {
        return Err(GeometryError::NonFinite);
    }
    if dims.iter().any(|d| *d <= 0.0) {
        return Err(GeometryError::NonPositive {
            natural_w,
            natural_h,
            container_w,
            container_h,
        });
    }

    let scale = (container_w / natural_w).min(container_h / natural_h);
    let rendered = CanvasSize::new(natural_w * scale, natural_h * scale);
    let offset_x = (container_w - rendered.width) / 2.0;
    let offset_y = (container_h - rendered.height) / 2.0;

    if ![scale, rendered.width, rendered.height, offset_x, offset_y]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(GeometryError::NonFinite);
    }

    Ok(Fit {
        scale,
        rendered,
        offset_x,
        offset_y,
    })
}

/// Scalar to apply to overlay geometry when the canvas goes from `old` to `new`.
///
/// Returns `None` when there is no prior canvas, no new canvas, or the ratio
/// is within `epsilon` of 1 (sub-pixel jitter).
pub fn rescale_factor(old: CanvasSize, new: CanvasSize, epsilon: f32) -> Option<f32> {
    if old.width <= 0.0 || new.width <= 0.0 {
        return None;
    }
    let factor = new.width / old.width;
    if (factor - 1.0).abs() <= epsilon {
        return None;
    }

    // Width ratio stands in for height ratio; the fit transform guarantees they agree.
    if old.height > 0.0 && new.height > 0.0 {
        let height_factor = new.height / old.height;
        let drift = (height_factor - factor).abs() / factor;
        if drift > 1e-3 {
            log::warn!(
                "rescale: width ratio {factor} disagrees with height ratio {height_factor}"
            );
        }
        debug_assert!(
            drift <= 1e-2,
            "aspect ratio not preserved across resize: {factor} vs {height_factor}"
        );
    }

    Some(factor)
}
