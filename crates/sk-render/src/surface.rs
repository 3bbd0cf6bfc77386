//! Drawing surface abstraction.
//!
//! The compositor issues a small set of primitives against [`DrawSurface`].
//! Implementations: the recording [`crate::DisplayList`], the Vello
//! [`crate::SceneSurface`], and the browser Canvas2D surface.

use crate::sketch::FilterError;
use image::RgbaImage;
use sk_core::{CanvasSize, Point, SquareRect};

/// 8-bit straight-alpha color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `alpha` in `[0, 1]`.
    pub const fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: (alpha * 255.0 + 0.5) as u8,
        }
    }

    pub fn alpha_f32(&self) -> f32 {
        self.a as f32 / 255.0
    }

    /// CSS color string for Canvas2D.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.alpha_f32()
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f32,
    /// `[dash, gap]`, `None` for solid.
    pub dash: Option<[f32; 2]>,
}

impl StrokeStyle {
    pub const fn solid(color: Rgba, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub const fn dashed(color: Rgba, width: f32, dash: [f32; 2]) -> Self {
        Self {
            color,
            width,
            dash: Some(dash),
        }
    }
}

/// Target of one composite pass. Sized in canvas pixels.
pub trait DrawSurface {
    fn size(&self) -> CanvasSize;

    fn clear(&mut self);

    /// Draw the loaded image scaled to the surface.
    fn draw_base_image(&mut self);

    /// The loaded image rasterized at the surface's pixel size.
    fn base_pixels(&mut self) -> Result<RgbaImage, FilterError>;

    /// Blit a buffer already sized to the surface.
    fn draw_pixels(&mut self, pixels: &RgbaImage);

    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle);

    fn stroke_rect(&mut self, rect: SquareRect, style: &StrokeStyle);

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);

    fn stroke_circle(&mut self, center: Point, radius: f32, style: &StrokeStyle);
}
