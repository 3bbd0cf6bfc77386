//! Recording surface.
//!
//! Captures every primitive as a [`DrawCmd`] instead of rasterizing. Used
//! for headless rendering and for asserting on composite output.

use crate::sketch::FilterError;
use crate::surface::{DrawSurface, Rgba, StrokeStyle};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use sk_core::{CanvasSize, Point, SquareRect};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear,
    BaseImage,
    Pixels { width: u32, height: u32 },
    Line { from: Point, to: Point, style: StrokeStyle },
    Rect { rect: SquareRect, style: StrokeStyle },
    FillCircle { center: Point, radius: f32, color: Rgba },
    StrokeCircle { center: Point, radius: f32, style: StrokeStyle },
}

#[derive(Debug, Default)]
pub struct DisplayList {
    size: CanvasSize,
    base: Option<RgbaImage>,
    pixels_readable: bool,
    pub commands: Vec<DrawCmd>,
}

impl DisplayList {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            base: None,
            pixels_readable: true,
            commands: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: RgbaImage) -> Self {
        self.base = Some(base);
        self
    }

    pub fn resize(&mut self, size: CanvasSize) {
        self.size = size;
    }

    /// Simulate a tainted source whose pixels cannot be read back.
    pub fn set_pixels_readable(&mut self, readable: bool) {
        self.pixels_readable = readable;
    }

    pub fn take(&mut self) -> Vec<DrawCmd> {
        std::mem::take(&mut self.commands)
    }

    pub fn lines(&self) -> impl Iterator<Item = (&Point, &Point, &StrokeStyle)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCmd::Line { from, to, style } => Some((from, to, style)),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = (&SquareRect, &StrokeStyle)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCmd::Rect { rect, style } => Some((rect, style)),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (&Point, &Rgba)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCmd::FillCircle { center, color, .. } => Some((center, color)),
            _ => None,
        })
    }
}

impl DrawSurface for DisplayList {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCmd::Clear);
    }

    fn draw_base_image(&mut self) {
        if self.base.is_some() {
            self.commands.push(DrawCmd::BaseImage);
        }
    }

    fn base_pixels(&mut self) -> Result<RgbaImage, FilterError> {
        if !self.pixels_readable {
            return Err(FilterError::PixelsUnavailable("source is not readable".into()));
        }
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| FilterError::PixelsUnavailable("no image loaded".into()))?;
        let (w, h) = self.size.pixel_dims();
        if w == 0 || h == 0 {
            return Err(FilterError::Empty);
        }
        if base.dimensions() == (w, h) {
            return Ok(base.clone());
        }
        Ok(imageops::resize(base, w, h, FilterType::Triangle))
    }

    fn draw_pixels(&mut self, pixels: &RgbaImage) {
        self.commands.push(DrawCmd::Pixels {
            width: pixels.width(),
            height: pixels.height(),
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        self.commands.push(DrawCmd::Line {
            from,
            to,
            style: *style,
        });
    }

    fn stroke_rect(&mut self, rect: SquareRect, style: &StrokeStyle) {
        self.commands.push(DrawCmd::Rect {
            rect,
            style: *style,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.commands.push(DrawCmd::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, style: &StrokeStyle) {
        self.commands.push(DrawCmd::StrokeCircle {
            center,
            radius,
            style: *style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba as Px;

    #[test]
    fn base_pixels_match_surface_size() {
        let mut list = DisplayList::new(CanvasSize::new(40.0, 30.0))
            .with_base(RgbaImage::from_pixel(80, 60, Px([10, 20, 30, 255])));
        let px = list.base_pixels().unwrap();
        assert_eq!(px.dimensions(), (40, 30));
        assert_eq!(px.get_pixel(5, 5).0, [10, 20, 30, 255]);
    }

    #[test]
    fn unreadable_source_fails() {
        let mut list = DisplayList::new(CanvasSize::new(4.0, 4.0))
            .with_base(RgbaImage::new(4, 4));
        list.set_pixels_readable(false);
        assert!(matches!(
            list.base_pixels(),
            Err(FilterError::PixelsUnavailable(_))
        ));
    }

    #[test]
    fn clear_resets_recording() {
        let mut list = DisplayList::new(CanvasSize::new(10.0, 10.0));
        list.fill_circle(Point::new(1.0, 1.0), 2.0, Rgba::rgb(255, 0, 0));
        list.clear();
        assert_eq!(list.commands, vec![DrawCmd::Clear]);
    }
}
