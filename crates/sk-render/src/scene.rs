//! Vello scene surface.
//!
//! Encodes composite output into a `vello::Scene` for GPU presentation.
//! The caller owns the device/surface and renders [`SceneSurface::scene`].

use crate::sketch::FilterError;
use crate::surface::{DrawSurface, Rgba, StrokeStyle};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use kurbo::{Affine, Circle, Line, Rect, Stroke as KurboStroke};
use peniko::{Blob, Color, Fill, Image, ImageFormat};
use sk_core::{CanvasSize, Point, SquareRect};
use vello::Scene;

pub struct SceneSurface {
    scene: Scene,
    size: CanvasSize,
    base: Option<RgbaImage>,
    base_image: Option<Image>,
}

impl SceneSurface {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            scene: Scene::new(),
            size,
            base: None,
            base_image: None,
        }
    }

    pub fn set_base(&mut self, base: RgbaImage) {
        self.base_image = Some(to_peniko(&base));
        self.base = Some(base);
    }

    pub fn resize(&mut self, size: CanvasSize) {
        self.size = size;
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

fn to_peniko(pixels: &RgbaImage) -> Image {
    Image::new(
        Blob::from(pixels.as_raw().clone()),
        ImageFormat::Rgba8,
        pixels.width(),
        pixels.height(),
    )
}

fn to_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn to_kurbo_stroke(style: &StrokeStyle) -> KurboStroke {
    let stroke = KurboStroke::new(style.width as f64);
    match style.dash {
        Some([dash, gap]) => stroke.with_dashes(0.0, [dash as f64, gap as f64]),
        None => stroke,
    }
}

fn kp(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x as f64, p.y as f64)
}

impl DrawSurface for SceneSurface {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn clear(&mut self) {
        self.scene.reset();
    }

    fn draw_base_image(&mut self) {
        let Some(img) = &self.base_image else {
            return;
        };
        if img.width == 0 || img.height == 0 {
            return;
        }
        let sx = self.size.width as f64 / img.width as f64;
        let sy = self.size.height as f64 / img.height as f64;
        self.scene.draw_image(img, Affine::scale_non_uniform(sx, sy));
    }

    fn base_pixels(&mut self) -> Result<RgbaImage, FilterError> {
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| FilterError::PixelsUnavailable("no image loaded".into()))?;
        let (w, h) = self.size.pixel_dims();
        if w == 0 || h == 0 {
            return Err(FilterError::Empty);
        }
        Ok(imageops::resize(base, w, h, FilterType::Triangle))
    }

    fn draw_pixels(&mut self, pixels: &RgbaImage) {
        self.scene.draw_image(&to_peniko(pixels), Affine::IDENTITY);
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        self.scene.stroke(
            &to_kurbo_stroke(style),
            Affine::IDENTITY,
            to_color(style.color),
            None,
            &Line::new(kp(from), kp(to)),
        );
    }

    fn stroke_rect(&mut self, rect: SquareRect, style: &StrokeStyle) {
        let shape = Rect::new(
            rect.x as f64,
            rect.y as f64,
            rect.right() as f64,
            rect.bottom() as f64,
        );
        self.scene.stroke(
            &to_kurbo_stroke(style),
            Affine::IDENTITY,
            to_color(style.color),
            None,
            &shape,
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            to_color(color),
            None,
            &Circle::new(kp(center), radius as f64),
        );
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, style: &StrokeStyle) {
        self.scene.stroke(
            &to_kurbo_stroke(style),
            Affine::IDENTITY,
            to_color(style.color),
            None,
            &Circle::new(kp(center), radius as f64),
        );
    }
}
