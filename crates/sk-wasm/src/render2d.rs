//! Canvas2D draw surface.
//!
//! Draws composited frames straight onto the page's `<canvas>` through
//! `CanvasRenderingContext2d`. Pixel reads go through `getImageData`, which
//! fails on a canvas tainted by a cross-origin image.

use image::RgbaImage;
use sk_core::{CanvasSize, Point, SquareRect};
use sk_render::{DrawSurface, FilterError, Rgba, StrokeStyle};
use std::f64::consts::TAU;
use wasm_bindgen::{Clamped, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, ImageData};

pub struct Canvas2dSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    image: Option<&'a HtmlImageElement>,
    size: CanvasSize,
}

impl<'a> Canvas2dSurface<'a> {
    pub fn new(
        ctx: &'a CanvasRenderingContext2d,
        image: Option<&'a HtmlImageElement>,
        size: CanvasSize,
    ) -> Self {
        Self { ctx, image, size }
    }

    fn apply_stroke(&self, style: &StrokeStyle) {
        self.ctx.set_stroke_style_str(&style.color.to_css());
        self.ctx.set_line_width(style.width as f64);
        let dash = js_sys::Array::new();
        if let Some([on, off]) = style.dash {
            dash.push(&JsValue::from_f64(on as f64));
            dash.push(&JsValue::from_f64(off as f64));
        }
        // An empty array restores solid lines.
        if let Err(e) = self.ctx.set_line_dash(&dash) {
            log::trace!("setLineDash rejected: {e:?}");
        }
    }
}

fn js_reason(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            js_sys::Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

impl DrawSurface for Canvas2dSurface<'_> {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.size.width as f64,
            self.size.height as f64,
        );
    }

    fn draw_base_image(&mut self) {
        let Some(img) = self.image else {
            return;
        };
        if let Err(e) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img,
            0.0,
            0.0,
            self.size.width as f64,
            self.size.height as f64,
        ) {
            log::warn!("drawImage failed: {}", js_reason(&e));
        }
    }

    fn base_pixels(&mut self) -> Result<RgbaImage, FilterError> {
        let (w, h) = self.size.pixel_dims();
        if w == 0 || h == 0 {
            return Err(FilterError::Empty);
        }
        if self.image.is_none() {
            return Err(FilterError::PixelsUnavailable("no image loaded".into()));
        }
        self.draw_base_image();
        let data = self
            .ctx
            .get_image_data(0.0, 0.0, w as f64, h as f64)
            .map_err(|e| FilterError::PixelsUnavailable(js_reason(&e)))?;
        let Clamped(bytes) = data.data();
        RgbaImage::from_raw(data.width(), data.height(), bytes)
            .ok_or_else(|| FilterError::PixelsUnavailable("short pixel buffer".into()))
    }

    fn draw_pixels(&mut self, pixels: &RgbaImage) {
        let data = match ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(pixels.as_raw().as_slice()),
            pixels.width(),
            pixels.height(),
        ) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("ImageData construction failed: {}", js_reason(&e));
                return;
            }
        };
        if let Err(e) = self.ctx.put_image_data(&data, 0.0, 0.0) {
            log::warn!("putImageData failed: {}", js_reason(&e));
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        self.apply_stroke(style);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn stroke_rect(&mut self, rect: SquareRect, style: &StrokeStyle) {
        self.apply_stroke(style);
        self.ctx.stroke_rect(
            rect.x as f64,
            rect.y as f64,
            rect.size as f64,
            rect.size as f64,
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, style: &StrokeStyle) {
        self.apply_stroke(style);
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .is_ok()
        {
            self.ctx.stroke();
        }
    }
}
