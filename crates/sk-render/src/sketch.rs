//! Pencil-sketch filter.
//!
//! Four pure stages over an RGBA buffer: grayscale, invert, separable
//! Gaussian blur, color-dodge blend of the grayscale base with the blurred
//! inverse. The result is cached per (image generation, pixel size).

use image::{Rgba, RgbaImage};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("image has no pixels")]
    Empty,

    #[error("buffer size mismatch: {base_w}x{base_h} vs {blend_w}x{blend_h}")]
    DimensionMismatch {
        base_w: u32,
        base_h: u32,
        blend_w: u32,
        blend_h: u32,
    },

    #[error("pixel data unavailable: {0}")]
    PixelsUnavailable(String),
}

// ─── Stages ──────────────────────────────────────────────────────────────

/// Luminance-weighted gray, alpha kept.
pub fn grayscale(src: &RgbaImage) -> RgbaImage {
    let mut out = src.clone();
    for px in out.pixels_mut() {
        let [r, g, b, a] = px.0;
        let l = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
            .round()
            .clamp(0.0, 255.0) as u8;
        *px = Rgba([l, l, l, a]);
    }
    out
}

/// `255 - c` per color channel, alpha kept.
pub fn invert(src: &RgbaImage) -> RgbaImage {
    let mut out = src.clone();
    for px in out.pixels_mut() {
        let [r, g, b, a] = px.0;
        *px = Rgba([255 - r, 255 - g, 255 - b, a]);
    }
    out
}

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil().max(0.0) as usize;
    if radius == 0 {
        return vec![1.0];
    }
    let s2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..radius * 2 + 1)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / s2).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian blur, truncated at 3σ, edges clamped.
pub fn gaussian_blur(src: &RgbaImage, sigma: f32) -> RgbaImage {
    let (w, h) = (src.width() as usize, src.height() as usize);
    if w == 0 || h == 0 || sigma.is_nan() || sigma <= 0.0 {
        return src.clone();
    }

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let input: Vec<f32> = src.as_raw().iter().map(|&b| b as f32).collect();

    let mut horizontal = vec![0.0f32; input.len()];
    for y in 0..h {
        let row = y * w * 4;
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (k, &kv) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - radius).clamp(0, w as isize - 1) as usize;
                let idx = row + sx * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += input[idx + c] * kv;
                }
            }
            horizontal[row + x * 4..row + x * 4 + 4].copy_from_slice(&acc);
        }
    }

    let mut out = RgbaImage::new(w as u32, h as u32);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let (x, y) = (x as usize, y as usize);
        let mut acc = [0.0f32; 4];
        for (k, &kv) in kernel.iter().enumerate() {
            let sy = (y as isize + k as isize - radius).clamp(0, h as isize - 1) as usize;
            let idx = sy * w * 4 + x * 4;
            for (c, a) in acc.iter_mut().enumerate() {
                *a += horizontal[idx + c] * kv;
            }
        }
        *px = Rgba(acc.map(|v| v.round().clamp(0.0, 255.0) as u8));
    }
    out
}

/// Color-dodge `blend` onto `base`; alpha comes from `base`.
pub fn color_dodge(base: &RgbaImage, blend: &RgbaImage) -> Result<RgbaImage, FilterError> {
    if base.dimensions() != blend.dimensions() {
        return Err(FilterError::DimensionMismatch {
            base_w: base.width(),
            base_h: base.height(),
            blend_w: blend.width(),
            blend_h: blend.height(),
        });
    }

    let dodge = |b: u8, s: u8| -> u8 {
        if s == 255 {
            255
        } else {
            (b as f32 / (1.0 - s as f32 / 255.0)).round().min(255.0) as u8
        }
    };

    let mut out = base.clone();
    for (px, over) in out.pixels_mut().zip(blend.pixels()) {
        let [r, g, b, a] = px.0;
        let [sr, sg, sb, _] = over.0;
        *px = Rgba([dodge(r, sr), dodge(g, sg), dodge(b, sb), a]);
    }
    Ok(out)
}

/// Run all four stages.
pub fn pencil_sketch(src: &RgbaImage, sigma: f32) -> Result<RgbaImage, FilterError> {
    if src.width() == 0 || src.height() == 0 {
        return Err(FilterError::Empty);
    }
    let gray = grayscale(src);
    let blurred = gaussian_blur(&invert(&gray), sigma);
    color_dodge(&gray, &blurred)
}

// ─── Cache ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SketchKey {
    generation: u64,
    width: u32,
    height: u32,
}

/// Last sketch result, valid for one image generation at one pixel size.
#[derive(Debug, Default)]
pub struct SketchCache {
    entry: Option<(SketchKey, RgbaImage)>,
    computed: u64,
}

impl SketchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::debug!("sketch cache invalidated");
        }
    }

    pub fn is_valid_for(&self, generation: u64, dims: (u32, u32)) -> bool {
        self.entry.as_ref().is_some_and(|(k, _)| {
            *k == SketchKey {
                generation,
                width: dims.0,
                height: dims.1,
            }
        })
    }

    /// Number of times the filter actually ran.
    pub fn computations(&self) -> u64 {
        self.computed
    }

    /// Cached pixels for the key, computing them on a miss.
    /// A failed computation leaves the cache empty.
    pub fn get_or_compute(
        &mut self,
        generation: u64,
        dims: (u32, u32),
        compute: impl FnOnce() -> Result<RgbaImage, FilterError>,
    ) -> Result<&RgbaImage, FilterError> {
        let key = SketchKey {
            generation,
            width: dims.0,
            height: dims.1,
        };
        if !self.is_valid_for(generation, dims) {
            self.entry = None;
            let pixels = compute()?;
            self.computed += 1;
            log::debug!("sketch computed for generation {generation} at {}x{}", dims.0, dims.1);
            self.entry = Some((key, pixels));
        }
        match &self.entry {
            Some((_, pixels)) => Ok(pixels),
            None => Err(FilterError::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([
                (x * 255 / w.max(1)) as u8,
                (y * 255 / h.max(1)) as u8,
                ((x + y) % 256) as u8,
                200,
            ])
        })
    }

    #[test]
    fn grayscale_weights() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([100, 150, 200, 77]));
        let g = grayscale(&img);
        // 29.9 + 88.05 + 22.8 = 140.75
        assert_eq!(g.get_pixel(0, 0).0, [141, 141, 141, 77]);
    }

    #[test]
    fn invert_keeps_alpha() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 100, 255, 9]));
        assert_eq!(invert(&img).get_pixel(0, 0).0, [255, 155, 0, 9]);
    }

    #[test]
    fn kernel_is_normalized_and_3_sigma_wide() {
        let k = gaussian_kernel(2.0);
        assert_eq!(k.len(), 13);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(k[6] > k[5] && k[5] > k[0]);
    }

    #[test]
    fn blur_preserves_flat_image() {
        let img = RgbaImage::from_pixel(7, 5, Rgba([90, 90, 90, 255]));
        assert_eq!(gaussian_blur(&img, 2.0), img);
    }

    #[test]
    fn blur_spreads_single_pixel() {
        let mut img = RgbaImage::from_pixel(9, 9, Rgba([0, 0, 0, 255]));
        img.put_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let out = gaussian_blur(&img, 2.0);
        assert!(out.get_pixel(4, 4).0[0] < 255);
        assert!(out.get_pixel(5, 4).0[0] > 0);
        assert_eq!(out.get_pixel(5, 4).0[0], out.get_pixel(3, 4).0[0]);
    }

    #[test]
    fn dodge_rules() {
        let base = RgbaImage::from_pixel(3, 1, Rgba([100, 100, 200, 50]));
        let mut blend = RgbaImage::new(3, 1);
        blend.put_pixel(0, 0, Rgba([255, 0, 128, 255]));
        blend.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        blend.put_pixel(2, 0, Rgba([128, 128, 128, 0]));
        let out = color_dodge(&base, &blend).unwrap();
        // 255 blend saturates; 0 blend is identity; 128 roughly doubles.
        assert_eq!(out.get_pixel(0, 0).0, [255, 100, 255, 50]);
        assert_eq!(out.get_pixel(1, 0).0, [100, 100, 200, 50]);
        assert_eq!(out.get_pixel(2, 0).0, [201, 201, 255, 50]);
    }

    #[test]
    fn dodge_rejects_mismatched_buffers() {
        let a = RgbaImage::new(2, 2);
        let b = RgbaImage::new(3, 2);
        assert!(matches!(
            color_dodge(&a, &b),
            Err(FilterError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn sketch_is_deterministic() {
        let img = gradient(32, 24);
        let a = pencil_sketch(&img, 2.0).unwrap();
        let b = pencil_sketch(&img, 2.0).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
        assert!(a.pixels().all(|p| p.0[3] == 200));
    }

    #[test]
    fn sketch_rejects_empty() {
        assert_eq!(pencil_sketch(&RgbaImage::new(0, 0), 2.0), Err(FilterError::Empty));
    }

    #[test]
    fn cache_recomputes_only_on_key_change() {
        let img = gradient(8, 8);
        let mut cache = SketchCache::new();
        let run = |c: &mut SketchCache, generation: u64, dims: (u32, u32)| {
            c.get_or_compute(generation, dims, || pencil_sketch(&img, 2.0))
                .map(|p| p.dimensions())
        };

        assert_eq!(run(&mut cache, 1, (8, 8)), Ok((8, 8)));
        assert_eq!(run(&mut cache, 1, (8, 8)), Ok((8, 8)));
        assert_eq!(cache.computations(), 1);

        run(&mut cache, 1, (4, 4)).unwrap();
        assert_eq!(cache.computations(), 2);
        run(&mut cache, 2, (4, 4)).unwrap();
        assert_eq!(cache.computations(), 3);

        cache.invalidate();
        assert!(!cache.is_valid_for(2, (4, 4)));
        run(&mut cache, 2, (4, 4)).unwrap();
        assert_eq!(cache.computations(), 4);
    }

    #[test]
    fn failed_compute_leaves_cache_empty() {
        let mut cache = SketchCache::new();
        let err = cache
            .get_or_compute(1, (2, 2), || Err(FilterError::PixelsUnavailable("tainted".into())))
            .unwrap_err();
        assert_eq!(err, FilterError::PixelsUnavailable("tainted".into()));
        assert!(!cache.is_valid_for(1, (2, 2)));
        assert_eq!(cache.computations(), 0);
    }
}
