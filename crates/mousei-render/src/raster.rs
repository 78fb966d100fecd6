//! Software canvas backed by an RGBA32F image

use crate::canvas::Canvas2d;
use image::{DynamicImage, ImageFormat, Rgba, Rgba32FImage};
use mousei_core::{Color, MouseiError, Result, SurfaceSize, Vec2};
use mousei_particles::BlendMode;
use std::path::Path;

/// Glow strength relative to the petal's own alpha
const GLOW_INTENSITY: f32 = 0.35;

/// CPU rasterizer implementing [`Canvas2d`].
///
/// Pixels are straight (non-premultiplied) RGBA in [0, 1]. `Lighter` adds
/// `src × alpha` to the destination and saturates at 1; `Normal` is
/// source-over.
pub struct RasterCanvas {
    image: Rgba32FImage,
    background: Color,
    blend: BlendMode,
}

impl RasterCanvas {
    /// Create a canvas filled with an opaque `background`
    pub fn new(size: SurfaceSize, background: Color) -> Self {
        let background = background.with_alpha(1.0);
        Self {
            image: Rgba32FImage::from_pixel(size.width, size.height, Rgba(background.to_array())),
            background,
            blend: BlendMode::Normal,
        }
    }

    pub fn image(&self) -> &Rgba32FImage {
        &self.image
    }

    /// Color at a pixel, or `None` outside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image
            .get_pixel_checked(x, y)
            .map(|Rgba([r, g, b, a])| Color::new(*r, *g, *b, *a))
    }

    /// Write the current frame to a PNG file (8 bits per channel)
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let rgba8 = DynamicImage::ImageRgba32F(self.image.clone()).to_rgba8();
        rgba8
            .save_with_format(path.as_ref(), ImageFormat::Png)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => MouseiError::IoError(io),
                other => MouseiError::RenderError(format!(
                    "failed to write {}: {other}",
                    path.as_ref().display()
                )),
            })
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        let Some(px) = self.image.get_pixel_mut_checked(x, y) else {
            return;
        };
        let [r, g, b, a] = &mut px.0;
        match self.blend {
            BlendMode::Normal => {
                let keep = 1.0 - alpha;
                *r = color.r * alpha + *r * keep;
                *g = color.g * alpha + *g * keep;
                *b = color.b * alpha + *b * keep;
                *a = alpha + *a * keep;
            }
            BlendMode::Lighter => {
                *r = (*r + color.r * alpha).min(1.0);
                *g = (*g + color.g * alpha).min(1.0);
                *b = (*b + color.b * alpha).min(1.0);
                *a = (*a + alpha).min(1.0);
            }
        }
    }

    /// Pixel range covering `center ± reach`, clamped to the surface
    fn bounds(&self, center: Vec2, reach: f32) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = (self.image.width() as f32, self.image.height() as f32);
        let x0 = (center.x - reach).floor().max(0.0);
        let y0 = (center.y - reach).floor().max(0.0);
        let x1 = (center.x + reach).ceil().min(w);
        let y1 = (center.y + reach).ceil().min(h);
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Distance from a point in petal-local space to the petal outline, 0 inside.
///
/// The petal is bounded by two quadratic curves from tip (0, -s) to tip
/// (0, s) with control points (±s, 0); its half-width at height y is
/// `s/2 × (1 − (y/s)²)`.
fn petal_distance(local: Vec2, size: f32) -> f32 {
    if size <= 0.0 {
        return f32::INFINITY;
    }
    let v = local.y / size;
    if v.abs() <= 1.0 {
        let half_width = size / 2.0 * (1.0 - v * v);
        (local.x.abs() - half_width).max(0.0)
    } else {
        let tip = Vec2::new(0.0, size.copysign(local.y));
        local.distance(tip)
    }
}

impl Canvas2d for RasterCanvas {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.image.width(), self.image.height())
    }

    /// Keeps the overlapping region and fills new area with the background
    fn resize(&mut self, size: SurfaceSize) {
        if self.size() == size {
            return;
        }
        let mut resized =
            Rgba32FImage::from_pixel(size.width, size.height, Rgba(self.background.to_array()));
        let w = size.width.min(self.image.width());
        let h = size.height.min(self.image.height());
        for y in 0..h {
            for x in 0..w {
                resized.put_pixel(x, y, *self.image.get_pixel(x, y));
            }
        }
        self.image = resized;
    }

    fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    fn fill_surface(&mut self, color: Color) {
        let (w, h) = self.image.dimensions();
        for y in 0..h {
            for x in 0..w {
                self.blend_pixel(x, y, color, color.a);
            }
        }
    }

    fn fill_petal(&mut self, center: Vec2, size: f32, rotation: f32, color: Color, glow: f32) {
        if !(size > 0.0) || !center.is_finite() {
            return;
        }
        let glow = glow.max(0.0);
        let Some((x0, y0, x1, y1)) = self.bounds(center, size + glow) else {
            return;
        };
        let (sin, cos) = rotation.sin_cos();
        let sigma = glow / 2.0;

        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5 - center.x, y as f32 + 0.5 - center.y);
                // Rotate into petal space
                let local = Vec2::new(d.x * cos + d.y * sin, -d.x * sin + d.y * cos);
                let dist = petal_distance(local, size);
                if dist <= 0.0 {
                    self.blend_pixel(x, y, color, color.a);
                } else if sigma > 0.0 && dist < glow {
                    let falloff = (-(dist * dist) / (2.0 * sigma * sigma)).exp();
                    self.blend_pixel(x, y, color, color.a * GLOW_INTENSITY * falloff);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if !(radius > 0.0) || !center.is_finite() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.bounds(center, radius) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if p.distance(center) <= radius {
                    self.blend_pixel(x, y, color, color.a);
                }
            }
        }
    }
}
