//! 2D canvas renderer for glowing petal trails

use crate::renderer::{FrameOverlay, Renderer};
use mousei_core::{Color, SurfaceSize, Vec2};
use mousei_particles::{Appearance, BlendMode, ParticlePool, TrailConfig};

/// Radius of the white dot drawn under a hovering pointer, in pixels
pub const CURSOR_DOT_RADIUS: f32 = 3.0;

/// Minimal immediate-mode 2D drawing surface.
///
/// Coordinates are surface pixels. Every fill uses the color's alpha and the
/// blend mode last set with [`Canvas2d::set_blend`].
pub trait Canvas2d {
    fn size(&self) -> SurfaceSize;

    fn resize(&mut self, size: SurfaceSize);

    fn set_blend(&mut self, blend: BlendMode);

    /// Fill the whole surface
    fn fill_surface(&mut self, color: Color);

    /// Fill an almond-shaped petal `size` pixels from centre to tip, its
    /// long axis rotated by `rotation` radians, with a soft glow of radius
    /// `glow` around it
    fn fill_petal(&mut self, center: Vec2, size: f32, rotation: f32, color: Color, glow: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// Drawing parameters taken from a [`TrailConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasStyle {
    pub background: Color,
    pub fade_opacity: f32,
    pub blend: BlendMode,
    pub glow_blur: f32,
    pub cursor_dot: bool,
}

impl CanvasStyle {
    pub fn from_config(config: &TrailConfig) -> Self {
        Self {
            background: config.background,
            fade_opacity: config.fade_opacity,
            blend: config.blend,
            glow_blur: config.glow_blur,
            cursor_dot: config.cursor_dot,
        }
    }
}

/// Paints a pool onto a [`Canvas2d`].
///
/// The surface is never cleared: each frame lays a translucent background
/// overlay over the previous one, so old petals fade into a trail.
pub struct CanvasRenderer<C: Canvas2d> {
    canvas: C,
    style: CanvasStyle,
}

impl<C: Canvas2d> CanvasRenderer<C> {
    pub fn new(canvas: C, style: CanvasStyle) -> Self {
        Self { canvas, style }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    pub fn style(&self) -> &CanvasStyle {
        &self.style
    }
}

impl<C: Canvas2d> Renderer for CanvasRenderer<C> {
    fn resize(&mut self, surface: SurfaceSize) {
        if self.canvas.size() != surface {
            self.canvas.resize(surface);
        }
    }

    fn render(&mut self, pool: &ParticlePool, overlay: &FrameOverlay) {
        let style = self.style;
        let canvas = &mut self.canvas;

        canvas.set_blend(BlendMode::Normal);
        canvas.fill_surface(style.background.with_alpha(style.fade_opacity));

        canvas.set_blend(style.blend);
        for p in pool.iter_active() {
            let color = match p.appearance {
                Appearance::Color(color) => color,
                // Texture sprites have no image here; draw them as white petals
                Appearance::Texture(_) => Color::WHITE,
            };
            canvas.fill_petal(
                p.position.truncate(),
                p.size,
                p.rotation,
                color.with_alpha(p.alpha()),
                style.glow_blur,
            );
        }
        canvas.set_blend(BlendMode::Normal);

        if style.cursor_dot && overlay.hovering {
            canvas.fill_circle(overlay.pointer, CURSOR_DOT_RADIUS, Color::WHITE);
        }
    }
}
