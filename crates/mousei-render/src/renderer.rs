//! Renderer adapter trait

use mousei_core::{SurfaceSize, Vec2};
use mousei_particles::ParticlePool;

/// Per-frame state drawn on top of the particles
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOverlay {
    /// Pointer position in particle space
    pub pointer: Vec2,
    /// Whether the pointer is over the surface
    pub hovering: bool,
}

/// Draws the live contents of a pool.
///
/// Rendering never fails mid-animation: a missing resource degrades the
/// frame instead of aborting it.
pub trait Renderer {
    /// Record new surface dimensions. Calling it twice with the same size
    /// has the same effect as calling it once.
    fn resize(&mut self, surface: SurfaceSize);

    /// Draw every live particle in `pool`
    fn render(&mut self, pool: &ParticlePool, overlay: &FrameOverlay);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn resize(&mut self, surface: SurfaceSize) {
        (**self).resize(surface);
    }

    fn render(&mut self, pool: &ParticlePool, overlay: &FrameOverlay) {
        (**self).render(pool, overlay);
    }
}
