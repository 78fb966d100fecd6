//! Surface dimensions and the camera's visible extent

use mousei_core::{SurfaceSize, Vec2};
use mousei_particles::CameraConfig;

/// Maps tracker coordinates to the space particles are drawn in.
///
/// Without a camera particles live in surface pixels and the mapping is the
/// identity. With a perspective camera the visible width and height of the
/// z = 0 plane are derived from the field of view and recomputed on resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    surface: SurfaceSize,
    camera: Option<CameraConfig>,
    /// World-space width and height visible at z = 0
    extent: Vec2,
}

impl Viewport {
    pub fn new(surface: SurfaceSize, camera: Option<CameraConfig>) -> Self {
        let mut viewport = Self {
            surface,
            camera,
            extent: Vec2::ZERO,
        };
        viewport.resize(surface);
        viewport
    }

    pub fn resize(&mut self, surface: SurfaceSize) {
        self.surface = surface;
        self.extent = match self.camera {
            Some(camera) => {
                let half_fov = camera.fov_degrees.to_radians() / 2.0;
                let height = 2.0 * camera.distance * half_fov.tan();
                Vec2::new(height * surface.aspect(), height)
            }
            None => Vec2::new(surface.width as f32, surface.height as f32),
        };
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn camera(&self) -> Option<CameraConfig> {
        self.camera
    }

    /// Visible width and height in particle space
    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    /// Map normalized pointer coordinates ([-1, 1], y down) onto the z = 0
    /// plane, y up
    pub fn to_world(&self, normalized: Vec2) -> Vec2 {
        Vec2::new(
            normalized.x * self.extent.x / 2.0,
            -normalized.y * self.extent.y / 2.0,
        )
    }

    /// Map a tracker position into particle space
    pub fn project(&self, point: Vec2) -> Vec2 {
        match self.camera {
            Some(_) => self.to_world(point),
            None => point,
        }
    }
}
