//! Pointer tracking

use mousei_core::{SurfaceSize, Vec2};

/// Coordinate space the tracker reports positions in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSpace {
    /// Raw surface pixels, origin top-left
    #[default]
    Pixels,
    /// [-1, 1] on both axes, surface centre at the origin, y growing downward
    Normalized,
}

/// The most recent pointer segment seen since the last tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMotion {
    pub from: Vec2,
    pub to: Vec2,
}

impl PointerMotion {
    pub fn displacement(&self) -> Vec2 {
        self.to - self.from
    }

    pub fn distance(&self) -> f32 {
        self.displacement().length()
    }
}

/// Tracks the pointer across the drawing surface.
///
/// Positions are normalized once at ingestion. Only the latest segment is
/// kept: several moves between two ticks collapse into the last one.
pub struct PointerTracker {
    space: CoordinateSpace,
    surface: SurfaceSize,
    /// Current pointer position in tracker space
    current: Vec2,
    /// Position before the most recent move
    previous: Vec2,
    /// Whether the pointer is over the surface
    hovering: bool,
    /// Set by a move, cleared by `take_motion`
    moved: bool,
}

impl PointerTracker {
    /// Create a tracker with the pointer resting at the surface centre
    pub fn new(space: CoordinateSpace, surface: SurfaceSize) -> Self {
        let center = match space {
            CoordinateSpace::Pixels => surface.center(),
            CoordinateSpace::Normalized => Vec2::ZERO,
        };
        Self {
            space,
            surface,
            current: center,
            previous: center,
            hovering: false,
            moved: false,
        }
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn current(&self) -> Vec2 {
        self.current
    }

    pub fn previous(&self) -> Vec2 {
        self.previous
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Process a pointer move in surface pixels, returning the displacement
    /// since the previous sample.
    ///
    /// Non-finite input is dropped and leaves the tracker untouched.
    pub fn on_pointer_move(&mut self, raw_x: f32, raw_y: f32) -> Vec2 {
        let Some(position) = self.normalize(Vec2::new(raw_x, raw_y)) else {
            log::debug!("[pointer] dropped move to ({raw_x}, {raw_y})");
            return Vec2::ZERO;
        };

        self.previous = self.current;
        self.current = position;
        self.hovering = true;
        self.moved = true;
        self.current - self.previous
    }

    /// Process the pointer leaving the surface
    pub fn on_pointer_leave(&mut self) {
        self.hovering = false;
    }

    /// Record new surface dimensions. Positions are kept as they are.
    pub fn resize(&mut self, surface: SurfaceSize) {
        self.surface = surface;
    }

    /// Take the latest segment if the pointer moved since the last call
    pub fn take_motion(&mut self) -> Option<PointerMotion> {
        if !self.moved {
            return None;
        }
        self.moved = false;
        Some(PointerMotion {
            from: self.previous,
            to: self.current,
        })
    }

    fn normalize(&self, raw: Vec2) -> Option<Vec2> {
        if !raw.is_finite() {
            return None;
        }
        match self.space {
            CoordinateSpace::Pixels => Some(raw),
            CoordinateSpace::Normalized => {
                if self.surface.is_empty() {
                    return None;
                }
                Some(Vec2::new(
                    (raw.x / self.surface.width as f32 - 0.5) * 2.0,
                    (raw.y / self.surface.height as f32 - 0.5) * 2.0,
                ))
            }
        }
    }
}
