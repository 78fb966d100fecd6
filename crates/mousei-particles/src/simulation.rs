//! Per-frame particle integration
//!
//! Two motion models share one lifecycle:
//! - `Spiral` (canvas petals): the heading turns proportionally to the
//!   particle's own speed, position moves along the heading, life drains by
//!   the per-particle decay and size shrinks geometrically.
//! - `Drift` (instanced sprites): constant velocity, age accumulates toward
//!   `max_age`, and size shrinks linearly with remaining life.

use crate::particle::{Lifecycle, Particle};

/// Motion model applied to every particle of an emitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionModel {
    Spiral {
        /// Heading change per frame per unit of speed
        rotation_rate: f32,
        /// Distance travelled per frame per unit of speed
        spread_multiplier: f32,
        /// Size multiplier applied every frame, in (0, 1]
        shrink_factor: f32,
        /// Particles at or below this size are dead
        visibility_epsilon: f32,
    },
    Drift {
        /// Draw rotation per second of age, radians
        spin_rate: f32,
    },
}

impl MotionModel {
    pub fn spiral() -> Self {
        MotionModel::Spiral {
            rotation_rate: 0.006,
            spread_multiplier: 15.0,
            shrink_factor: 0.96,
            visibility_epsilon: 0.1,
        }
    }

    pub fn drift() -> Self {
        MotionModel::Drift { spin_rate: 0.5 }
    }
}

/// Result of one simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still visible after the step
    Alive,
    /// Reached its terminal condition during this step
    Expired,
    /// Was already dead; nothing changed
    AlreadyDead,
}

/// Advance one particle by one frame.
///
/// Deterministic: the only inputs are the particle, the model and `dt`.
/// `Expired` is returned exactly once per particle.
pub fn step(p: &mut Particle, motion: &MotionModel, dt: f32) -> StepOutcome {
    if p.lifecycle == Lifecycle::Dead {
        return StepOutcome::AlreadyDead;
    }
    p.lifecycle = Lifecycle::Active;

    let expired = match *motion {
        MotionModel::Spiral {
            rotation_rate,
            spread_multiplier,
            shrink_factor,
            visibility_epsilon,
        } => {
            p.angle += p.speed * rotation_rate;
            p.rotation = p.angle;
            let reach = p.speed * spread_multiplier;
            p.position.x += p.angle.sin() * reach;
            p.position.y += p.angle.cos() * reach;

            p.life = (p.life - p.decay).clamp(0.0, 1.0);
            p.size = (p.size * shrink_factor).max(0.0);
            p.life <= 0.0 || p.size <= visibility_epsilon
        }
        MotionModel::Drift { spin_rate } => {
            p.position.x += p.velocity.x;
            p.position.y += p.velocity.y;

            p.age += dt.max(0.0);
            p.life = if p.max_age > 0.0 {
                (1.0 - p.age / p.max_age).clamp(0.0, 1.0)
            } else {
                0.0
            };
            p.size = (p.base_size * p.life).max(0.0);
            p.rotation = p.age * spin_rate;
            p.age >= p.max_age
        }
    };

    if expired {
        p.lifecycle = Lifecycle::Dead;
        StepOutcome::Expired
    } else {
        StepOutcome::Alive
    }
}
