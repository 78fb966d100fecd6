//! Mousei Particles - pointer-trail particle simulation
//!
//! Provides pooled particle simulation driven by pointer movement:
//! - Fixed-capacity slot pool with a free list and oldest-first eviction
//! - Interpolated and gated spawn strategies
//! - Spiral (canvas petals) and drift (instanced sprites) motion models
//! - Weighted hue palettes and texture-indexed appearances
//! - TOML configuration with validation and two presets

pub mod config;
pub mod emitter;
pub mod palette;
pub mod particle;
pub mod rand;
pub mod simulation;
pub mod spawn;

pub use config::{BlendMode, CameraConfig, TrailConfig};
pub use emitter::TrailEmitter;
pub use palette::{kculture_bands, AppearanceSource, HueBand};
pub use particle::{Appearance, CullReport, Lifecycle, Particle, ParticlePool};
pub use rand::{ParticleRng, RandomSource};
pub use simulation::{step, MotionModel, StepOutcome};
pub use spawn::{SpawnPlan, SpawnPolicy, SpawnStrategy};
