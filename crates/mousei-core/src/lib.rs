//! Mousei Core - Foundational types for the Mousei trail engine
//!
//! This crate provides the types that all other Mousei crates depend on:
//! - `ParticleHandle` - Index + generation handle into a particle pool
//! - `Vec2`, `Vec3`, `Transform` - Spatial types
//! - `Color` - RGBA color with HSL construction
//! - `SurfaceSize` - Drawing surface dimensions in pixels
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{MouseiError, Result};
pub use id::ParticleHandle;
pub use types::{Color, SurfaceSize, Transform, Vec2, Vec3};
