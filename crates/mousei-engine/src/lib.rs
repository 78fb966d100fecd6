//! Mousei Engine - pointer-driven particle trails
//!
//! `TrailEngine` owns one effect end to end. Each tick it spawns particles
//! for the latest pointer movement, advances the simulation, draws the pool
//! and recycles expired slots:
//!
//! ```text
//! HostEvent → PointerTracker → SpawnPolicy → ParticlePool → step → Renderer → cull
//! ```
//!
//! The engine implements `RuntimeSystem`, so a host can register it with a
//! `FrameLoop` and call `frame(dt)` from its own scheduler.

mod engine;

pub use engine::{canvas_engine, instanced_engine, TickReport, TrailEngine};

pub use mousei_core::{MouseiError, Result, SurfaceSize};
pub use mousei_particles::{ParticleRng, RandomSource, TrailConfig};
pub use mousei_render::{
    CanvasRenderer, CanvasStyle, InstanceSink, InstancedRenderer, RasterCanvas, Renderer,
    TextureHandle, TextureSet,
};
pub use mousei_runtime::{FrameLoop, FrameRequest, HostEvent};
