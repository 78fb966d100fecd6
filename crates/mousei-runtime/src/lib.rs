//! Mousei Runtime - Frame loop infrastructure
//!
//! Provides the building blocks a host uses to drive a trail effect:
//! - `FrameClock` — per-frame delta tracking with spike clamping
//! - `PointerTracker` — pointer position, displacement and hover state
//! - `HostEvent` — input events queued by the frame loop and applied before each tick
//! - `RuntimeSystem` — trait for systems ticked by the frame loop
//! - `FrameLoop` — runs systems once per frame and shuts them down exactly once

mod clock;
mod event;
mod frame_loop;
mod input;
mod system;
pub mod window;

pub use clock::FrameClock;
pub use event::HostEvent;
pub use frame_loop::{FrameLoop, FrameRequest, LoopHandle};
pub use input::{CoordinateSpace, PointerMotion, PointerTracker};
pub use system::RuntimeSystem;
