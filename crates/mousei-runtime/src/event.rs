//! Host-facing input events

use mousei_core::SurfaceSize;

/// Input delivered by the host windowing system.
///
/// Pointer coordinates are always surface pixels; trackers normalize them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMoved { x: f32, y: f32 },
    PointerLeft,
    Resized(SurfaceSize),
    /// The surface is going away; the loop stops scheduling frames.
    Teardown,
}
