//! Translation of winit window events into host events

use crate::event::HostEvent;
use mousei_core::SurfaceSize;
use winit::event::WindowEvent;

/// Map a winit window event onto the events a trail effect consumes.
///
/// Returns `None` for everything the effect does not care about.
pub fn host_event(event: &WindowEvent) -> Option<HostEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => Some(HostEvent::PointerMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::CursorLeft { .. } => Some(HostEvent::PointerLeft),
        WindowEvent::Resized(size) => Some(HostEvent::Resized(SurfaceSize::new(
            size.width,
            size.height,
        ))),
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(HostEvent::Teardown),
        _ => None,
    }
}
