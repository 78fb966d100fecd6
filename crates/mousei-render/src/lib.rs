//! Mousei Render - draws a particle pool once per frame
//!
//! Two adapters share the [`Renderer`] trait:
//! - `CanvasRenderer` paints glowing petals onto any [`Canvas2d`], leaving a
//!   fading trail instead of clearing. `RasterCanvas` is a software canvas
//!   with PNG snapshots.
//! - `InstancedRenderer` packs sprites into per-texture instance batches
//!   and hands them to the host's GPU through an [`InstanceSink`].

mod canvas;
mod instanced;
mod raster;
mod renderer;
mod viewport;

pub use canvas::{Canvas2d, CanvasRenderer, CanvasStyle, CURSOR_DOT_RADIUS};
pub use instanced::{
    InstanceBatch, InstanceSink, InstancedRenderer, SpriteInstance, TextureHandle, TextureSet,
};
pub use raster::RasterCanvas;
pub use renderer::{FrameOverlay, Renderer};
pub use viewport::Viewport;
