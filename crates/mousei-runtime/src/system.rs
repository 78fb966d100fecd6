//! Runtime system trait

use crate::event::HostEvent;
use mousei_core::Result;

/// A system that can be ticked by the frame loop
///
/// Systems are updated in registration order. Events queued since the last
/// frame are delivered before `update` runs.
pub trait RuntimeSystem {
    /// Called once before the first frame
    fn initialize(&mut self) -> Result<()>;

    /// Called for every host event queued since the previous frame
    fn handle_event(&mut self, event: &HostEvent);

    /// Called once per frame
    fn update(&mut self, dt: f64) -> Result<()>;

    /// Called exactly once when the loop is torn down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
