//! Frame loop driving runtime systems

use crate::clock::FrameClock;
use crate::event::HostEvent;
use crate::system::RuntimeSystem;
use mousei_core::Result;
use std::cell::Cell;
use std::rc::Rc;

/// What the host should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// Schedule another frame
    Continue,
    /// Stop scheduling; systems have been shut down
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopPhase {
    Created,
    Running,
    Stopped,
}

/// Cloneable handle used by the host to request teardown from anywhere
#[derive(Clone, Default)]
pub struct LoopHandle {
    stop: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn request_stop(&self) {
        self.stop.set(true);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.get()
    }
}

/// Runs registered systems once per frame.
///
/// The loop does not own timing: the host's scheduler calls [`FrameLoop::frame`]
/// and keeps scheduling while it returns [`FrameRequest::Continue`].
pub struct FrameLoop {
    systems: Vec<Box<dyn RuntimeSystem>>,
    /// Leading systems whose `initialize` succeeded
    initialized: usize,
    /// Host events waiting for the next frame, in arrival order
    pending: Vec<HostEvent>,
    clock: FrameClock,
    phase: LoopPhase,
    handle: LoopHandle,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            initialized: 0,
            pending: Vec::new(),
            clock: FrameClock::new(),
            phase: LoopPhase::Created,
            handle: LoopHandle::default(),
        }
    }

    /// Register a system. Systems run in registration order.
    pub fn add_system(&mut self, system: Box<dyn RuntimeSystem>) {
        self.systems.push(system);
    }

    /// Handle for requesting teardown
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == LoopPhase::Stopped
    }

    /// Events queued for the next frame
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Queue a host event for delivery at the start of the next frame
    pub fn push_event(&mut self, event: HostEvent) {
        if event == HostEvent::Teardown {
            self.handle.request_stop();
            return;
        }
        if self.phase != LoopPhase::Stopped {
            self.pending.push(event);
        }
    }

    /// Initialize every system. Called implicitly by the first frame.
    ///
    /// Stops at the first failure; systems initialized before it are still
    /// shut down when the loop stops.
    pub fn start(&mut self) -> Result<()> {
        if self.phase != LoopPhase::Created {
            return Ok(());
        }
        while let Some(system) = self.systems.get_mut(self.initialized) {
            system.initialize()?;
            log::debug!("[frame_loop] initialized {}", system.name());
            self.initialized += 1;
        }
        self.phase = LoopPhase::Running;
        Ok(())
    }

    /// Run one frame with a delta measured by the host's scheduler
    pub fn frame(&mut self, dt: f64) -> FrameRequest {
        if self.phase == LoopPhase::Stopped {
            return FrameRequest::Stop;
        }
        if self.handle.is_stop_requested() {
            self.shutdown();
            return FrameRequest::Stop;
        }
        if let Err(e) = self.start() {
            log::error!("[frame_loop] initialization failed: {e}");
            self.shutdown();
            return FrameRequest::Stop;
        }

        self.clock.advance(dt);
        let dt = self.clock.delta_time;

        let events = std::mem::take(&mut self.pending);
        for system in &mut self.systems {
            for event in &events {
                system.handle_event(event);
            }
            if let Err(e) = system.update(dt) {
                log::error!("[frame_loop] {} update failed: {e}", system.name());
            }
        }

        FrameRequest::Continue
    }

    /// Run one frame timed by the wall clock
    pub fn frame_now(&mut self) -> FrameRequest {
        let dt = self.clock.measure();
        self.frame(dt)
    }

    fn shutdown(&mut self) {
        if self.phase == LoopPhase::Stopped {
            return;
        }
        for system in &mut self.systems[..self.initialized] {
            if let Err(e) = system.shutdown() {
                log::error!("[frame_loop] {} shutdown failed: {e}", system.name());
            }
        }
        self.initialized = 0;
        self.pending.clear();
        self.phase = LoopPhase::Stopped;
        log::info!("[frame_loop] stopped after {} frame(s)", self.clock.frame_count);
    }
}
