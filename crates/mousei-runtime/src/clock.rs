//! Frame clock with delta clamping

use std::time::Instant;

/// Longest frame delta passed to systems, in seconds
const MAX_DELTA: f64 = 0.25;

/// Tracks frame time for the animation loop.
///
/// Hosts either call [`FrameClock::tick`] (wall clock) or feed the timestamp
/// their scheduler hands them through [`FrameClock::advance`].
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Number of frames ticked so far
    pub frame_count: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock from the wall clock. Call once per frame.
    pub fn tick(&mut self) {
        let elapsed = self.measure();
        self.advance(elapsed);
    }

    /// Seconds of wall time since the previous measurement (zero the first time)
    pub fn measure(&mut self) -> f64 {
        let now = Instant::now();
        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            return 0.0;
        }
        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        elapsed
    }

    /// Advance the clock by an externally measured delta.
    ///
    /// Negative or non-finite deltas count as zero; long stalls (tab in the
    /// background) are clamped so the simulation does not jump.
    pub fn advance(&mut self, elapsed: f64) {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        self.delta_time = elapsed.min(MAX_DELTA);
        self.total_time += self.delta_time;
        self.frame_count += 1;
    }
}
