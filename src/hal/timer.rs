//! Edge scheduling for the bit-banged bus
//!
//! Signal edges are pinned to monotonic timestamps rather than to
//! elapsed-time-since-last-call: the engine waits *before* each register
//! write, then commits the schedule after it. Scheduler jitter lands on
//! the busy-wait, not on the emitted waveform.

use std::hint;
use std::time::{Duration, Instant};

/// Schedules register writes against the monotonic clock.
///
/// The timer carries the timestamp of the last emitted edge plus the
/// pending delay to the next one. The engine alternates
/// `wait(); <register write>; advance(); set_delay(..)`.
pub struct EdgeTimer {
    last_edge: Instant,
    pending_ns: u32,
}

impl EdgeTimer {
    /// Start a schedule anchored at the current instant with no pending
    /// delay.
    pub fn new() -> Self {
        Self {
            last_edge: Instant::now(),
            pending_ns: 0,
        }
    }

    /// Busy-wait until the scheduled edge at `last edge + pending`.
    ///
    /// If that moment has already passed (the scheduler stole time before
    /// or after the previous edge), the anchor moves to now and the wait
    /// stretches by one full pending delay. Absolute error stays bounded
    /// by a single delay and the anchor never lags real time.
    pub fn wait(&mut self) {
        let pending = Duration::from_nanos(u64::from(self.pending_ns));
        let mut target = self.last_edge + pending;

        let now = Instant::now();
        if now >= target {
            self.last_edge = now;
            target = now + pending;
        }

        while Instant::now() < target {
            hint::spin_loop();
        }
    }

    /// Commit the pending delay to the schedule without waiting.
    ///
    /// Called immediately after a register write, so the next `wait`
    /// targets the moment that edge must remain stable until.
    pub fn advance(&mut self) {
        self.last_edge += Duration::from_nanos(u64::from(self.pending_ns));
    }

    /// Replace the pending delay without moving the anchor.
    pub fn set_delay(&mut self, ns: u32) {
        self.pending_ns = ns;
    }
}

impl Default for EdgeTimer {
    fn default() -> Self {
        Self::new()
    }
}
