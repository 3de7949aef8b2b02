//! Fixed-interval auto-save timer.

use std::time::{Duration, Instant};

/// Decides when the next snapshot is due.
///
/// The caller drives it with the current time so tests need no clock.
#[derive(Debug, Clone)]
pub struct AutoSave {
    interval: Duration,
    last_save: Instant,
}

impl AutoSave {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_save: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// A zero interval disables auto-save.
    pub fn enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    pub fn due(&self, now: Instant) -> bool {
        self.enabled() && now.saturating_duration_since(self.last_save) >= self.interval
    }

    /// Record that a snapshot was taken (by the timer or an explicit save).
    pub fn mark_saved(&mut self, now: Instant) {
        self.last_save = now;
    }
}
