//! Leading-edge throttle owned by its call site.
//!
//! The first call opens a window; calls that land inside the window are
//! dropped, not queued. Time is supplied by the caller (event timestamps), so
//! each instance is independent and deterministic under test.

#[cfg(test)]
#[path = "throttle_test.rs"]
mod throttle_test;

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    window: Duration,
    last: Option<Duration>,
}

impl Throttle {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether a call at `now` may run. A call that runs opens a new window.
    ///
    /// A timestamp earlier than the open window (a host clock reset) reopens it.
    pub fn ready(&mut self, now: Duration) -> bool {
        if let Some(last) = self.last {
            if now >= last && now - last < self.window {
                return false;
            }
        }
        self.last = Some(now);
        true
    }

    /// Forget the open window.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
