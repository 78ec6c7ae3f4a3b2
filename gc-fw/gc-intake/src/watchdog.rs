//! Idle notice timer
//!
//! When the queue is empty and the host has sent nothing for the configured
//! interval, the host is told `wait`. This is a check made once per pass,
//! never a suspension point.

/// Silence timer
pub struct SilenceWatchdog {
    timeout_ms: u32,
    last_activity_ms: u64,
}

impl SilenceWatchdog {
    /// A zero timeout disables the notice
    pub fn new(timeout_ms: u32, now_ms: u64) -> Self {
        Self {
            timeout_ms,
            last_activity_ms: now_ms,
        }
    }

    /// Record host activity
    pub fn touch(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
    }

    /// Whether a `wait` notice is due
    ///
    /// Restarts the interval when it fires.
    pub fn check(&mut self, now_ms: u64, queue_empty: bool, input_pending: bool) -> bool {
        if self.timeout_ms == 0 || !queue_empty || input_pending {
            return false;
        }
        if now_ms.saturating_sub(self.last_activity_ms) < u64::from(self.timeout_ms) {
            return false;
        }
        self.last_activity_ms = now_ms;
        true
    }
}
