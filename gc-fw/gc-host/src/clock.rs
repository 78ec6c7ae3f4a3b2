//! Wall clock for the control loop

use std::time::Instant;

use gc_intake::TimeProvider;

/// Milliseconds since the runner started
pub struct StdTimeProvider {
    start: Instant,
}

impl StdTimeProvider {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TimeProvider for StdTimeProvider {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
