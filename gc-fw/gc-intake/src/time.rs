//! Monotonic time source for the control loop.

use core::cell::Cell;

/// Millisecond clock
pub trait TimeProvider {
    /// Milliseconds since an arbitrary start point
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `since`
    fn elapsed_ms(&self, since: u64) -> u64 {
        self.now_ms().saturating_sub(since)
    }
}

/// Manually advanced clock for tests and simulated runs
#[derive(Debug, Default)]
pub struct ManualTimeProvider {
    now: Cell<u64>,
}

impl ManualTimeProvider {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl TimeProvider for ManualTimeProvider {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_time() {
        let time = ManualTimeProvider::new(100);
        time.advance(50);
        assert_eq!(time.now_ms(), 150);
        assert_eq!(time.elapsed_ms(120), 30);
        assert_eq!(time.elapsed_ms(500), 0);
        time.set(10);
        assert_eq!(time.now_ms(), 10);
    }
}
