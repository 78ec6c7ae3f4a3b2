//! Protocol and run state shared by the pipeline stages.

use gc_model::SequenceNumber;

/// Last accepted line number
///
/// Written only by the validator: when a numbered line passes validation,
/// or when the resynchronization command resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceState {
    last_accepted: SequenceNumber,
}

impl SequenceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_accepted(&self) -> SequenceNumber {
        self.last_accepted
    }

    /// Line number the host must send next
    pub fn expected_next(&self) -> SequenceNumber {
        self.last_accepted.saturating_add(1)
    }

    /// Record a line that passed validation
    pub(crate) fn accept(&mut self, sequence: SequenceNumber) {
        self.last_accepted = sequence;
    }

    /// Resynchronize to a host-provided line number
    pub fn reset_to(&mut self, sequence: SequenceNumber) {
        log::debug!(
            "Line numbering reset: {} -> {sequence}",
            self.last_accepted
        );
        self.last_accepted = sequence;
    }
}

/// Run flag
///
/// Single writer per control-loop pass: the validator (or the dispatcher,
/// when emergency commands are queued in order) applies halt and resume.
/// Everything else only reads. Cancelling an executor wait is a signal, not
/// state kept here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    running: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self { running: true }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_stopped(&self) -> bool {
        !self.running
    }

    pub fn halt(&mut self) {
        if self.running {
            log::info!("Halted");
        }
        self.running = false;
    }

    pub fn resume(&mut self) {
        if !self.running {
            log::info!("Resumed");
        }
        self.running = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_at_zero() {
        let seq = SequenceState::new();
        assert_eq!(seq.last_accepted(), 0);
        assert_eq!(seq.expected_next(), 1);
    }

    #[test]
    fn test_reset_to() {
        let mut seq = SequenceState::new();
        seq.accept(41);
        seq.reset_to(7);
        assert_eq!(seq.expected_next(), 8);
    }

    #[test]
    fn test_run_state_transitions() {
        let mut run = RunState::new();
        assert!(run.is_running());
        run.halt();
        assert!(run.is_stopped());
        run.halt();
        assert!(run.is_stopped());
        run.resume();
        assert!(run.is_running());
    }
}
