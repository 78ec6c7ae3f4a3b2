//! Executor seam
//!
//! The executor performs the actual machine work for a command. It is called
//! fire-and-forget: completion is signalled only by returning, after which
//! the dispatcher frees the queue slot.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use gc_model::ParsedCommand;

use crate::signal::ExecutorSignal;

/// Consumer of dispatched commands
pub trait Executor {
    /// Execute one command
    fn execute(&mut self, command: &ParsedCommand);

    /// Receive an out-of-band request
    ///
    /// Delivered before the next command is dispatched.
    fn signal(&mut self, signal: ExecutorSignal) {
        log::debug!("Executor ignoring signal {signal:?}");
    }
}

/// Executor that records what it was given
///
/// Useful for testing the pipeline without a machine.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    /// Bytes of executed commands, in dispatch order
    pub executed: Vec<Vec<u8>>,
    /// Signals received, in delivery order
    pub signals: Vec<ExecutorSignal>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executed commands as text
    pub fn texts(&self) -> Vec<String> {
        self.executed
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, command: &ParsedCommand) {
        self.executed.push(command.bytes.clone());
    }

    fn signal(&mut self, signal: ExecutorSignal) {
        self.signals.push(signal);
    }
}
