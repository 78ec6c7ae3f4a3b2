//! Executor that logs commands instead of running a machine

use gc_intake::{Executor, ExecutorSignal};
use gc_model::ParsedCommand;

pub struct LoggingExecutor {
    executed: usize,
}

impl LoggingExecutor {
    pub fn new() -> Self {
        Self { executed: 0 }
    }

    /// Commands run so far
    pub fn executed(&self) -> usize {
        self.executed
    }
}

impl Executor for LoggingExecutor {
    fn execute(&mut self, command: &ParsedCommand) {
        self.executed += 1;
        match command.sequence {
            Some(n) => log::info!("exec N{n}: {}", command.text()),
            None => log::info!("exec: {}", command.text()),
        }
    }

    fn signal(&mut self, signal: ExecutorSignal) {
        log::warn!("signal: {signal:?}");
    }
}
