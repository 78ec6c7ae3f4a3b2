//! Signal router between the intake and the executor
//!
//! Emergency commands take effect during validation, but the executor only
//! runs when the dispatcher hands it control. Effects that concern the
//! executor are posted to a bounded embassy-sync channel and forwarded at the
//! start of the next dispatch step.
//!
//! A signal that is already pending is not posted again. With one entry per
//! kind at most, the channel always has room, so `Kill` is never dropped.

extern crate alloc;

use alloc::vec::Vec;
use core::cell::Cell;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, TryReceiveError, TrySendError};

/// Maximum signals held between two dispatch steps
pub const SIGNAL_QUEUE_DEPTH: usize = 8;

/// Cooperative request for the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorSignal {
    /// Leave any wait-for-completion loop (`M108`)
    CancelWait,
    /// Stop motion immediately (`M410`)
    QuickStop,
    /// Machine halted (`M112`)
    Kill,
}

impl ExecutorSignal {
    fn mask(self) -> u8 {
        match self {
            ExecutorSignal::CancelWait => 1 << 0,
            ExecutorSignal::QuickStop => 1 << 1,
            ExecutorSignal::Kill => 1 << 2,
        }
    }
}

/// Signal router for the executor
///
/// Owns its channel, so independent pipelines never share signals. The
/// control loop is single-threaded, hence the no-op mutex.
pub struct SignalRouter {
    channel: Channel<NoopRawMutex, ExecutorSignal, SIGNAL_QUEUE_DEPTH>,
    /// Kinds currently in the channel
    pending: Cell<u8>,
}

impl Default for SignalRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalRouter {
    pub fn new() -> Self {
        Self {
            channel: Channel::new(),
            pending: Cell::new(0),
        }
    }

    /// Post a signal (non-blocking)
    ///
    /// A signal of a kind that is still pending is merged into it. Returns
    /// `false` only if the channel is full and the signal was dropped.
    pub fn post(&self, signal: ExecutorSignal) -> bool {
        let pending = self.pending.get();
        if pending & signal.mask() != 0 {
            log::trace!("{signal:?} already pending");
            return true;
        }
        match self.channel.try_send(signal) {
            Ok(()) => {
                self.pending.set(pending | signal.mask());
                true
            }
            Err(TrySendError::Full(dropped)) => {
                log::warn!("Signal channel full, dropping {dropped:?}");
                false
            }
        }
    }

    /// Receive all pending signals (non-blocking)
    ///
    /// Drains the channel in posting order. Returns an empty vector if nothing
    /// is pending.
    pub fn receive_all(&self) -> Vec<ExecutorSignal> {
        let mut signals = Vec::new();

        loop {
            match self.channel.try_receive() {
                Ok(signal) => signals.push(signal),
                Err(TryReceiveError::Empty) => break,
            }
        }
        self.pending.set(0);

        signals
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
