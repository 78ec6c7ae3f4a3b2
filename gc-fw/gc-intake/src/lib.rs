//! G-code command intake.
//!
//! This crate turns the raw serial byte stream from a host into validated
//! commands and feeds them, in arrival order, to an executor through a
//! bounded queue:
//!
//! ```text
//! bytes -> LineAssembler -> LineValidator -> CommandQueue -> Dispatcher -> Executor
//!                                 |                              |
//!                                 +------> Acknowledger <--------+
//! ```
//!
//! The physical link, the executor and the clock are external collaborators,
//! reached through [`transport::SerialIo`], [`executor::Executor`] and
//! [`time::TimeProvider`].

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod ack;
pub mod assembler;
pub mod dispatcher;
pub mod executor;
pub mod logger;
pub mod pipeline;
pub mod queue;
pub mod scan;
pub mod signal;
pub mod state;
pub mod time;
pub mod transport;
pub mod validator;
pub mod watchdog;

pub use ack::Acknowledger;
pub use assembler::{CompletedLine, LineAssembler};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use executor::{Executor, RecordingExecutor};
pub use pipeline::{IntakePipeline, PassSummary};
pub use queue::CommandQueue;
pub use signal::{ExecutorSignal, SignalRouter};
pub use state::{RunState, SequenceState};
pub use time::{ManualTimeProvider, TimeProvider};
pub use transport::{FakeSerial, SerialError, SerialIo};
pub use validator::{LineValidator, OutOfBandCommand, Verdict};
pub use watchdog::SilenceWatchdog;
