//! Dispatch of queued commands to the executor
//!
//! One command per control-loop pass. The head slot is peeked, handed to the
//! executor, acknowledged if it wants an `ok`, and only then released.

use crate::ack::Acknowledger;
use crate::executor::Executor;
use crate::queue::CommandQueue;
use crate::scan::{command_body, skip_spaces};
use crate::signal::SignalRouter;
use crate::state::RunState;
use crate::transport::SerialIo;
use crate::validator::OutOfBandCommand;

/// What a dispatch step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Queue was empty
    Idle,
    /// Head command went to the executor
    Executed,
    /// Head command was an emergency command applied in queue order
    Intercepted(OutOfBandCommand),
}

pub struct Dispatcher {
    echo_commands: bool,
    /// Emergency commands were queued instead of applied during validation
    emergency_in_order: bool,
}

impl Dispatcher {
    pub fn new(echo_commands: bool, emergency_parser: bool) -> Self {
        Self {
            echo_commands,
            emergency_in_order: !emergency_parser,
        }
    }

    /// Deliver pending signals, then dispatch at most one command
    pub fn dispatch_one<S, E>(
        &self,
        queue: &mut CommandQueue,
        executor: &mut E,
        ack: &Acknowledger,
        serial: &mut S,
        run: &mut RunState,
        signals: &SignalRouter,
    ) -> DispatchOutcome
    where
        S: SerialIo,
        E: Executor,
    {
        forward_signals(signals, executor);

        let Some((slot, command)) = queue.dequeue() else {
            return DispatchOutcome::Idle;
        };
        let wants_ack = command.wants_ack;
        let sequence = command.sequence;

        if self.echo_commands {
            ack.echo(serial, command.as_bytes());
        }

        let intercepted = if self.emergency_in_order {
            OutOfBandCommand::from_body(command_body(skip_spaces(command.as_bytes())))
        } else {
            None
        };

        let outcome = match intercepted {
            Some(oob) => {
                log::debug!("Applying queued {oob:?}");
                if let Some(response) = oob.apply(run, signals) {
                    ack.send(serial, response);
                }
                forward_signals(signals, executor);
                DispatchOutcome::Intercepted(oob)
            }
            None => {
                log::debug!("Dispatching slot {slot}: {}", command.text());
                executor.execute(command);
                DispatchOutcome::Executed
            }
        };

        queue.release(slot);
        if wants_ack {
            ack.acknowledge(serial, sequence, queue.free_slots());
        }
        outcome
    }
}

fn forward_signals<E: Executor>(signals: &SignalRouter, executor: &mut E) {
    for signal in signals.receive_all() {
        executor.signal(signal);
    }
}
