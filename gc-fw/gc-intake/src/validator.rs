//! Line validation: line numbers, checksums and emergency commands.
//!
//! A numbered line looks like `N<int> <body> *<checksum>`. The checksum is the
//! XOR of every byte from the first non-space character up to the `*`.
//! Checks run in this order:
//!
//! 1. Line number continuity (`lastAccepted + 1`), unless the line is the
//!    resynchronization command `M110`
//! 2. Presence of a checksum
//! 3. Checksum value
//!
//! A checksum without a line number is rejected without a resend request.
//! Emergency commands are applied here and never reach the queue.

extern crate alloc;

use gc_model::{AckPolicy, HostResponse, ParsedCommand, ProtocolError, SequenceNumber};

use crate::assembler::CompletedLine;
use crate::scan::{
    self, CHECKSUM_MARKER, RESYNC_LITERAL, SEQUENCE_MARKER, command_body, find_subslice,
    parse_long, skip_spaces, xor_checksum,
};
use crate::signal::{ExecutorSignal, SignalRouter};
use crate::state::{RunState, SequenceState};

/// Commands acted on immediately instead of being queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfBandCommand {
    /// `M108`: leave the current wait-for-completion loop
    CancelWait,
    /// `M112`: halt
    Halt,
    /// `M410`: stop motion now
    QuickStop,
    /// `M999`: resume after a halt
    Resume,
}

impl OutOfBandCommand {
    /// Match a command body exactly
    pub fn from_body(body: &[u8]) -> Option<Self> {
        match body {
            b"M108" => Some(OutOfBandCommand::CancelWait),
            b"M112" => Some(OutOfBandCommand::Halt),
            b"M410" => Some(OutOfBandCommand::QuickStop),
            b"M999" => Some(OutOfBandCommand::Resume),
            _ => None,
        }
    }

    /// Apply the effect
    ///
    /// Returns the message to send to the host, if any.
    pub fn apply(self, run: &mut RunState, signals: &SignalRouter) -> Option<HostResponse> {
        match self {
            OutOfBandCommand::CancelWait => {
                signals.post(ExecutorSignal::CancelWait);
                None
            }
            OutOfBandCommand::Halt => {
                run.halt();
                signals.post(ExecutorSignal::Kill);
                Some(HostResponse::Killed)
            }
            OutOfBandCommand::QuickStop => {
                signals.post(ExecutorSignal::QuickStop);
                None
            }
            OutOfBandCommand::Resume => {
                run.resume();
                None
            }
        }
    }
}

/// Result of validating one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Ready to enqueue
    Accepted(ParsedCommand),
    /// Line consumed without enqueueing
    Rejected {
        error: ProtocolError,
        /// The line passed the sequence checks and still wants its `ok`
        wants_ack: bool,
    },
    /// Emergency command, already applied
    OutOfBand {
        command: OutOfBandCommand,
        /// Message produced by the effect
        response: Option<HostResponse>,
        wants_ack: bool,
        sequence: Option<SequenceNumber>,
    },
}

/// Stateless validator; all mutable state is passed in
pub struct LineValidator {
    ack_policy: AckPolicy,
    emergency_parser: bool,
}

impl LineValidator {
    pub fn new(ack_policy: AckPolicy, emergency_parser: bool) -> Self {
        Self {
            ack_policy,
            emergency_parser,
        }
    }

    /// Validate a completed line
    ///
    /// `seq` is advanced only when a numbered line passes every check.
    /// Emergency commands update `run` and post to `signals` before this
    /// returns.
    pub fn validate(
        &self,
        line: &CompletedLine,
        seq: &mut SequenceState,
        run: &mut RunState,
        signals: &SignalRouter,
    ) -> Verdict {
        let command = skip_spaces(line.as_bytes());
        let checksum_pos = command.iter().position(|&b| b == CHECKSUM_MARKER);
        let resync_pos = find_subslice(command, RESYNC_LITERAL);

        let sequence = if command.first() == Some(&SEQUENCE_MARKER) {
            // After M110 a second N is the authoritative line number
            let number_start = resync_pos
                .and_then(|pos| marker_after(command, pos + RESYNC_LITERAL.len()))
                .unwrap_or(0);
            let received = parse_long(&command[number_start + 1..]);

            if resync_pos.is_none() && received != seq.expected_next() {
                return self.reject(ProtocolError::SequenceMismatch {
                    expected: seq.expected_next(),
                    received,
                });
            }

            let Some(checksum_pos) = checksum_pos else {
                return self.reject(ProtocolError::MissingChecksum);
            };
            let computed = xor_checksum(&command[..checksum_pos]);
            let claimed = parse_long(&command[checksum_pos + 1..]);
            if claimed != i64::from(computed) {
                return self.reject(ProtocolError::ChecksumMismatch {
                    computed,
                    received: claimed,
                });
            }

            if resync_pos.is_some() {
                seq.reset_to(received);
            } else {
                seq.accept(received);
            }
            Some(received)
        } else if checksum_pos.is_some() {
            return self.reject(ProtocolError::SequenceRequiredWithChecksum);
        } else {
            if let Some(pos) = resync_pos {
                if let Some(n) = marker_after(command, pos + RESYNC_LITERAL.len()) {
                    seq.reset_to(parse_long(&command[n + 1..]));
                }
            }
            None
        };

        let wants_ack = sequence.is_some() || self.ack_policy == AckPolicy::Always;
        let body = command_body(command);

        if self.emergency_parser {
            if let Some(oob) = OutOfBandCommand::from_body(body) {
                log::debug!("Out-of-band {oob:?}");
                let response = oob.apply(run, signals);
                return Verdict::OutOfBand {
                    command: oob,
                    response,
                    wants_ack,
                    sequence,
                };
            }
        }

        if run.is_stopped() && scan::is_movement(body) {
            return Verdict::Rejected {
                error: ProtocolError::MovementWhileStopped,
                wants_ack,
            };
        }

        Verdict::Accepted(ParsedCommand::new(
            line.as_bytes().to_vec(),
            wants_ack,
            sequence,
        ))
    }

    fn reject(&self, error: ProtocolError) -> Verdict {
        Verdict::Rejected {
            error,
            wants_ack: false,
        }
    }
}

/// Index of the first line number marker at or after `from`
fn marker_after(command: &[u8], from: usize) -> Option<usize> {
    command
        .get(from..)?
        .iter()
        .position(|&b| b == SEQUENCE_MARKER)
        .map(|p| p + from)
}
