//! The intake pipeline: one owned context for every stage.
//!
//! Each call to [`IntakePipeline::poll`] is one pass of the cooperative
//! control loop:
//!
//! 1. Send `wait` if the host has gone quiet with nothing queued
//! 2. Re-offer a command that met a full queue last pass
//! 3. Read bytes, assembling and validating lines, until a command stalls
//!    or a resend is requested
//! 4. Dispatch at most one queued command
//!
//! Nothing blocks. Lines keep being assembled and validated while the queue
//! is full, so protocol errors are still reported, but the first accepted
//! command that finds no free slot is held and reading stops. The host's
//! remaining bytes stay in the transport until the executor frees a slot.

use gc_model::{ConfigError, IntakeConfig, ParsedCommand, QueueFull};

use crate::ack::Acknowledger;
use crate::assembler::{CompletedLine, LineAssembler};
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::executor::Executor;
use crate::queue::CommandQueue;
use crate::signal::SignalRouter;
use crate::state::{RunState, SequenceState};
use crate::time::TimeProvider;
use crate::transport::SerialIo;
use crate::validator::{LineValidator, Verdict};
use crate::watchdog::SilenceWatchdog;

/// Counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub lines_accepted: usize,
    pub lines_rejected: usize,
    pub out_of_band: usize,
    /// Ingestion stopped: an accepted command is waiting for a free slot
    pub stalled: bool,
    pub dispatched: bool,
}

/// How a completed line ended
enum LineOutcome {
    Enqueued,
    Stalled,
    OutOfBand,
    /// Rejected; `resend` when the host was asked to retransmit
    Rejected { resend: bool },
}

/// Command intake pipeline
pub struct IntakePipeline {
    assembler: LineAssembler,
    validator: LineValidator,
    sequence: SequenceState,
    run_state: RunState,
    queue: CommandQueue,
    signals: SignalRouter,
    ack: Acknowledger,
    dispatcher: Dispatcher,
    watchdog: SilenceWatchdog,
    /// Accepted command waiting for a free slot
    stalled: Option<ParsedCommand>,
}

impl IntakePipeline {
    /// Build a pipeline from a validated configuration
    pub fn new(config: &IntakeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            assembler: LineAssembler::new(config.max_line_length),
            validator: LineValidator::new(config.ack_policy, config.emergency_parser),
            sequence: SequenceState::new(),
            run_state: RunState::new(),
            queue: CommandQueue::new(config.queue_capacity),
            signals: SignalRouter::new(),
            ack: Acknowledger::new(config.ack_format),
            dispatcher: Dispatcher::new(config.echo_commands, config.emergency_parser),
            watchdog: SilenceWatchdog::new(config.silence_timeout_ms, 0),
            stalled: None,
        })
    }

    /// Announce readiness to the host and start the idle timer
    pub fn start<S: SerialIo, T: TimeProvider>(&mut self, serial: &mut S, time: &T) {
        self.watchdog.touch(time.now_ms());
        self.ack.start(serial);
        log::info!(
            "Intake started: {} queue slots, {} byte lines",
            self.queue.capacity(),
            self.assembler.max_line_length()
        );
    }

    /// Run one control-loop pass
    pub fn poll<S, E, T>(&mut self, serial: &mut S, executor: &mut E, time: &T) -> PassSummary
    where
        S: SerialIo,
        E: Executor,
        T: TimeProvider,
    {
        let now = time.now_ms();
        let mut summary = PassSummary::default();

        if self
            .watchdog
            .check(now, self.queue.is_empty(), serial.available() > 0)
        {
            self.ack.wait_notice(serial);
        }

        if let Some(command) = self.stalled.take() {
            self.offer(command);
        }

        self.ingest(serial, now, &mut summary);
        summary.stalled = self.stalled.is_some();

        let outcome = self.dispatcher.dispatch_one(
            &mut self.queue,
            executor,
            &self.ack,
            serial,
            &mut self.run_state,
            &self.signals,
        );
        summary.dispatched = outcome != DispatchOutcome::Idle;
        summary
    }

    fn ingest<S: SerialIo>(&mut self, serial: &mut S, now: u64, summary: &mut PassSummary) {
        while self.stalled.is_none() {
            let Some(byte) = serial.read_byte() else {
                break;
            };
            let Some(line) = self.assembler.feed(byte, || serial.read_byte()) else {
                continue;
            };

            match self.handle_line(line, serial, now) {
                LineOutcome::Enqueued | LineOutcome::Stalled => summary.lines_accepted += 1,
                LineOutcome::OutOfBand => summary.out_of_band += 1,
                LineOutcome::Rejected { resend } => {
                    summary.lines_rejected += 1;
                    if resend {
                        // Everything after the bad line will be retransmitted
                        break;
                    }
                }
            }
        }
    }

    fn handle_line<S: SerialIo>(
        &mut self,
        line: CompletedLine,
        serial: &mut S,
        now: u64,
    ) -> LineOutcome {
        if line.truncated {
            log::warn!(
                "Line exceeded {} bytes and was truncated",
                self.assembler.max_line_length()
            );
        }

        let verdict = self.validator.validate(
            &line,
            &mut self.sequence,
            &mut self.run_state,
            &self.signals,
        );

        match verdict {
            Verdict::Accepted(command) => {
                self.watchdog.touch(now);
                log::debug!("Accepted: {}", command.text());
                if self.offer(command) {
                    LineOutcome::Enqueued
                } else {
                    LineOutcome::Stalled
                }
            }
            Verdict::OutOfBand {
                command,
                response,
                wants_ack,
                sequence,
            } => {
                self.watchdog.touch(now);
                log::info!("Out-of-band command {command:?} applied");
                let ack = wants_ack.then(|| (sequence, self.queue.free_slots()));
                self.ack.out_of_band(serial, response, ack);
                LineOutcome::OutOfBand
            }
            Verdict::Rejected { error, wants_ack } => {
                log::warn!("Rejected line: {error}");
                let resend = self
                    .ack
                    .reject(serial, error, self.sequence.last_accepted());
                if resend {
                    serial.flush_input();
                    self.assembler.clear();
                } else if wants_ack {
                    self.ack.acknowledge(
                        serial,
                        Some(self.sequence.last_accepted()),
                        self.queue.free_slots(),
                    );
                }
                LineOutcome::Rejected { resend }
            }
        }
    }

    /// Enqueue, or hold the command until a slot frees up
    fn offer(&mut self, command: ParsedCommand) -> bool {
        if self.queue.is_full() {
            log::debug!("{}; holding '{}'", QueueFull, command.text());
            self.stalled = Some(command);
            return false;
        }
        self.queue.enqueue(command).is_ok()
    }

    pub fn sequence(&self) -> &SequenceState {
        &self.sequence
    }

    pub fn sequence_mut(&mut self) -> &mut SequenceState {
        &mut self.sequence
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn run_state_mut(&mut self) -> &mut RunState {
        &mut self.run_state
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Bytes of the line currently being assembled
    pub fn pending_line_len(&self) -> usize {
        self.assembler.len()
    }

    /// Whether an accepted command is waiting for a free slot
    pub fn is_stalled(&self) -> bool {
        self.stalled.is_some()
    }
}
