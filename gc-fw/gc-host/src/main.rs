//! Workstation runner for the G-code command intake.
//!
//! Runs the intake control loop against stdin/stdout or a real serial port,
//! with an executor that logs each command instead of moving a machine.
//! Useful for exercising host software (or a terminal) against the handshake.

mod clock;
mod config;
mod executor;
mod link;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gc_intake::{IntakePipeline, SerialIo};
use gc_model::{AckFormat, AckPolicy};

use crate::clock::StdTimeProvider;
use crate::config::{ConfigOverrides, load_config};
use crate::executor::LoggingExecutor;
use crate::link::{HostLink, PortSerial, StdioSerial};

/// Pause between passes when nothing happened
const IDLE_SLEEP: Duration = Duration::from_millis(1);

#[derive(Parser)]
#[command(name = "gc-host")]
#[command(about = "Serial G-code command intake")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the intake loop until the input closes
    Run {
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of command queue slots
        #[arg(long)]
        queue_capacity: Option<usize>,
        /// Maximum line length, terminator included
        #[arg(long)]
        max_line_length: Option<usize>,
        /// Idle interval before `wait` is sent (0 disables)
        #[arg(long)]
        silence_timeout_ms: Option<u32>,
        /// Which commands get an `ok`
        #[arg(long, value_enum)]
        ack: Option<AckArg>,
        /// Shape of the `ok` line
        #[arg(long, value_enum)]
        ack_format: Option<AckFormatArg>,
        /// Echo each command as it is dispatched
        #[arg(long)]
        echo: bool,
        /// Queue emergency commands instead of applying them on arrival
        #[arg(long)]
        no_emergency_parser: bool,
        /// Serial device; stdin/stdout when absent
        #[arg(long)]
        port: Option<String>,
        /// Serial speed
        #[arg(long)]
        baud: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AckArg {
    /// Only numbered lines
    Numbered,
    /// Every command
    Always,
}

impl From<AckArg> for AckPolicy {
    fn from(arg: AckArg) -> Self {
        match arg {
            AckArg::Numbered => AckPolicy::NumberedOnly,
            AckArg::Always => AckPolicy::Always,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AckFormatArg {
    Plain,
    Advanced,
}

impl From<AckFormatArg> for AckFormat {
    fn from(arg: AckFormatArg) -> Self {
        match arg {
            AckFormatArg::Plain => AckFormat::Plain,
            AckFormatArg::Advanced => AckFormat::Advanced,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            queue_capacity,
            max_line_length,
            silence_timeout_ms,
            ack,
            ack_format,
            echo,
            no_emergency_parser,
            port,
            baud,
        } => {
            let overrides = ConfigOverrides {
                queue_capacity,
                max_line_length,
                silence_timeout_ms,
                ack_policy: ack.map(AckPolicy::from),
                ack_format: ack_format.map(AckFormat::from),
                echo_commands: echo.then_some(true),
                emergency_parser: no_emergency_parser.then_some(false),
                port,
                baud_rate: baud,
            };
            let config = load_config(config.as_deref(), overrides)?;
            let pipeline =
                IntakePipeline::new(&config).context("Invalid intake configuration")?;

            match config.port.as_deref() {
                Some(port) => {
                    let mut link = PortSerial::open(port, config.baud_rate)?;
                    run(pipeline, &mut link)
                }
                None => run(pipeline, &mut StdioSerial::spawn()),
            }
        }
    }
}

/// Control loop: one pass at a time until the host hangs up
fn run<L: HostLink>(mut pipeline: IntakePipeline, link: &mut L) -> Result<()> {
    let clock = StdTimeProvider::new();
    let mut executor = LoggingExecutor::new();

    pipeline.start(link, &clock);

    loop {
        let summary = pipeline.poll(link, &mut executor, &clock);

        let drained = link.available() == 0
            && pipeline.queue().is_empty()
            && !pipeline.is_stalled();
        if drained && link.at_eof() {
            break;
        }

        let busy = summary.dispatched
            || summary.lines_accepted > 0
            || summary.lines_rejected > 0
            || summary.out_of_band > 0;
        if !busy {
            thread::sleep(IDLE_SLEEP);
        }
    }

    log::info!(
        "Input closed after {} commands (last line {})",
        executor.executed(),
        pipeline.sequence().last_accepted()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_intake::{FakeSerial, SerialError};
    use gc_model::IntakeConfig;

    /// Fake link whose input is already complete
    struct ScriptedLink(FakeSerial);

    impl SerialIo for ScriptedLink {
        fn available(&self) -> usize {
            self.0.available()
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.0.read_byte()
        }

        fn write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
            self.0.write_byte(byte)
        }

        fn flush_input(&mut self) {
            self.0.flush_input()
        }
    }

    impl HostLink for ScriptedLink {
        fn at_eof(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_run_until_input_closes() {
        let mut serial = FakeSerial::new();
        serial.push_line("N1 G28*18");
        serial.push_line("M105");
        let mut link = ScriptedLink(serial);

        let config = IntakeConfig::default().with_silence_timeout_ms(0);
        let pipeline = IntakePipeline::new(&config).unwrap();
        run(pipeline, &mut link).unwrap();

        assert_eq!(link.0.take_lines(), vec!["start", "ok"]);
    }
}
