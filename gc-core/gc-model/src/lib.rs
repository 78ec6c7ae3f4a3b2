//! Data model for the G-code command intake.
//!
//! Shared between the intake engine and the host tooling:
//! - Parsed commands as they sit in the command queue
//! - Host-facing responses and their exact wire text
//! - The protocol error taxonomy
//! - Intake configuration, resolved once at startup

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod command;
pub mod config;
pub mod error;
pub mod messages;
pub mod response;

pub use command::{ParsedCommand, SequenceNumber};
pub use config::{AckFormat, AckPolicy, IntakeConfig};
pub use error::{ConfigError, ProtocolError, QueueFull};
pub use response::HostResponse;
