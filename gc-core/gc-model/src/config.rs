//! Intake configuration
//!
//! Every knob is a runtime value resolved once at startup. All code paths are
//! compiled in; the pipeline branches on these values.

extern crate alloc;

use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of command slots
pub const DEFAULT_QUEUE_CAPACITY: usize = 4;
/// Default maximum stored line length, terminator slot included
pub const DEFAULT_MAX_LINE_LENGTH: usize = 96;
/// Default idle interval before a `wait` notice
pub const DEFAULT_SILENCE_TIMEOUT_MS: u32 = 1000;
/// Default transport speed
pub const DEFAULT_BAUD_RATE: u32 = 250_000;
/// Transport speeds known to work with common hosts
pub const SUPPORTED_BAUD_RATES: [u32; 7] = [2400, 9600, 19200, 38400, 57600, 115_200, 250_000];

/// Which dispatched commands receive an `ok`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckPolicy {
    /// Only lines that carried a line number
    #[default]
    NumberedOnly,
    /// Every dispatched command
    Always,
}

/// Shape of the `ok` handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckFormat {
    /// `ok`
    #[default]
    Plain,
    /// `ok N<line> B<free slots>`
    Advanced,
}

/// Intake configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Number of command queue slots
    pub queue_capacity: usize,
    /// Maximum line length; `max_line_length - 1` bytes are stored
    pub max_line_length: usize,
    /// Idle interval before `wait` is sent; 0 disables the notice
    pub silence_timeout_ms: u32,
    pub ack_policy: AckPolicy,
    pub ack_format: AckFormat,
    /// Echo each command as it is dispatched
    pub echo_commands: bool,
    /// Intercept emergency commands during validation instead of queueing them
    pub emergency_parser: bool,
    pub baud_rate: u32,
    /// Serial device path; stdin/stdout when absent
    pub port: Option<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            silence_timeout_ms: DEFAULT_SILENCE_TIMEOUT_MS,
            ack_policy: AckPolicy::default(),
            ack_format: AckFormat::default(),
            echo_commands: false,
            emergency_parser: true,
            baud_rate: DEFAULT_BAUD_RATE,
            port: None,
        }
    }
}

impl IntakeConfig {
    /// Sanity-check the configuration before the pipeline is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 || self.queue_capacity > u8::MAX as usize {
            return Err(ConfigError::QueueCapacity(self.queue_capacity));
        }
        if self.max_line_length < 2 {
            return Err(ConfigError::MaxLineLength(self.max_line_length));
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(ConfigError::BaudRate(self.baud_rate));
        }
        Ok(())
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_max_line_length(mut self, len: usize) -> Self {
        self.max_line_length = len;
        self
    }

    pub fn with_silence_timeout_ms(mut self, ms: u32) -> Self {
        self.silence_timeout_ms = ms;
        self
    }

    pub fn with_ack_policy(mut self, policy: AckPolicy) -> Self {
        self.ack_policy = policy;
        self
    }

    pub fn with_ack_format(mut self, format: AckFormat) -> Self {
        self.ack_format = format;
        self
    }

    pub fn with_echo_commands(mut self, echo: bool) -> Self {
        self.echo_commands = echo;
        self
    }

    pub fn with_emergency_parser(mut self, enabled: bool) -> Self {
        self.emergency_parser = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(IntakeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = IntakeConfig::default().with_queue_capacity(0);
        assert_eq!(cfg.validate(), Err(ConfigError::QueueCapacity(0)));

        let cfg = IntakeConfig::default().with_queue_capacity(256);
        assert_eq!(cfg.validate(), Err(ConfigError::QueueCapacity(256)));

        let cfg = IntakeConfig::default().with_max_line_length(1);
        assert_eq!(cfg.validate(), Err(ConfigError::MaxLineLength(1)));

        let mut cfg = IntakeConfig::default();
        cfg.baud_rate = 12345;
        assert_eq!(cfg.validate(), Err(ConfigError::BaudRate(12345)));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let cfg: IntakeConfig =
            serde_json::from_str(r#"{"queue_capacity":8,"ack_format":"advanced"}"#).unwrap();
        assert_eq!(cfg.queue_capacity, 8);
        assert_eq!(cfg.ack_format, AckFormat::Advanced);
        assert_eq!(cfg.max_line_length, DEFAULT_MAX_LINE_LENGTH);
        assert!(cfg.emergency_parser);
    }
}
