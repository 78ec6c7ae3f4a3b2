//! Configuration loading: JSON file first, then command-line overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gc_model::{AckFormat, AckPolicy, IntakeConfig};

/// Values given on the command line; `None` keeps the file or default value
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub queue_capacity: Option<usize>,
    pub max_line_length: Option<usize>,
    pub silence_timeout_ms: Option<u32>,
    pub ack_policy: Option<AckPolicy>,
    pub ack_format: Option<AckFormat>,
    pub echo_commands: Option<bool>,
    pub emergency_parser: Option<bool>,
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut IntakeConfig) {
        if let Some(v) = self.queue_capacity {
            config.queue_capacity = v;
        }
        if let Some(v) = self.max_line_length {
            config.max_line_length = v;
        }
        if let Some(v) = self.silence_timeout_ms {
            config.silence_timeout_ms = v;
        }
        if let Some(v) = self.ack_policy {
            config.ack_policy = v;
        }
        if let Some(v) = self.ack_format {
            config.ack_format = v;
        }
        if let Some(v) = self.echo_commands {
            config.echo_commands = v;
        }
        if let Some(v) = self.emergency_parser {
            config.emergency_parser = v;
        }
        if self.port.is_some() {
            config.port = self.port;
        }
        if let Some(v) = self.baud_rate {
            config.baud_rate = v;
        }
    }
}

/// Parse a JSON configuration; missing fields take their defaults
pub fn parse_config(json: &str) -> Result<IntakeConfig> {
    serde_json::from_str(json).context("Failed to parse intake configuration")
}

/// Resolve the configuration once, at startup
pub fn load_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<IntakeConfig> {
    let mut config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            parse_config(&json)?
        }
        None => IntakeConfig::default(),
    };

    overrides.apply(&mut config);
    config.validate().context("Invalid intake configuration")?;
    log::debug!("Intake configuration: {config:?}");
    Ok(config)
}
