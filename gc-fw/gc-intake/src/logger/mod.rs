//! Logging infrastructure for gc-intake.
//!
//! Hosted builds use `env_logger`. On a controller the serial link is the
//! only output, so [`serial`] renders `log` records through a caller-supplied
//! write function.

pub mod serial;

pub use serial::{PrintFn, SerialLogger, init as init_serial_logger};
