//! Serial logger implementation.
//!
//! Routes log records to a raw write function as `echo:` lines, so hosts that
//! understand the protocol show them as informational output.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt::Write;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use gc_model::messages::MSG_ECHO_PREFIX;

/// Raw byte writer for log output
pub type PrintFn = fn(&[u8]);

/// Logger that writes `echo:` lines
pub struct SerialLogger {
    print: PrintFn,
    level: LevelFilter,
}

impl SerialLogger {
    pub fn new(print: PrintFn, level: LevelFilter) -> Self {
        Self { print, level }
    }
}

/// Render one record as a protocol-safe line
pub fn format_record(level: Level, module_path: &str, args: &core::fmt::Arguments<'_>) -> String {
    let mut line = String::new();
    // Writing to a String cannot fail
    let _ = write!(line, "{MSG_ECHO_PREFIX}[{level} {module_path}] {args}");
    // A newline inside the message would start a line the host cannot parse
    let mut line: String = line
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    line.push('\n');
    line
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let module_path = record.module_path().unwrap_or("unknown");
        let line = format_record(record.level(), module_path, record.args());
        (self.print)(line.as_bytes());
    }

    fn flush(&self) {
        // No-op
    }
}

/// Install the serial logger
pub fn init(print: PrintFn, level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = Box::new(SerialLogger::new(print, level));
    log::set_logger(Box::leak(logger)).map(|()| log::set_max_level(level))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::sync::Mutex;
    use std::vec::Vec;

    static CAPTURED: Mutex<Vec<u8>> = Mutex::new(Vec::new());

    fn capture(bytes: &[u8]) {
        CAPTURED.lock().unwrap().extend_from_slice(bytes);
    }

    #[test]
    fn test_format_record() {
        let line = format_record(Level::Warn, "gc_intake::queue", &format_args!("full"));
        assert_eq!(line, "echo:[WARN gc_intake::queue] full\n");
    }

    #[test]
    fn test_embedded_newlines_flattened() {
        let line = format_record(Level::Info, "m", &format_args!("a\nb\rc"));
        assert_eq!(line, "echo:[INFO m] a b c\n");
    }

    #[test]
    fn test_logger_filters_and_writes() {
        let logger = SerialLogger::new(capture, LevelFilter::Info);
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .module_path(Some("x"))
                .args(format_args!("hidden"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Error)
                .module_path(Some("x"))
                .args(format_args!("shown"))
                .build(),
        );
        let captured = std::string::String::from_utf8(CAPTURED.lock().unwrap().clone()).unwrap();
        assert_eq!(captured, "echo:[ERROR x] shown\n");
    }
}
