//! Serial transport seam
//!
//! The physical link is an external collaborator. The intake only needs to
//! know whether a byte is available, read one without blocking, write bytes
//! and drop unread input when it asks the host to resend.

pub mod fake;

pub use fake::FakeSerial;

use core::fmt;

/// Error from the serial link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// The link went away
    Disconnected,
    /// Write could not complete
    WriteFailed,
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialError::Disconnected => write!(f, "Serial link disconnected"),
            SerialError::WriteFailed => write!(f, "Serial write failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SerialError {}

/// Raw byte link to the host
///
/// All methods are non-blocking.
pub trait SerialIo {
    /// Number of bytes ready to read
    fn available(&self) -> usize;

    /// Read one byte, `None` if nothing is ready
    fn read_byte(&mut self) -> Option<u8>;

    /// Send one byte
    fn write_byte(&mut self, byte: u8) -> Result<(), SerialError>;

    /// Send a buffer
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Discard input that has arrived but not been read
    fn flush_input(&mut self) {
        while self.read_byte().is_some() {}
    }
}
