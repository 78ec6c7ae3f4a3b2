//! Fake serial link for testing and development
//!
//! Input is queued by the test, output is captured for inspection.
//! Can also simulate a disconnected link.

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use super::{SerialError, SerialIo};

/// In-memory serial link
///
/// - `read_byte()` returns queued input bytes, then `None`
/// - `write_byte()` appends to the captured output
pub struct FakeSerial {
    input: VecDeque<u8>,
    output: Vec<u8>,
    connected: bool,
}

impl Default for FakeSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSerial {
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            output: Vec::new(),
            connected: true,
        }
    }

    /// Queue bytes as if the host had sent them
    pub fn push_input(&mut self, data: &[u8]) {
        self.input.extend(data.iter().copied());
    }

    /// Queue a line followed by `\n`
    pub fn push_line(&mut self, line: &str) {
        self.push_input(line.as_bytes());
        self.input.push_back(b'\n');
    }

    /// Bytes queued but not yet read
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Take everything written so far, as raw bytes
    pub fn take_output_bytes(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.output)
    }

    /// Take everything written so far, as text
    pub fn take_output(&mut self) -> String {
        let bytes = self.take_output_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Take everything written so far, split into lines
    pub fn take_lines(&mut self) -> Vec<String> {
        self.take_output().lines().map(String::from).collect()
    }

    /// Make subsequent writes fail
    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

impl SerialIo for FakeSerial {
    fn available(&self) -> usize {
        self.input.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
        if !self.connected {
            return Err(SerialError::Disconnected);
        }
        self.output.push(byte);
        Ok(())
    }

    fn flush_input(&mut self) {
        self.input.clear();
    }
}
