//! Host-side serial links
//!
//! - [`StdioSerial`]: stdin/stdout, read by a background thread so the
//!   control loop never blocks
//! - [`PortSerial`]: a real serial device via `serialport`

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use gc_intake::{SerialError, SerialIo};
use serialport::{ClearBuffer, SerialPort};

/// Read chunk size for both links
const READ_CHUNK: usize = 256;

/// A link the runner can drive to completion
pub trait HostLink: SerialIo {
    /// The host has hung up and no more input will arrive
    fn at_eof(&self) -> bool {
        false
    }
}

/// Input shared between the reader thread and the control loop
#[derive(Default)]
struct InputBuffer {
    bytes: Mutex<VecDeque<u8>>,
    closed: AtomicBool,
}

impl InputBuffer {
    fn lock(&self) -> MutexGuard<'_, VecDeque<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// stdin/stdout link
pub struct StdioSerial {
    input: Arc<InputBuffer>,
    stdout: io::Stdout,
}

impl StdioSerial {
    /// Start the stdin reader thread
    pub fn spawn() -> Self {
        let input = Arc::new(InputBuffer::default());
        let reader = Arc::clone(&input);

        thread::spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                match stdin.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => reader.lock().extend(&chunk[..n]),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        log::warn!("stdin read failed: {e}");
                        break;
                    }
                }
            }
            reader.closed.store(true, Ordering::Release);
            log::debug!("stdin closed");
        });

        Self {
            input,
            stdout: io::stdout(),
        }
    }
}

impl SerialIo for StdioSerial {
    fn available(&self) -> usize {
        self.input.lock().len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.input.lock().pop_front()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
        self.write_all(&[byte])
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        let mut out = self.stdout.lock();
        out.write_all(data)
            .and_then(|()| out.flush())
            .map_err(|_| SerialError::WriteFailed)
    }

    fn flush_input(&mut self) {
        self.input.lock().clear();
    }
}

impl HostLink for StdioSerial {
    fn at_eof(&self) -> bool {
        self.input.closed.load(Ordering::Acquire)
    }
}

/// Serial device link
pub struct PortSerial {
    port: Box<dyn SerialPort>,
    pending: VecDeque<u8>,
}

impl PortSerial {
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_millis(10))
            .open()
            .with_context(|| format!("Failed to open serial port {path}"))?;
        log::info!("Opened {path} @ {baud_rate} baud");
        Ok(Self {
            port,
            pending: VecDeque::new(),
        })
    }

    /// Move whatever the driver holds into the local buffer
    fn fill(&mut self) {
        let ready = self.port.bytes_to_read().unwrap_or(0) as usize;
        if ready == 0 {
            return;
        }
        let mut chunk = [0u8; READ_CHUNK];
        let want = ready.min(READ_CHUNK);
        match self.port.read(&mut chunk[..want]) {
            Ok(n) => self.pending.extend(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => log::warn!("Serial read failed: {e}"),
        }
    }
}

impl SerialIo for PortSerial {
    fn available(&self) -> usize {
        let driver = self.port.bytes_to_read().unwrap_or(0) as usize;
        self.pending.len() + driver
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.pending.is_empty() {
            self.fill();
        }
        self.pending.pop_front()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
        self.write_all(&[byte])
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.port
            .write_all(data)
            .and_then(|()| self.port.flush())
            .map_err(|e| {
                if e.kind() == io::ErrorKind::BrokenPipe {
                    SerialError::Disconnected
                } else {
                    SerialError::WriteFailed
                }
            })
    }

    fn flush_input(&mut self) {
        self.pending.clear();
        if let Err(e) = self.port.clear(ClearBuffer::Input) {
            log::warn!("Failed to clear serial input: {e}");
        }
    }
}

impl HostLink for PortSerial {}
