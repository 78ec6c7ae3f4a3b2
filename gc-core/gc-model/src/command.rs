//! Commands accepted by the line validator.

extern crate alloc;

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Host-assigned line number (`N<int>`).
///
/// Parsed with `strtol` semantics, so it may be negative or zero.
pub type SequenceNumber = i64;

/// A validated command waiting in the queue
///
/// The bytes are the complete line as assembled (comments stripped, escapes
/// resolved), including any `N<int>` prefix and `*<checksum>` suffix. The
/// executor's own parser is responsible for skipping those. Bytes are kept
/// as received; an escape can make any byte literal, UTF-8 or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// Command line as received
    pub bytes: Vec<u8>,
    /// Emit the "ready" handshake after this command has been dispatched
    pub wants_ack: bool,
    /// Line number the command arrived with, if any
    pub sequence: Option<SequenceNumber>,
}

impl ParsedCommand {
    pub fn new(bytes: impl Into<Vec<u8>>, wants_ack: bool, sequence: Option<SequenceNumber>) -> Self {
        Self {
            bytes: bytes.into(),
            wants_ack,
            sequence,
        }
    }

    /// Unnumbered command without acknowledgment
    pub fn plain(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, false, None)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Text for logs and display; invalid UTF-8 is replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}
