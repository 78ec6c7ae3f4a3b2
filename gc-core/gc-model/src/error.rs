//! Error types for the command intake

use core::fmt;

use crate::command::SequenceNumber;
use crate::messages;

/// Line-level protocol error
///
/// Each variant rejects exactly one line. None of them mutate sequence state
/// or the command queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Line number is not `lastAccepted + 1`
    SequenceMismatch {
        expected: SequenceNumber,
        received: SequenceNumber,
    },
    /// XOR of the line does not match the `*<checksum>` value
    ChecksumMismatch { computed: u8, received: i64 },
    /// Numbered line without a checksum
    MissingChecksum,
    /// Checksum without a line number
    SequenceRequiredWithChecksum,
    /// Movement command received while stopped
    MovementWhileStopped,
}

impl ProtocolError {
    /// Whether the host must retransmit from `lastAccepted + 1`
    pub fn requests_resend(&self) -> bool {
        matches!(
            self,
            ProtocolError::SequenceMismatch { .. }
                | ProtocolError::ChecksumMismatch { .. }
                | ProtocolError::MissingChecksum
        )
    }

    /// Whether the host message carries the last accepted line number
    pub fn reports_last_line(&self) -> bool {
        !matches!(self, ProtocolError::MovementWhileStopped)
    }

    /// Literal message text sent to the host
    pub fn host_message(&self) -> &'static str {
        match self {
            ProtocolError::SequenceMismatch { .. } => messages::MSG_ERR_LINE_NO,
            ProtocolError::ChecksumMismatch { .. } => messages::MSG_ERR_CHECKSUM_MISMATCH,
            ProtocolError::MissingChecksum => messages::MSG_ERR_NO_CHECKSUM,
            ProtocolError::SequenceRequiredWithChecksum => {
                messages::MSG_ERR_NO_LINENUMBER_WITH_CHECKSUM
            }
            ProtocolError::MovementWhileStopped => messages::MSG_ERR_STOPPED,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::SequenceMismatch { expected, received } => {
                write!(f, "Sequence mismatch: expected {expected}, received {received}")
            }
            ProtocolError::ChecksumMismatch { computed, received } => {
                write!(f, "Checksum mismatch: computed {computed}, received {received}")
            }
            ProtocolError::MissingChecksum => write!(f, "Line number without checksum"),
            ProtocolError::SequenceRequiredWithChecksum => {
                write!(f, "Checksum without line number")
            }
            ProtocolError::MovementWhileStopped => write!(f, "Movement command while stopped"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

/// The command queue has no free slot
///
/// A stall condition, not a line-level error; never reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command queue is full")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for QueueFull {}

/// Configuration rejected by the startup sanity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Queue capacity outside `1..=255`
    QueueCapacity(usize),
    /// Line length limit below 2 (room for one byte plus terminator)
    MaxLineLength(usize),
    /// Baud rate not in the supported list
    BaudRate(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::QueueCapacity(n) => {
                write!(f, "queue_capacity must be between 1 and 255, got {n}")
            }
            ConfigError::MaxLineLength(n) => {
                write!(f, "max_line_length must be at least 2, got {n}")
            }
            ConfigError::BaudRate(b) => write!(f, "Unsupported baud rate: {b}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resend_classification() {
        assert!(
            ProtocolError::SequenceMismatch {
                expected: 5,
                received: 7
            }
            .requests_resend()
        );
        assert!(
            ProtocolError::ChecksumMismatch {
                computed: 1,
                received: 2
            }
            .requests_resend()
        );
        assert!(ProtocolError::MissingChecksum.requests_resend());
        assert!(!ProtocolError::SequenceRequiredWithChecksum.requests_resend());
        assert!(!ProtocolError::MovementWhileStopped.requests_resend());
    }

    #[test]
    fn test_host_messages() {
        assert_eq!(
            ProtocolError::MissingChecksum.host_message(),
            "No Checksum with line number, Last Line: "
        );
        assert!(!ProtocolError::MovementWhileStopped.reports_last_line());
        assert!(ProtocolError::SequenceRequiredWithChecksum.reports_last_line());
    }
}
