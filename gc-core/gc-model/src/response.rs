//! Host-facing responses
//!
//! Each response renders to exactly one text line. `Display` produces the line
//! without its terminator; [`HostResponse::to_line`] appends `\n`.
//! [`HostResponse::encode`] gives the exact bytes for the wire.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::command::SequenceNumber;
use crate::error::ProtocolError;
use crate::messages;

/// A single line sent to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostResponse {
    /// Sent once when the control loop starts
    Start,
    /// Ready for more
    Ok,
    /// Ready for more, with the line number and free queue slots
    OkAdvanced {
        sequence: Option<SequenceNumber>,
        free_slots: usize,
    },
    /// Retransmit starting at this line
    Resend(SequenceNumber),
    /// A rejected line
    LineError {
        error: ProtocolError,
        last_line: SequenceNumber,
    },
    /// Halt command received
    Killed,
    /// Idle notice: queue empty and the host has been silent
    Wait,
    /// Debug echo of a dispatched command, bytes as received
    Echo(Vec<u8>),
}

impl HostResponse {
    /// Rendered line including the `\n` terminator
    pub fn to_line(&self) -> String {
        use alloc::format;
        format!("{self}\n")
    }

    /// Wire bytes including the `\n` terminator
    ///
    /// Same as [`HostResponse::to_line`] except that an echo carries the
    /// command bytes unchanged.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            HostResponse::Echo(bytes) => {
                let prefix = messages::MSG_ECHO_PREFIX.as_bytes();
                let mut line = Vec::with_capacity(prefix.len() + bytes.len() + 1);
                line.extend_from_slice(prefix);
                line.extend_from_slice(bytes);
                line.push(b'\n');
                line
            }
            other => other.to_line().into_bytes(),
        }
    }
}

impl fmt::Display for HostResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostResponse::Start => f.write_str(messages::MSG_START),
            HostResponse::Ok => f.write_str(messages::MSG_OK),
            HostResponse::OkAdvanced {
                sequence,
                free_slots,
            } => {
                f.write_str(messages::MSG_OK)?;
                if let Some(n) = sequence {
                    write!(f, " N{n}")?;
                }
                write!(f, " B{free_slots}")
            }
            HostResponse::Resend(n) => write!(f, "{}{n}", messages::MSG_RESEND),
            HostResponse::LineError { error, last_line } => {
                f.write_str(messages::MSG_ERROR_PREFIX)?;
                f.write_str(error.host_message())?;
                if error.reports_last_line() {
                    write!(f, "{last_line}")?;
                }
                Ok(())
            }
            HostResponse::Killed => {
                write!(f, "{}{}", messages::MSG_ERROR_PREFIX, messages::MSG_ERR_KILLED)
            }
            HostResponse::Wait => f.write_str(messages::MSG_WAIT),
            HostResponse::Echo(bytes) => write!(
                f,
                "{}{}",
                messages::MSG_ECHO_PREFIX,
                String::from_utf8_lossy(bytes)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_resend_line() {
        assert_eq!(HostResponse::Resend(5).to_line(), "Resend: 5\n");
    }

    #[test]
    fn test_line_error_includes_last_line() {
        let resp = HostResponse::LineError {
            error: ProtocolError::SequenceMismatch {
                expected: 5,
                received: 7,
            },
            last_line: 4,
        };
        assert_eq!(
            resp.to_string(),
            "Error:Line Number is not Last Line Number+1, Last Line: 4"
        );
    }

    #[test]
    fn test_stopped_error_has_no_line_number() {
        let resp = HostResponse::LineError {
            error: ProtocolError::MovementWhileStopped,
            last_line: 9,
        };
        let text = resp.to_string();
        assert!(text.starts_with("Error:Printer stopped due to errors."));
        assert!(!text.ends_with('9'));
    }

    #[test]
    fn test_advanced_ok() {
        let resp = HostResponse::OkAdvanced {
            sequence: Some(12),
            free_slots: 3,
        };
        assert_eq!(resp.to_string(), "ok N12 B3");

        let resp = HostResponse::OkAdvanced {
            sequence: None,
            free_slots: 0,
        };
        assert_eq!(resp.to_string(), "ok B0");
    }

    #[test]
    fn test_killed_and_echo() {
        assert_eq!(
            HostResponse::Killed.to_string(),
            "Error:Printer halted. killed() called!!"
        );
        assert_eq!(HostResponse::Echo(b"G28".to_vec()).to_string(), "echo:G28");
    }

    #[test]
    fn test_encode() {
        assert_eq!(HostResponse::Ok.encode(), b"ok\n");
        assert_eq!(
            HostResponse::Echo(b"M117 \xff".to_vec()).encode(),
            b"echo:M117 \xff\n"
        );
    }
}
