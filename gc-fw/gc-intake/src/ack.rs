//! Host-facing handshake
//!
//! Every line the host sends gets exactly one outcome on the wire: an `ok`
//! when it has been consumed, or an error line (plus `Resend:` and `ok` when
//! the host has to retransmit).

use gc_model::{AckFormat, HostResponse, ProtocolError, SequenceNumber};

use crate::transport::SerialIo;

/// Writes responses to the serial link
pub struct Acknowledger {
    format: AckFormat,
}

impl Acknowledger {
    pub fn new(format: AckFormat) -> Self {
        Self { format }
    }

    /// Write one response line
    ///
    /// Transport errors are logged and otherwise ignored; the host will time
    /// out and resend.
    pub fn send<S: SerialIo>(&self, serial: &mut S, response: HostResponse) {
        log::trace!("-> {response}");
        if let Err(e) = serial.write_all(&response.encode()) {
            log::warn!("Failed to send '{response}': {e}");
        }
    }

    pub fn start<S: SerialIo>(&self, serial: &mut S) {
        self.send(serial, HostResponse::Start);
    }

    /// Ready for more
    pub fn acknowledge<S: SerialIo>(
        &self,
        serial: &mut S,
        sequence: Option<SequenceNumber>,
        free_slots: usize,
    ) {
        let response = match self.format {
            AckFormat::Plain => HostResponse::Ok,
            AckFormat::Advanced => HostResponse::OkAdvanced {
                sequence,
                free_slots,
            },
        };
        self.send(serial, response);
    }

    /// Report a rejected line
    ///
    /// Writes the error line; for errors that need a retransmission also
    /// writes `Resend: <last + 1>` and `ok`. Returns whether a resend was
    /// requested so the caller can drop pending input.
    pub fn reject<S: SerialIo>(
        &self,
        serial: &mut S,
        error: ProtocolError,
        last_accepted: SequenceNumber,
    ) -> bool {
        self.send(
            serial,
            HostResponse::LineError {
                error,
                last_line: last_accepted,
            },
        );
        if !error.requests_resend() {
            return false;
        }
        self.send(serial, HostResponse::Resend(last_accepted.saturating_add(1)));
        self.send(serial, HostResponse::Ok);
        true
    }

    /// Report an emergency command that was applied during validation
    ///
    /// Writes the message its effect produced, then the `ok` a numbered line
    /// is owed.
    pub fn out_of_band<S: SerialIo>(
        &self,
        serial: &mut S,
        response: Option<HostResponse>,
        ack: Option<(Option<SequenceNumber>, usize)>,
    ) {
        if let Some(response) = response {
            self.send(serial, response);
        }
        if let Some((sequence, free_slots)) = ack {
            self.acknowledge(serial, sequence, free_slots);
        }
    }

    /// Idle notice
    pub fn wait_notice<S: SerialIo>(&self, serial: &mut S) {
        self.send(serial, HostResponse::Wait);
    }

    pub fn echo<S: SerialIo>(&self, serial: &mut S, bytes: &[u8]) {
        self.send(serial, HostResponse::Echo(bytes.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use crate::transport::FakeSerial;
    use alloc::vec;

    #[test]
    fn test_plain_ok() {
        let mut serial = FakeSerial::new();
        Acknowledger::new(AckFormat::Plain).acknowledge(&mut serial, Some(3), 2);
        assert_eq!(serial.take_output(), "ok\n");
    }

    #[test]
    fn test_advanced_ok() {
        let mut serial = FakeSerial::new();
        Acknowledger::new(AckFormat::Advanced).acknowledge(&mut serial, Some(3), 2);
        assert_eq!(serial.take_output(), "ok N3 B2\n");
    }

    #[test]
    fn test_reject_with_resend() {
        let mut serial = FakeSerial::new();
        let ack = Acknowledger::new(AckFormat::Plain);
        let resend = ack.reject(
            &mut serial,
            ProtocolError::SequenceMismatch {
                expected: 5,
                received: 7,
            },
            4,
        );
        assert!(resend);
        assert_eq!(
            serial.take_lines(),
            vec![
                "Error:Line Number is not Last Line Number+1, Last Line: 4",
                "Resend: 5",
                "ok",
            ]
        );
    }

    #[test]
    fn test_reject_without_resend() {
        let mut serial = FakeSerial::new();
        let ack = Acknowledger::new(AckFormat::Plain);
        let resend = ack.reject(&mut serial, ProtocolError::SequenceRequiredWithChecksum, 9);
        assert!(!resend);
        assert_eq!(
            serial.take_lines(),
            vec!["Error:No Line Number with checksum, Last Line: 9"]
        );
    }

    #[test]
    fn test_out_of_band_message_then_ok() {
        let mut serial = FakeSerial::new();
        let ack = Acknowledger::new(AckFormat::Advanced);
        ack.out_of_band(&mut serial, Some(HostResponse::Killed), Some((Some(12), 3)));
        assert_eq!(
            serial.take_lines(),
            vec!["Error:Printer halted. killed() called!!", "ok N12 B3"]
        );

        ack.out_of_band(&mut serial, None, None);
        assert!(serial.take_output().is_empty());
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let mut serial = FakeSerial::new();
        serial.disconnect();
        Acknowledger::new(AckFormat::Plain).wait_notice(&mut serial);
        assert!(serial.take_output().is_empty());
    }
}
