//! Line assembly from the raw serial byte stream.
//!
//! Bytes are fed one at a time. Comments (`;` to end of line) are dropped,
//! `\` makes the following byte literal, and either `\n` or `\r` closes the
//! line. Blank lines produce nothing.

extern crate alloc;

use alloc::vec::Vec;

pub const ESCAPE: u8 = b'\\';
pub const COMMENT_START: u8 = b';';

/// Whether `byte` closes a line
pub fn is_terminator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// A line closed by a terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedLine {
    /// Stored bytes, terminator excluded
    pub bytes: Vec<u8>,
    /// Bytes were discarded because the length limit was reached
    pub truncated: bool,
}

impl CompletedLine {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Accumulates bytes into lines
///
/// Stores at most `max_line_length - 1` bytes per line. Once the limit is
/// reached further bytes are discarded, but the terminator still closes the
/// line and the truncated content is emitted.
pub struct LineAssembler {
    buffer: Vec<u8>,
    max_line_length: usize,
    in_comment: bool,
    truncated: bool,
}

impl LineAssembler {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_line_length),
            max_line_length,
            in_comment: false,
            truncated: false,
        }
    }

    /// Feed one byte
    ///
    /// `next_byte` is only called when `byte` is the escape character; it
    /// should return the next byte if one is available right now. An escape
    /// with nothing following it is dropped.
    pub fn feed<F>(&mut self, byte: u8, next_byte: F) -> Option<CompletedLine>
    where
        F: FnOnce() -> Option<u8>,
    {
        if is_terminator(byte) {
            // A comment never spans lines
            self.in_comment = false;
            if self.buffer.is_empty() {
                self.truncated = false;
                return None;
            }
            let line = CompletedLine {
                bytes: core::mem::replace(
                    &mut self.buffer,
                    Vec::with_capacity(self.max_line_length),
                ),
                truncated: self.truncated,
            };
            self.truncated = false;
            return Some(line);
        }

        if self.buffer.len() >= self.max_line_length.saturating_sub(1) {
            if !self.in_comment {
                log::trace!("Line limit reached, discarding byte {byte:#04x}");
                self.truncated = true;
            }
            return None;
        }

        if byte == ESCAPE {
            if let Some(literal) = next_byte() {
                if !self.in_comment {
                    self.buffer.push(literal);
                }
            }
            return None;
        }

        if byte == COMMENT_START {
            self.in_comment = true;
            return None;
        }

        if !self.in_comment {
            self.buffer.push(byte);
        }
        None
    }

    /// Feed a slice, collecting every completed line
    ///
    /// Escapes look ahead within the slice only.
    pub fn feed_slice(&mut self, bytes: &[u8]) -> Vec<CompletedLine> {
        let mut lines = Vec::new();
        let mut iter = bytes.iter().copied();
        while let Some(byte) = iter.next() {
            if let Some(line) = self.feed(byte, || iter.next()) {
                lines.push(line);
            }
        }
        lines
    }

    /// Drop the partial line and leave comment mode
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.in_comment = false;
        self.truncated = false;
    }

    /// Bytes stored for the current line
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn in_comment(&self) -> bool {
        self.in_comment
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::vec;

    fn lines(assembler: &mut LineAssembler, input: &[u8]) -> Vec<Vec<u8>> {
        assembler
            .feed_slice(input)
            .into_iter()
            .map(|l| l.bytes)
            .collect()
    }

    #[test]
    fn test_both_terminators_close_lines() {
        let mut asm = LineAssembler::new(96);
        assert_eq!(
            lines(&mut asm, b"G28\nG1 X1\rM105\r\n"),
            vec![b"G28".to_vec(), b"G1 X1".to_vec(), b"M105".to_vec()]
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut asm = LineAssembler::new(96);
        assert!(lines(&mut asm, b"\n\r\n\n").is_empty());
    }

    #[test]
    fn test_partial_line_kept_across_calls() {
        let mut asm = LineAssembler::new(96);
        assert!(lines(&mut asm, b"G1 X").is_empty());
        assert_eq!(asm.len(), 4);
        assert_eq!(lines(&mut asm, b"10\n"), vec![b"G1 X10".to_vec()]);
        assert!(asm.is_empty());
    }

    #[test]
    fn test_comment_stripped_and_reset_at_eol() {
        let mut asm = LineAssembler::new(96);
        assert_eq!(
            lines(&mut asm, b"G1 X1 ; move\nG28\n"),
            vec![b"G1 X1 ".to_vec(), b"G28".to_vec()]
        );
        assert!(!asm.in_comment());
    }

    #[test]
    fn test_comment_only_line_is_blank() {
        let mut asm = LineAssembler::new(96);
        assert!(lines(&mut asm, b"; just a comment\n").is_empty());
    }

    #[test]
    fn test_escape_makes_next_byte_literal() {
        let mut asm = LineAssembler::new(96);
        assert_eq!(
            lines(&mut asm, b"M117 a\\;b\\\\c\n"),
            vec![b"M117 a;b\\c".to_vec()]
        );
    }

    #[test]
    fn test_escaped_terminator_is_stored() {
        let mut asm = LineAssembler::new(96);
        assert_eq!(lines(&mut asm, b"M117 x\\\ny\n"), vec![b"M117 x\ny".to_vec()]);
    }

    #[test]
    fn test_escape_inside_comment_discarded() {
        let mut asm = LineAssembler::new(96);
        // The escaped newline is swallowed as comment content, so the
        // comment runs on to the next real terminator
        assert_eq!(lines(&mut asm, b"G1;c\\\nX\nM105\n"), vec![b"G1".to_vec(), b"M105".to_vec()]);
    }

    #[test]
    fn test_trailing_escape_without_next_byte_dropped() {
        let mut asm = LineAssembler::new(96);
        assert!(asm.feed(b'\\', || None).is_none());
        assert!(asm.is_empty());
        assert_eq!(lines(&mut asm, b"G4\n"), vec![b"G4".to_vec()]);
    }

    #[test]
    fn test_truncation_keeps_prefix_and_terminates() {
        let mut asm = LineAssembler::new(5);
        let out = asm.feed_slice(b"G1 X100 Y200\nG28\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bytes, b"G1 X".to_vec());
        assert!(out[0].truncated);
        assert_eq!(out[1].bytes, b"G28".to_vec());
        assert!(!out[1].truncated);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut asm = LineAssembler::new(96);
        lines(&mut asm, b"G1 ; half");
        assert!(asm.in_comment());
        asm.clear();
        assert!(asm.is_empty());
        assert!(!asm.in_comment());
        assert_eq!(lines(&mut asm, b"M105\n"), vec![b"M105".to_vec()]);
    }
}
