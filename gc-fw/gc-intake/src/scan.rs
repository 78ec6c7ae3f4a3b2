//! Byte-level scanning helpers for command lines.
//!
//! Lines are raw bytes; nothing here assumes UTF-8.

/// Line number marker
pub const SEQUENCE_MARKER: u8 = b'N';
/// Checksum separator
pub const CHECKSUM_MARKER: u8 = b'*';
/// Literal that identifies the resynchronization command
pub const RESYNC_LITERAL: &[u8] = b"M110";

/// Skip leading spaces
pub fn skip_spaces(line: &[u8]) -> &[u8] {
    let start = line.iter().position(|&b| b != b' ').unwrap_or(line.len());
    &line[start..]
}

/// Parse a base-10 integer with C `strtol` semantics
///
/// Leading whitespace and an optional sign are accepted, digits are consumed
/// up to the first non-digit, and 0 is returned when there are no digits.
/// Overflow saturates.
pub fn parse_long(bytes: &[u8]) -> i64 {
    let mut iter = bytes
        .iter()
        .copied()
        .skip_while(|b| b.is_ascii_whitespace())
        .peekable();

    let negative = match iter.peek() {
        Some(b'-') => {
            iter.next();
            true
        }
        Some(b'+') => {
            iter.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for b in iter.take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// XOR of every byte in the window
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &b| acc ^ b)
}

/// Position of the first occurrence of `needle` in `haystack`
pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Command body: the leading `N<int>` token and the `*<checksum>` tail removed
///
/// `command` must already have its leading spaces skipped.
pub fn command_body(command: &[u8]) -> &[u8] {
    let end = command
        .iter()
        .position(|&b| b == CHECKSUM_MARKER)
        .unwrap_or(command.len());
    let mut body = &command[..end];

    if body.first() == Some(&SEQUENCE_MARKER) {
        let mut i = 1;
        if matches!(body.get(i), Some(b'-') | Some(b'+')) {
            i += 1;
        }
        while body.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        body = &body[i..];
    }

    trim(body)
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |p| p + 1);
    &bytes[start..end]
}

/// Whether the body's leading token is a movement command (`G0`..`G3`)
pub fn is_movement(body: &[u8]) -> bool {
    match body.split_first() {
        Some((b'G', rest)) if rest.first().is_some_and(u8::is_ascii_digit) => {
            matches!(parse_long(rest), 0..=3)
        }
        _ => false,
    }
}
