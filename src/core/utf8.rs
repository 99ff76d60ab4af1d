//! UTF-8 codec for glyph cells
//!
//! Encoding follows RFC 3629 exactly. Decoding reports malformed input as a
//! [`DecodeError`] and never consumes bytes on failure; decoded values that
//! are not Unicode scalar values become U+FFFD.

use std::ops::Deref;

/// The replacement character substituted for any invalid scalar
pub const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Error decoding a single UTF-8 sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("offset {offset} is past the end of a {len}-byte input")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("sequence at offset {offset} needs {needed} bytes but only {available} remain")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("byte at offset {offset} is not a continuation byte")]
    InvalidContinuation { offset: usize },

    #[error("byte {byte:#04x} at offset {offset} is not a valid leading byte")]
    InvalidLeadByte { offset: usize, byte: u8 },

    #[error("sequence at offset {offset} is an overlong encoding")]
    Overlong { offset: usize },
}

/// The encoded form of one scalar value: 1 to 4 bytes, stored inline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Bytes {
    buf: [u8; 4],
    len: u8,
}

impl Utf8Bytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

impl Deref for Utf8Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Map a raw code point to a scalar value, substituting U+FFFD for surrogate
/// halves and anything above U+10FFFF
pub fn normalize_scalar(codepoint: u32) -> char {
    char::from_u32(codepoint).unwrap_or(REPLACEMENT)
}

/// Encode a scalar value as UTF-8
pub fn encode_utf8(ch: char) -> Utf8Bytes {
    let code = ch as u32;
    let mut buf = [0u8; 4];
    let len = if code <= 0x7F {
        buf[0] = code as u8;
        1
    } else if code <= 0x7FF {
        buf[0] = 0xC0 | ((code >> 6) & 0x1F) as u8;
        buf[1] = 0x80 | (code & 0x3F) as u8;
        2
    } else if code <= 0xFFFF {
        buf[0] = 0xE0 | ((code >> 12) & 0x0F) as u8;
        buf[1] = 0x80 | ((code >> 6) & 0x3F) as u8;
        buf[2] = 0x80 | (code & 0x3F) as u8;
        3
    } else {
        buf[0] = 0xF0 | ((code >> 18) & 0x07) as u8;
        buf[1] = 0x80 | ((code >> 12) & 0x3F) as u8;
        buf[2] = 0x80 | ((code >> 6) & 0x3F) as u8;
        buf[3] = 0x80 | (code & 0x3F) as u8;
        4
    };
    Utf8Bytes { buf, len }
}

/// Encode a raw code point, normalizing invalid values first
pub fn encode_scalar(codepoint: u32) -> Utf8Bytes {
    encode_utf8(normalize_scalar(codepoint))
}

/// Length of the sequence introduced by `lead`, or `None` for a byte that
/// cannot start a sequence.
///
/// C0 and C1 only ever start overlong forms of ASCII, and F5 and above would
/// encode values past U+13FFFF.
fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Smallest value that needs a sequence of `len` bytes
fn min_scalar(len: usize) -> u32 {
    match len {
        2 => 0x80,
        3 => 0x800,
        _ => 0x1_0000,
    }
}

/// Decode one sequence starting at `offset`.
///
/// Returns the scalar value and the number of bytes it occupied.
pub fn decode_utf8(bytes: &[u8], offset: usize) -> Result<(char, usize), DecodeError> {
    let lead = *bytes.get(offset).ok_or(DecodeError::OffsetOutOfRange {
        offset,
        len: bytes.len(),
    })?;

    let needed = sequence_len(lead).ok_or(DecodeError::InvalidLeadByte { offset, byte: lead })?;
    if needed == 1 {
        return Ok((lead as char, 1));
    }

    let available = bytes.len() - offset;
    if available < needed {
        return Err(DecodeError::Truncated {
            offset,
            needed,
            available,
        });
    }

    let lead_bits = match needed {
        2 => lead & 0x1F,
        3 => lead & 0x0F,
        _ => lead & 0x07,
    };
    let mut code = lead_bits as u32;
    for i in 1..needed {
        let byte = bytes[offset + i];
        if byte & 0xC0 != 0x80 {
            return Err(DecodeError::InvalidContinuation { offset: offset + i });
        }
        code = (code << 6) | (byte & 0x3F) as u32;
    }
    if code < min_scalar(needed) {
        return Err(DecodeError::Overlong { offset });
    }

    Ok((normalize_scalar(code), needed))
}

/// Iterator over the scalar values of a byte string, yielding U+FFFD for
/// each byte that cannot start a well-formed sequence
pub struct DecodeLossy<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Iterator for DecodeLossy<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        match decode_utf8(self.bytes, self.offset) {
            Ok((ch, consumed)) => {
                self.offset += consumed;
                Some(ch)
            }
            Err(_) => {
                self.offset += 1;
                Some(REPLACEMENT)
            }
        }
    }
}

/// Decode a whole byte string, recovering from malformed sequences
pub fn decode_lossy(bytes: &[u8]) -> DecodeLossy<'_> {
    DecodeLossy { bytes, offset: 0 }
}
