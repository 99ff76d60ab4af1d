//! Input line state

use tracing::warn;

use crate::core::{decode_utf8, DecodeError, REPLACEMENT};

/// What keystrokes currently mean
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// Single keys are hotkeys
    #[default]
    Hotkey,
    /// Bytes build a command line, submitted with Enter
    Command,
    /// Bytes build a search query, submitted with Enter
    Search,
}

impl InputMode {
    /// Prompt echoed at the start of the input line
    pub fn prompt(self) -> &'static str {
        match self {
            InputMode::Hotkey => "",
            InputMode::Command => ":",
            InputMode::Search => "/",
        }
    }
}

/// The text being typed on the input line
///
/// Bytes arrive one at a time and are assembled into scalar values. An
/// incomplete sequence is held back until it completes; a malformed one
/// becomes U+FFFD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub mode: InputMode,
    pub buffer: String,
    pending: Vec<u8>,
}

impl InputState {
    /// Switch mode, discarding any partial line
    pub fn enter(&mut self, mode: InputMode) {
        self.mode = mode;
        self.clear();
    }

    /// Feed one byte. Returns true if a character was appended.
    pub fn push_byte(&mut self, byte: u8) -> bool {
        if !self.pending.is_empty() && byte & 0xC0 != 0x80 {
            // Sequence cut short by a byte that starts something new
            warn!(pending = ?self.pending, "Incomplete UTF-8 sequence in input");
            self.pending.clear();
            self.buffer.push(REPLACEMENT);
            self.push_byte(byte);
            return true;
        }

        self.pending.push(byte);
        match decode_utf8(&self.pending, 0) {
            Ok((ch, _)) => {
                self.pending.clear();
                self.buffer.push(ch);
                true
            }
            Err(DecodeError::Truncated { .. }) => false,
            Err(e) => {
                warn!(error = %e, "Malformed input byte");
                self.pending.clear();
                self.buffer.push(REPLACEMENT);
                true
            }
        }
    }

    /// Delete the last character, or a held-back partial sequence
    pub fn backspace(&mut self) {
        if !self.pending.is_empty() {
            self.pending.clear();
        } else {
            self.buffer.pop();
        }
    }

    /// Take the line and return to hotkey mode
    pub fn submit(&mut self) -> String {
        let line = std::mem::take(&mut self.buffer);
        self.pending.clear();
        self.mode = InputMode::Hotkey;
        line
    }

    /// Drop the line and return to hotkey mode
    pub fn cancel(&mut self) {
        self.enter(InputMode::Hotkey);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending.clear();
    }

    /// True while a multi-byte sequence is incomplete
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(state: &mut InputState, bytes: &[u8]) {
        for &b in bytes {
            state.push_byte(b);
        }
    }

    #[test]
    fn test_ascii() {
        let mut s = InputState::default();
        assert!(s.push_byte(b'a'));
        assert!(s.push_byte(b'b'));
        assert_eq!(s.buffer, "ab");
    }

    #[test]
    fn test_multibyte_waits_for_completion() {
        let mut s = InputState::default();
        let bytes = "é中🎵".as_bytes();
        assert!(!s.push_byte(bytes[0]));
        assert!(s.has_pending());
        assert!(s.push_byte(bytes[1]));
        feed(&mut s, &bytes[2..]);
        assert_eq!(s.buffer, "é中🎵");
        assert!(!s.has_pending());
    }

    #[test]
    fn test_invalid_lead_byte_is_replaced() {
        let mut s = InputState::default();
        feed(&mut s, &[b'a', 0x80, b'b', 0xFF]);
        assert_eq!(s.buffer, "a\u{FFFD}b\u{FFFD}");
    }

    #[test]
    fn test_overlong_input_is_replaced() {
        let mut s = InputState::default();
        // C0 AF is an overlong '/', E0 80 AF another
        feed(&mut s, &[0xC0, 0xAF, b'a', 0xE0, 0x80, 0xAF]);
        assert_eq!(s.buffer, "\u{FFFD}\u{FFFD}a\u{FFFD}");
        assert!(!s.has_pending());
    }

    #[test]
    fn test_interrupted_sequence_keeps_next_byte() {
        let mut s = InputState::default();
        feed(&mut s, &[0xE4, 0xB8, b'x']);
        assert_eq!(s.buffer, "\u{FFFD}x");
    }

    #[test]
    fn test_backspace() {
        let mut s = InputState::default();
        feed(&mut s, "a中".as_bytes());
        s.backspace();
        assert_eq!(s.buffer, "a");

        s.push_byte(0xE4);
        s.backspace();
        assert!(!s.has_pending());
        assert_eq!(s.buffer, "a");
    }

    #[test]
    fn test_submit_and_cancel_return_to_hotkey() {
        let mut s = InputState::default();
        s.enter(InputMode::Search);
        feed(&mut s, b"abba");
        assert_eq!(s.submit(), "abba");
        assert_eq!(s.mode, InputMode::Hotkey);
        assert!(s.buffer.is_empty());

        s.enter(InputMode::Command);
        feed(&mut s, b"quit");
        s.cancel();
        assert_eq!(s.mode, InputMode::Hotkey);
        assert!(s.buffer.is_empty());
    }

    #[test]
    fn test_prompts() {
        assert_eq!(InputMode::Hotkey.prompt(), "");
        assert_eq!(InputMode::Command.prompt(), ":");
        assert_eq!(InputMode::Search.prompt(), "/");
    }
}
