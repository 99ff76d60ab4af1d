//! Input Module
//!
//! Turns raw keyboard bytes into input-line edits and application events.
//!
//! # Modes
//!
//! - Hotkey: printable keys are reported as [`InputEvent::Hotkey`]; `:` and
//!   `/` open the command and search lines; the quit key stops the renderer
//! - Command / Search: bytes are assembled into UTF-8 text on the input line;
//!   Enter submits, Backspace deletes, Esc cancels
//!
//! Ctrl-C and Ctrl-D quit from any mode. The input line lives inside the
//! renderer's lock, so every edit is echoed on the next frame.

mod handler;
mod state;

pub use handler::{ByteSource, InputError, InputHandler, InputThread, ReadOutcome};
pub use state::{InputMode, InputState};

/// Something the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Hotkey(char),
    Command(String),
    Search(String),
    Quit,
}
