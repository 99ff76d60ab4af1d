//! Terminal access
//!
//! Raw mode for stdin, a polling byte reader on top of it, and the window
//! size query. Unix only.

use std::io;
use std::time::Duration;

use nix::errno::Errno;
use nix::libc;
use nix::poll::{poll, PollFd, PollFlags};
use nix::sys::termios::{self, InputFlags, LocalFlags, SetArg, SpecialCharacterIndices, Termios};
use thiserror::Error;
use tracing::{debug, warn};

use crate::input::{ByteSource, ReadOutcome};

/// Terminal errors
#[derive(Debug, Error)]
pub enum TtyError {
    #[error("failed to read terminal attributes: {0}")]
    GetAttr(#[source] nix::Error),

    #[error("failed to set terminal attributes: {0}")]
    SetAttr(#[source] nix::Error),

    #[error("poll failed: {0}")]
    Poll(#[source] nix::Error),

    #[error("read failed: {0}")]
    Read(#[source] nix::Error),
}

impl From<TtyError> for io::Error {
    fn from(err: TtyError) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

/// Keeps stdin in raw mode; the previous settings are restored on drop.
///
/// Input is unbuffered and not echoed, and signal keys arrive as bytes.
pub struct RawModeGuard {
    original: Termios,
}

impl RawModeGuard {
    pub fn new() -> Result<Self, TtyError> {
        let stdin = io::stdin();
        let original = termios::tcgetattr(&stdin).map_err(TtyError::GetAttr)?;

        let mut raw = original.clone();
        raw.local_flags.remove(
            LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG | LocalFlags::IEXTEN,
        );
        raw.input_flags.remove(InputFlags::ICRNL | InputFlags::IXON);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

        termios::tcsetattr(&stdin, SetArg::TCSANOW, &raw).map_err(TtyError::SetAttr)?;
        debug!("Entered raw mode");
        Ok(Self { original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &self.original) {
            warn!(error = %e, "Failed to restore terminal mode");
        } else {
            debug!("Restored terminal mode");
        }
    }
}

/// Stdin in raw mode as a [`ByteSource`].
///
/// Each read waits at most `poll_interval` and reports [`ReadOutcome::Idle`]
/// when nothing arrived.
pub struct TerminalInput {
    _guard: RawModeGuard,
    poll_interval: Duration,
}

impl TerminalInput {
    pub fn open(poll_interval: Duration) -> Result<Self, TtyError> {
        Ok(Self {
            _guard: RawModeGuard::new()?,
            poll_interval,
        })
    }

    fn wait_readable(&self) -> Result<bool, TtyError> {
        let stdin = io::stdin();
        let mut fds = [PollFd::new(&stdin, PollFlags::POLLIN)];
        let timeout = i32::try_from(self.poll_interval.as_millis()).unwrap_or(i32::MAX);
        match poll(&mut fds, timeout) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(true),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(TtyError::Poll(e)),
        }
    }
}

impl ByteSource for TerminalInput {
    fn next_byte(&mut self) -> io::Result<ReadOutcome> {
        if !self.wait_readable()? {
            return Ok(ReadOutcome::Idle);
        }
        let mut buf = [0u8; 1];
        match nix::unistd::read(libc::STDIN_FILENO, &mut buf) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(_) => Ok(ReadOutcome::Byte(buf[0])),
            Err(Errno::EINTR | Errno::EAGAIN) => Ok(ReadOutcome::Idle),
            Err(e) => Err(TtyError::Read(e).into()),
        }
    }
}

/// Size of the terminal on stdout as `(columns, rows)`
pub fn terminal_size() -> Option<(u16, u16)> {
    let mut ws = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ writes a winsize into the provided struct
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some((ws.ws_col, ws.ws_row))
    } else {
        None
    }
}
