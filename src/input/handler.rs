//! Key handling and the input thread

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, trace};

use crate::renderer::Renderer;
use crate::tty::{TerminalInput, TtyError};

use super::{InputEvent, InputMode};

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const BACKSPACE: u8 = 0x08;
const ESC: u8 = 0x1B;
const DEL: u8 = 0x7F;

/// Result of one read from a [`ByteSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Byte(u8),
    /// Nothing arrived before the source's timeout
    Idle,
    /// The source is exhausted
    Closed,
}

/// A stream of single input bytes.
///
/// Implementations should return [`ReadOutcome::Idle`] periodically while
/// waiting so the reading thread can observe a stop request.
pub trait ByteSource: Send {
    fn next_byte(&mut self) -> io::Result<ReadOutcome>;
}

/// Errors that end the input thread
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("terminal error: {0}")]
    Tty(#[from] TtyError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("input thread panicked")]
    Panicked,
}

/// Interprets input bytes against the renderer's input line
#[derive(Debug)]
pub struct InputHandler {
    renderer: Renderer,
    events: Sender<InputEvent>,
    quit_key: char,
}

impl InputHandler {
    pub fn new(renderer: Renderer, events: Sender<InputEvent>, quit_key: char) -> Self {
        Self {
            renderer,
            events,
            quit_key,
        }
    }

    /// Handle one byte. Returns false once the user has asked to quit.
    pub fn handle_byte(&mut self, byte: u8) -> bool {
        trace!(byte, "Key byte");

        if byte == CTRL_C || byte == CTRL_D {
            self.quit();
            return false;
        }

        match self.renderer.input().mode {
            InputMode::Hotkey => self.handle_hotkey(byte),
            mode => {
                self.handle_line(mode, byte);
                true
            }
        }
    }

    fn handle_hotkey(&mut self, byte: u8) -> bool {
        match byte {
            b':' => self.renderer.update_input(|i| i.enter(InputMode::Command)),
            b'/' => self.renderer.update_input(|i| i.enter(InputMode::Search)),
            0x20..=0x7E => {
                let key = byte as char;
                if key == self.quit_key {
                    self.quit();
                    return false;
                }
                self.send(InputEvent::Hotkey(key));
            }
            _ => trace!(byte, "Ignoring byte in hotkey mode"),
        }
        true
    }

    fn handle_line(&mut self, mode: InputMode, byte: u8) {
        match byte {
            b'\r' | b'\n' => {
                let line = self.renderer.update_input(|i| i.submit());
                debug!(?mode, %line, "Line submitted");
                let event = match mode {
                    InputMode::Search => InputEvent::Search(line),
                    _ => InputEvent::Command(line),
                };
                self.send(event);
            }
            BACKSPACE | DEL => self.renderer.update_input(|i| i.backspace()),
            ESC => self.renderer.update_input(|i| i.cancel()),
            b if b < 0x20 => trace!(byte, "Ignoring control byte"),
            _ => {
                self.renderer.update_input(|i| i.push_byte(byte));
            }
        }
    }

    fn quit(&mut self) {
        info!("Quit requested from keyboard");
        self.renderer.stop();
        self.send(InputEvent::Quit);
    }

    fn send(&self, event: InputEvent) {
        if self.events.send(event).is_err() {
            debug!("Input event receiver dropped");
        }
    }
}

/// Handle to a running input thread
#[derive(Debug)]
pub struct InputThread {
    handle: JoinHandle<Result<(), InputError>>,
    stop: Arc<AtomicBool>,
}

impl InputThread {
    /// Read `source` on a thread named `input` until quit, close, or stop
    pub fn spawn<S>(
        source: S,
        renderer: Renderer,
        events: Sender<InputEvent>,
        quit_key: char,
    ) -> io::Result<Self>
    where
        S: ByteSource + 'static,
    {
        Self::spawn_with(move || Ok(source), renderer, events, quit_key)
    }

    /// Put the terminal in raw mode and read stdin, polling every `poll_interval`.
    ///
    /// The terminal is restored when the thread ends. Failing to enter raw
    /// mode ends only this thread; the error is returned from [`join`](Self::join).
    pub fn spawn_terminal(
        renderer: Renderer,
        events: Sender<InputEvent>,
        quit_key: char,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        Self::spawn_with(
            move || TerminalInput::open(poll_interval).map_err(InputError::from),
            renderer,
            events,
            quit_key,
        )
    }

    fn spawn_with<S, F>(
        open: F,
        renderer: Renderer,
        events: Sender<InputEvent>,
        quit_key: char,
    ) -> io::Result<Self>
    where
        S: ByteSource + 'static,
        F: FnOnce() -> Result<S, InputError> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::Builder::new()
            .name("input".to_string())
            .spawn(move || {
                let source = open().map_err(|e| {
                    error!(error = %e, "Failed to open input");
                    e
                })?;
                let handler = InputHandler::new(renderer, events, quit_key);
                read_loop(source, handler, &flag)
            })?;
        Ok(Self { handle, stop })
    }

    /// Ask the thread to stop at its next idle poll
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to end
    pub fn join(self) -> Result<(), InputError> {
        self.handle.join().map_err(|_| InputError::Panicked)?
    }
}

fn read_loop<S: ByteSource>(
    mut source: S,
    mut handler: InputHandler,
    stop: &AtomicBool,
) -> Result<(), InputError> {
    info!("Input thread started");
    loop {
        if stop.load(Ordering::Relaxed) {
            info!("Input thread stopped");
            return Ok(());
        }
        match source.next_byte()? {
            ReadOutcome::Byte(byte) => {
                if !handler.handle_byte(byte) {
                    info!("Input thread finished");
                    return Ok(());
                }
            }
            ReadOutcome::Idle => {}
            ReadOutcome::Closed => {
                info!("Input closed");
                return Ok(());
            }
        }
    }
}
