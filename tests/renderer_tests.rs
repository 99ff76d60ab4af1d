//! Renderer and input thread tests
//!
//! Frames are captured through a shared in-memory writer and input is fed
//! through a channel-backed byte source.

use std::io::{self, IsTerminal, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use glyphframe::core::{Rgba, Screen};
use glyphframe::input::{
    ByteSource, InputError, InputEvent, InputMode, InputThread, ReadOutcome,
};
use glyphframe::renderer::{shared, Renderer, SharedScreen};
use glyphframe::surface::{Surface, TextBlock};
use glyphframe::tty::TtyError;

/// Writer whose contents stay readable from the test thread
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Bytes from a channel; idle after a short wait, closed once the sender is gone
struct ChannelSource(Receiver<u8>);

impl ByteSource for ChannelSource {
    fn next_byte(&mut self) -> io::Result<ReadOutcome> {
        match self.0.recv_timeout(Duration::from_millis(10)) {
            Ok(b) => Ok(ReadOutcome::Byte(b)),
            Err(RecvTimeoutError::Timeout) => Ok(ReadOutcome::Idle),
            Err(RecvTimeoutError::Disconnected) => Ok(ReadOutcome::Closed),
        }
    }
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

fn labelled_screen(label: &str) -> SharedScreen {
    let mut screen = Screen::new(12, 4);
    screen.add_surface(Surface::text(0, 0, TextBlock::new(label, Rgba::WHITE)));
    shared(screen)
}

#[test]
fn test_redraw_requests_coalesce() {
    let renderer = Renderer::new(vec![labelled_screen("one")]);
    renderer.request_redraw();
    renderer.request_redraw();
    renderer.request_redraw();

    let out = SharedBuf::default();
    let handle = renderer.spawn(out.clone()).unwrap();

    assert!(wait_until(|| renderer.frames_drawn() == 1));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(renderer.frames_drawn(), 1);
    assert!(!renderer.is_dirty());
    assert_eq!(out.text().matches("\x1b[3J\x1b[2J\x1b[H").count(), 1);

    renderer.stop();
    handle.join().unwrap().unwrap();
}

#[test]
fn test_requests_during_a_draw_coalesce_into_one_frame() {
    let screen = labelled_screen("one");
    let renderer = Renderer::new(vec![screen.clone()]);
    let out = SharedBuf::default();
    let handle = renderer.spawn(out.clone()).unwrap();

    renderer.request_redraw();
    assert!(wait_until(|| renderer.frames_drawn() == 1));

    // Holding the screen parks the render thread inside its next draw
    let held = screen.lock().unwrap();
    renderer.request_redraw();
    assert!(wait_until(|| !renderer.is_dirty()));

    for _ in 0..3 {
        renderer.request_redraw();
    }
    assert!(renderer.set_active(0));
    assert!(renderer.set_active(0));
    assert!(renderer.is_dirty());
    drop(held);

    // The parked frame, then one more for everything requested meanwhile
    assert!(wait_until(|| renderer.frames_drawn() == 3));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(renderer.frames_drawn(), 3);
    assert!(!renderer.is_dirty());
    assert_eq!(out.text().matches("\x1b[3J\x1b[2J\x1b[H").count(), 3);

    renderer.stop();
    handle.join().unwrap().unwrap();
}

#[test]
fn test_stop_without_redraw_draws_nothing() {
    let renderer = Renderer::new(vec![labelled_screen("one")]);
    let out = SharedBuf::default();
    let handle = renderer.spawn(out.clone()).unwrap();

    thread::sleep(Duration::from_millis(50));
    renderer.stop();
    handle.join().unwrap().unwrap();

    assert_eq!(renderer.frames_drawn(), 0);
    assert!(out.text().is_empty());
}

#[test]
fn test_stop_from_another_thread() {
    let renderer = Renderer::new(vec![labelled_screen("one")]);
    let stopper = renderer.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        stopper.stop();
        stopper.stop();
    });

    let mut out = Vec::new();
    renderer.run(&mut out).unwrap();
    handle.join().unwrap();
    assert!(!renderer.is_running());
}

#[test]
fn test_set_active_draws_new_screen() {
    let renderer = Renderer::new(vec![labelled_screen("first"), labelled_screen("second")]);
    let out = SharedBuf::default();
    let handle = renderer.spawn(out.clone()).unwrap();

    assert!(!renderer.set_active(5));
    assert!(renderer.set_active(1));
    assert!(wait_until(|| out.text().contains('d')));
    let text = out.text();
    assert!(!text.contains('f'));

    renderer.stop();
    handle.join().unwrap().unwrap();
}

#[test]
fn test_no_active_screen_skips_draw() {
    let list = vec![labelled_screen("only")];
    let renderer = Renderer::new(list.clone());
    assert!(renderer.remove_screen(0));
    assert_eq!(renderer.active_index(), None);

    let out = SharedBuf::default();
    let handle = renderer.spawn(out.clone()).unwrap();
    renderer.request_redraw();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(renderer.frames_drawn(), 0);

    // Adding a screen makes it active and draws it
    renderer.add_screen(list[0].clone());
    assert!(wait_until(|| renderer.frames_drawn() >= 1));
    assert!(out.text().contains('y'));

    renderer.stop();
    handle.join().unwrap().unwrap();
}

#[test]
fn test_write_error_stops_renderer() {
    let renderer = Renderer::new(vec![labelled_screen("one")]);
    renderer.request_redraw();
    let err = renderer.run(&mut BrokenPipe).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    assert!(!renderer.is_running());
    assert_eq!(renderer.frames_drawn(), 0);
}

#[test]
fn test_mutator_thread_updates_are_drawn() {
    let mut screen = Screen::new(12, 4);
    let id = screen.add_surface(Surface::text(0, 0, TextBlock::new("0", Rgba::WHITE)));
    let screen = shared(screen);
    let renderer = Renderer::new(vec![screen.clone()]);
    let out = SharedBuf::default();
    let handle = renderer.spawn(out.clone()).unwrap();

    let ticker = {
        let (renderer, screen) = (renderer.clone(), screen.clone());
        thread::spawn(move || {
            for n in 1..=3 {
                {
                    let mut screen = screen.lock().unwrap();
                    let text = screen.surface_mut(id).and_then(Surface::as_text_mut).unwrap();
                    text.set_text(&format!("tick {}", n), Rgba::WHITE);
                }
                renderer.request_redraw();
                thread::sleep(Duration::from_millis(20));
            }
        })
    };
    ticker.join().unwrap();

    assert!(wait_until(|| out.text().contains("3\x1b[0m")));
    renderer.stop();
    handle.join().unwrap().unwrap();
}

#[test]
fn test_input_thread_echo_and_quit() {
    let renderer = Renderer::new(vec![labelled_screen("x")]);
    let out = SharedBuf::default();
    let render = renderer.spawn(out.clone()).unwrap();

    let (bytes, rx) = mpsc::channel();
    let (events_tx, events) = mpsc::channel();
    let input = InputThread::spawn(ChannelSource(rx), renderer.clone(), events_tx, 'q').unwrap();

    for &b in b":hi" {
        bytes.send(b).unwrap();
    }
    assert!(wait_until(|| renderer.input().buffer == "hi"));
    assert_eq!(renderer.input().mode, InputMode::Command);
    assert!(wait_until(|| out.text().ends_with("\x1b[2K:hi")));

    bytes.send(b'\r').unwrap();
    assert_eq!(
        events.recv_timeout(Duration::from_secs(5)),
        Ok(InputEvent::Command("hi".to_string()))
    );

    bytes.send(b'q').unwrap();
    assert_eq!(events.recv_timeout(Duration::from_secs(5)), Ok(InputEvent::Quit));
    input.join().unwrap();
    render.join().unwrap().unwrap();
    assert!(!renderer.is_running());
}

#[test]
fn test_input_thread_stops_on_request() {
    let renderer = Renderer::new(vec![labelled_screen("x")]);
    let (_bytes, rx) = mpsc::channel::<u8>();
    let (events_tx, _events) = mpsc::channel();
    let input = InputThread::spawn(ChannelSource(rx), renderer.clone(), events_tx, 'q').unwrap();

    thread::sleep(Duration::from_millis(30));
    assert!(!input.is_finished());
    input.stop();
    input.join().unwrap();
    // Stopping input leaves the renderer alone
    assert!(renderer.is_running());
}

#[test]
fn test_input_thread_ends_when_source_closes() {
    let renderer = Renderer::new(vec![labelled_screen("x")]);
    let (bytes, rx) = mpsc::channel::<u8>();
    let (events_tx, events) = mpsc::channel();
    let input = InputThread::spawn(ChannelSource(rx), renderer, events_tx, 'q').unwrap();

    bytes.send(b'n').unwrap();
    drop(bytes);
    input.join().unwrap();
    assert_eq!(events.try_recv(), Ok(InputEvent::Hotkey('n')));
}

#[test]
fn test_terminal_input_without_tty_leaves_renderer_running() {
    if io::stdin().is_terminal() {
        return;
    }
    let renderer = Renderer::new(vec![labelled_screen("x")]);
    let render = renderer.spawn(SharedBuf::default()).unwrap();

    let (events_tx, events) = mpsc::channel();
    let input = InputThread::spawn_terminal(
        renderer.clone(),
        events_tx,
        'q',
        Duration::from_millis(10),
    )
    .unwrap();

    let result = input.join();
    assert!(
        matches!(result, Err(InputError::Tty(TtyError::GetAttr(_)))),
        "unexpected result: {:?}",
        result
    );
    assert!(events.try_recv().is_err());

    assert!(renderer.is_running());
    renderer.stop();
    render.join().unwrap().unwrap();
}
