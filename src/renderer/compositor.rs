//! Render loop
//!
//! One mutex guards the screen list, the active index, the dirty and running
//! flags and the input line. A condition variable wakes the single render
//! thread whenever `dirty` is set or `running` is cleared.
//!
//! Lock order: the state lock is never held while a screen is locked.

use std::io::{self, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::core::Screen;
use crate::input::InputState;

use super::frame::encode_frame;

/// A screen shared between the renderer and its mutators
pub type SharedScreen = Arc<Mutex<Screen>>;

/// Wrap a screen for use with a [`Renderer`]
pub fn shared(screen: Screen) -> SharedScreen {
    Arc::new(Mutex::new(screen))
}

fn lock_screen(screen: &SharedScreen) -> MutexGuard<'_, Screen> {
    screen.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct State {
    screens: Vec<SharedScreen>,
    active: Option<usize>,
    dirty: bool,
    running: bool,
    input: InputState,
    frames: u64,
    /// A thread is inside `run`
    looping: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    wake: Condvar,
}

/// Marks the render loop as taken until dropped
struct LoopGuard<'a> {
    renderer: &'a Renderer,
}

impl<'a> LoopGuard<'a> {
    fn enter(renderer: &'a Renderer) -> io::Result<Self> {
        let mut state = renderer.lock();
        if state.looping {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "render loop is already running",
            ));
        }
        state.looping = true;
        Ok(Self { renderer })
    }
}

impl Drop for LoopGuard<'_> {
    fn drop(&mut self) {
        self.renderer.lock().looping = false;
    }
}

/// Handle to the compositor state. Clones refer to the same renderer.
#[derive(Debug, Clone)]
pub struct Renderer {
    shared: Arc<Shared>,
}

impl Renderer {
    /// Create a renderer over `screens`.
    ///
    /// The first screen is active if there is one. Nothing is drawn until
    /// the first redraw request.
    pub fn new(screens: Vec<SharedScreen>) -> Self {
        let active = if screens.is_empty() { None } else { Some(0) };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    screens,
                    active,
                    dirty: false,
                    running: true,
                    input: InputState::default(),
                    frames: 0,
                    looping: false,
                }),
                wake: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark dirty and wake the render thread.
    ///
    /// The guard is released before notifying so the woken thread does not
    /// immediately block on the mutex.
    fn mark_dirty(&self, mut state: MutexGuard<'_, State>) {
        state.dirty = true;
        drop(state);
        self.shared.wake.notify_one();
    }

    /// Make the screen at `index` active. Returns false if there is none.
    pub fn set_active(&self, index: usize) -> bool {
        let mut state = self.lock();
        if index >= state.screens.len() {
            return false;
        }
        state.active = Some(index);
        self.mark_dirty(state);
        true
    }

    /// Make `screen` active if it belongs to this renderer
    pub fn set_active_screen(&self, screen: &SharedScreen) -> bool {
        let mut state = self.lock();
        let Some(index) = state.screens.iter().position(|s| Arc::ptr_eq(s, screen)) else {
            return false;
        };
        state.active = Some(index);
        self.mark_dirty(state);
        true
    }

    /// Append a screen and return its index.
    ///
    /// It becomes active when no screen was active.
    pub fn add_screen(&self, screen: SharedScreen) -> usize {
        let mut state = self.lock();
        state.screens.push(screen);
        let index = state.screens.len() - 1;
        if state.active.is_none() {
            state.active = Some(index);
        }
        self.mark_dirty(state);
        index
    }

    /// Remove the screen at `index`. Returns false if there is none.
    ///
    /// Removing the active screen re-targets to index 0, or to no active
    /// screen when the list becomes empty. Removing a screen before the
    /// active one keeps the same screen active.
    pub fn remove_screen(&self, index: usize) -> bool {
        let state = self.lock();
        self.remove_locked(state, index)
    }

    /// Remove `screen` if it belongs to this renderer
    pub fn remove_screen_ref(&self, screen: &SharedScreen) -> bool {
        let state = self.lock();
        match state.screens.iter().position(|s| Arc::ptr_eq(s, screen)) {
            Some(index) => self.remove_locked(state, index),
            None => false,
        }
    }

    fn remove_locked(&self, mut state: MutexGuard<'_, State>, index: usize) -> bool {
        if index >= state.screens.len() {
            return false;
        }
        state.screens.remove(index);
        let remaining = state.screens.len();
        state.active = match state.active {
            _ if remaining == 0 => None,
            Some(active) if active == index => Some(0),
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        self.mark_dirty(state);
        true
    }

    /// Ask for a redraw. Requests made before the next draw coalesce.
    pub fn request_redraw(&self) {
        let state = self.lock();
        self.mark_dirty(state);
    }

    /// Mutate the input line and schedule a redraw so the echo follows
    pub fn update_input<R>(&self, f: impl FnOnce(&mut InputState) -> R) -> R {
        let mut state = self.lock();
        let result = f(&mut state.input);
        self.mark_dirty(state);
        result
    }

    /// Snapshot of the input line
    pub fn input(&self) -> InputState {
        self.lock().input.clone()
    }

    /// Stop the render loop. Safe from any thread; repeated calls are no-ops.
    pub fn stop(&self) {
        let mut state = self.lock();
        if !state.running {
            return;
        }
        state.running = false;
        drop(state);
        self.shared.wake.notify_one();
        info!("Renderer stop requested");
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    pub fn active_index(&self) -> Option<usize> {
        self.lock().active
    }

    pub fn active_screen(&self) -> Option<SharedScreen> {
        let state = self.lock();
        state.active.and_then(|i| state.screens.get(i).cloned())
    }

    pub fn screen_count(&self) -> usize {
        self.lock().screens.len()
    }

    /// Number of frames written so far
    pub fn frames_drawn(&self) -> u64 {
        self.lock().frames
    }

    /// Run the render loop on the calling thread until [`stop`](Self::stop).
    ///
    /// Each pass composites the active screen and writes one full frame to
    /// `out`. A failed write stops the renderer and is returned. Only one
    /// loop may run at a time; a second call while one is active fails with
    /// [`io::ErrorKind::AlreadyExists`].
    pub fn run<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        let _loop = LoopGuard::enter(self)?;
        info!("Renderer started");
        let mut frame = Vec::new();

        loop {
            let (screen, input) = {
                let state = self.lock();
                let mut state = self
                    .shared
                    .wake
                    .wait_while(state, |s| !s.dirty && s.running)
                    .unwrap_or_else(PoisonError::into_inner);
                if !state.running {
                    break;
                }
                state.dirty = false;
                let screen = state.active.and_then(|i| state.screens.get(i).cloned());
                (screen, state.input.clone())
            };

            let Some(screen) = screen else {
                debug!("No active screen, skipping draw");
                continue;
            };

            frame.clear();
            {
                let mut screen = lock_screen(&screen);
                screen.composite();
                encode_frame(&mut frame, &screen, &input)?;
            }

            if let Err(e) = out.write_all(&frame).and_then(|_| out.flush()) {
                self.lock().running = false;
                return Err(e);
            }

            let frames = {
                let mut state = self.lock();
                state.frames += 1;
                state.frames
            };
            debug!(frame = frames, bytes = frame.len(), "Frame drawn");
        }

        info!("Renderer stopped");
        Ok(())
    }

    /// Run the render loop on a thread named `render`
    pub fn spawn<W>(&self, mut out: W) -> io::Result<JoinHandle<io::Result<()>>>
    where
        W: Write + Send + 'static,
    {
        let renderer = self.clone();
        thread::Builder::new()
            .name("render".to_string())
            .spawn(move || renderer.run(&mut out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screens(n: usize) -> Vec<SharedScreen> {
        (0..n).map(|_| shared(Screen::new(4, 3))).collect()
    }

    #[test]
    fn test_initial_state() {
        let r = Renderer::new(screens(2));
        assert_eq!(r.active_index(), Some(0));
        assert!(!r.is_dirty());
        assert!(r.is_running());

        let empty = Renderer::new(Vec::new());
        assert_eq!(empty.active_index(), None);
        assert!(empty.active_screen().is_none());
    }

    #[test]
    fn test_set_active_out_of_range_is_noop() {
        let r = Renderer::new(screens(2));
        assert!(!r.set_active(2));
        assert_eq!(r.active_index(), Some(0));
        assert!(!r.is_dirty());

        assert!(r.set_active(1));
        assert_eq!(r.active_index(), Some(1));
        assert!(r.is_dirty());
    }

    #[test]
    fn test_set_active_by_reference() {
        let list = screens(2);
        let r = Renderer::new(list.clone());
        assert!(r.set_active_screen(&list[1]));
        assert_eq!(r.active_index(), Some(1));

        let stranger = shared(Screen::new(4, 3));
        assert!(!r.set_active_screen(&stranger));
        assert_eq!(r.active_index(), Some(1));
    }

    #[test]
    fn test_remove_active_retargets_to_first() {
        let r = Renderer::new(screens(3));
        r.set_active(2);
        assert!(r.remove_screen(2));
        assert_eq!(r.active_index(), Some(0));
        assert_eq!(r.screen_count(), 2);
    }

    #[test]
    fn test_remove_before_active_keeps_screen() {
        let list = screens(3);
        let r = Renderer::new(list.clone());
        r.set_active(2);
        assert!(r.remove_screen(0));
        assert_eq!(r.active_index(), Some(1));
        assert!(Arc::ptr_eq(&r.active_screen().unwrap(), &list[2]));
    }

    #[test]
    fn test_remove_last_screen_leaves_none_active() {
        let list = screens(1);
        let r = Renderer::new(list.clone());
        assert!(r.remove_screen_ref(&list[0]));
        assert_eq!(r.active_index(), None);
        assert!(!r.remove_screen(0));

        assert_eq!(r.add_screen(shared(Screen::new(4, 3))), 0);
        assert_eq!(r.active_index(), Some(0));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let r = Renderer::new(screens(1));
        r.stop();
        r.stop();
        assert!(!r.is_running());
        let mut out = Vec::new();
        r.run(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_second_run_is_rejected() {
        let r = Renderer::new(screens(1));
        let handle = r.spawn(Vec::new()).unwrap();
        while !r.lock().looping {
            thread::yield_now();
        }

        let err = r.run(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(r.is_running());

        r.stop();
        handle.join().unwrap().unwrap();
        assert!(!r.lock().looping);
        // The loop is free again once the first one has returned
        r.run(&mut Vec::new()).unwrap();
    }

    #[test]
    fn test_update_input_marks_dirty() {
        let r = Renderer::new(screens(1));
        let appended = r.update_input(|input| input.push_byte(b'x'));
        assert!(appended);
        assert!(r.is_dirty());
        assert_eq!(r.input().buffer, "x");
    }
}
