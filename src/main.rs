//! Glyphframe demo: a "now playing" screen
//!
//! Two screens: the player (album art, title, seek bar, transport buttons)
//! and a key help page. A ticker thread advances the seek bar once a second.
//!
//! Keys: space pauses, `n`/`p` switch screens, `:` opens the command line,
//! `/` opens search, `q` quits.

use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use glyphframe::app::{Config, Theme};
use glyphframe::core::{ansi, FrameStyle, Rgba, Screen, SurfaceId};
use glyphframe::input::{InputEvent, InputThread};
use glyphframe::renderer::{shared, Renderer, SharedScreen};
use glyphframe::surface::{Button, ImageBlock, ProgressBar, RgbaBuffer, Surface, TextBlock};
use glyphframe::tty;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let result = run();

    // Leave the shell prompt below the last frame
    let mut stdout = io::stdout();
    let _ = write!(stdout, "{}\r\n", ansi::ANSI_RESET);
    let _ = stdout.flush();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Error: {}", e);
            eprintln!("glyphframe: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Position of the (pretend) current track
#[derive(Debug, Clone)]
struct Playback {
    title: String,
    artist: String,
    position: u32,
    duration: u32,
    paused: bool,
}

impl Playback {
    fn percent(&self) -> u8 {
        if self.duration == 0 {
            return 0;
        }
        (self.position.min(self.duration) as u64 * 100 / self.duration as u64) as u8
    }

    fn tick(&mut self) {
        if !self.paused {
            self.position = (self.position + 1) % (self.duration + 1);
        }
    }
}

fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// The player screen and the handles of the surfaces that change
struct NowPlaying {
    screen: SharedScreen,
    status: SurfaceId,
    time: SurfaceId,
    seek: SurfaceId,
    play: SurfaceId,
    message: SurfaceId,
    theme: Theme,
}

impl NowPlaying {
    fn build(config: &Config, width: u32, height: u32, playback: &Playback) -> Self {
        let theme = config.theme;
        let mut screen = Screen::with_frame(width, height, FrameStyle::from(&theme));

        let (aw, ah) = (config.art_width, config.art_height);
        let mut art = ImageBlock::new(aw, ah).with_error_color(theme.error);
        let _ = art.load(&album_art(aw, ah));
        screen.add_surface(Surface::image(1, 0, art));

        let left = aw as i32 + 3;
        let interior = width.saturating_sub(2);
        let bar_width = interior.saturating_sub(aw + 5).max(10);

        screen.add_surface(Surface::text(left, 1, TextBlock::new(&playback.title, theme.foreground)));
        screen.add_surface(Surface::text(left, 2, TextBlock::new(&playback.artist, theme.muted)));
        let status = screen.add_surface(Surface::text(left, 4, TextBlock::new("", theme.foreground)));
        let seek = screen.add_surface(Surface::progress(
            left,
            6,
            ProgressBar::new(bar_width, 0).with_colors(theme.accent, theme.muted),
        ));
        let time = screen.add_surface(Surface::text(left, 7, TextBlock::new("", theme.muted)));

        let button = |label: &str| Button::new(7, 3, label).with_colors(theme.foreground, theme.background);
        screen.add_surface(Surface::button(left, 9, button("prev")));
        let play = screen.add_surface(Surface::button(left + 8, 9, button("play")));
        screen.add_surface(Surface::button(left + 16, 9, button("next")));

        let message = screen.add_surface(Surface::text(1, ah as i32 + 1, TextBlock::new("", theme.muted)));

        let now_playing = Self {
            screen: shared(screen),
            status,
            time,
            seek,
            play,
            message,
            theme,
        };
        now_playing.refresh(playback);
        now_playing
    }

    /// Bring the changing surfaces in line with `playback`
    fn refresh(&self, playback: &Playback) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        let status = status_label(playback.paused);
        let color = if playback.paused { self.theme.muted } else { self.theme.accent };
        if let Some(text) = screen.surface_mut(self.status).and_then(Surface::as_text_mut) {
            text.set_text(status, color);
            text.paint(self.theme.foreground, 2, 0);
        }
        if let Some(bar) = screen.surface_mut(self.seek).and_then(Surface::as_progress_mut) {
            bar.set_progress(playback.percent());
        }
        if let Some(text) = screen.surface_mut(self.time).and_then(Surface::as_text_mut) {
            let label = format!("{} / {}", format_time(playback.position), format_time(playback.duration));
            text.set_text(&label, self.theme.muted);
        }
        if let Some(button) = screen.surface_mut(self.play).and_then(Surface::as_button_mut) {
            button.set_pressed(!playback.paused);
        }
    }

    fn show_message(&self, message: &str) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(text) = screen.surface_mut(self.message).and_then(Surface::as_text_mut) {
            text.set_text(message, self.theme.muted);
        }
    }
}

/// Status line text. The glyphs are single width so the space after them
/// survives encoding.
fn status_label(paused: bool) -> &'static str {
    if paused {
        "‖ Paused"
    } else {
        "▶ Playing"
    }
}

/// Procedural album art: a diagonal gradient with a ring
fn album_art(width: u32, height: u32) -> RgbaBuffer {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    RgbaBuffer::from_fn(width, height, |x, y| {
        let dx = (x as f32 - cx) / cx.max(1.0);
        let dy = (y as f32 - cy) / cy.max(1.0);
        let d = (dx * dx + dy * dy).sqrt();
        if (0.55..0.7).contains(&d) {
            return Rgba::rgb(0xF0, 0xE6, 0xD2);
        }
        let t = (x + y) as f32 / (width + height).max(1) as f32;
        Rgba::rgb((40.0 + 180.0 * t) as u8, 30, (160.0 - 100.0 * t) as u8)
    })
}

fn help_screen(theme: &Theme, width: u32, height: u32) -> SharedScreen {
    let mut screen = Screen::with_frame(width, height, FrameStyle::rounded(theme.frame));
    let help = "Keys\n\
                \n\
                space    pause / resume\n\
                n  p     next / previous screen\n\
                :        command line (play, pause, seek N, quit)\n\
                /        search\n\
                q        quit";
    let mut text = TextBlock::new(help, theme.foreground);
    text.paint(theme.accent, 0, 4);
    screen.add_surface(Surface::text(1, 0, text));
    shared(screen)
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::load_or_default();
    let (cols, rows) = tty::terminal_size().unwrap_or((80, 24));
    // The last row is the input line
    let (width, height) = (cols as u32, rows.saturating_sub(1).max(3) as u32);
    tracing::info!(width, height, "Starting glyphframe");

    let playback = Arc::new(Mutex::new(Playback {
        title: "Clair de Lune".to_string(),
        artist: "Claude Debussy".to_string(),
        position: 0,
        duration: 5 * 60 + 2,
        paused: false,
    }));

    let player = {
        let playback = playback.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::new(NowPlaying::build(&config, width, height, &playback))
    };
    let help = help_screen(&config.theme, width, height);

    let renderer = Renderer::new(vec![player.screen.clone(), help]);
    let render = renderer.spawn(io::stdout())?;

    let ticker_stop = Arc::new(AtomicBool::new(false));
    let ticker = {
        let (renderer, player, playback, stop) =
            (renderer.clone(), player.clone(), playback.clone(), ticker_stop.clone());
        thread::Builder::new().name("ticker".to_string()).spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_secs(1));
                let mut playback = playback.lock().unwrap_or_else(PoisonError::into_inner);
                playback.tick();
                player.refresh(&playback);
                drop(playback);
                renderer.request_redraw();
            }
        })?
    };

    // Last to start: it owns the raw-mode terminal
    let (events_tx, events) = mpsc::channel();
    let input = match InputThread::spawn_terminal(
        renderer.clone(),
        events_tx,
        config.input.quit_key,
        config.input.poll_interval(),
    ) {
        Ok(input) => input,
        Err(e) => {
            renderer.stop();
            ticker_stop.store(true, Ordering::Relaxed);
            return Err(e.into());
        }
    };

    renderer.request_redraw();

    loop {
        let event = match events.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => {
                if !renderer.is_running() || input.is_finished() {
                    break;
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match event {
            InputEvent::Quit => break,
            InputEvent::Hotkey(' ') => {
                let mut playback = playback.lock().unwrap_or_else(PoisonError::into_inner);
                playback.paused = !playback.paused;
                player.refresh(&playback);
            }
            InputEvent::Hotkey('n') => switch_screen(&renderer, 1),
            InputEvent::Hotkey('p') => switch_screen(&renderer, -1),
            InputEvent::Hotkey(key) => player.show_message(&format!("unbound key '{}'", key)),
            InputEvent::Command(command) => {
                if !run_command(&command, &renderer, &player, &playback) {
                    break;
                }
            }
            InputEvent::Search(query) => player.show_message(&format!("no results for \"{}\"", query)),
        }
        renderer.request_redraw();
    }

    renderer.stop();
    input.stop();
    ticker_stop.store(true, Ordering::Relaxed);

    if let Err(e) = input.join() {
        tracing::warn!("Input thread ended with error: {}", e);
    }
    let _ = ticker.join();
    match render.join() {
        Ok(result) => result?,
        Err(_) => return Err("render thread panicked".into()),
    }

    tracing::info!("glyphframe exiting");
    Ok(())
}

fn switch_screen(renderer: &Renderer, step: isize) {
    let count = renderer.screen_count() as isize;
    if count == 0 {
        return;
    }
    let current = renderer.active_index().unwrap_or(0) as isize;
    renderer.set_active((current + step).rem_euclid(count) as usize);
}

/// Returns false when the command asks to quit
fn run_command(
    command: &str,
    renderer: &Renderer,
    player: &NowPlaying,
    playback: &Mutex<Playback>,
) -> bool {
    let mut words = command.split_whitespace();
    let mut playback = playback.lock().unwrap_or_else(PoisonError::into_inner);
    match (words.next(), words.next()) {
        (Some("q" | "quit"), _) => {
            renderer.stop();
            return false;
        }
        (Some("play"), _) => playback.paused = false,
        (Some("pause"), _) => playback.paused = true,
        (Some("seek"), Some(secs)) => match secs.parse::<u32>() {
            Ok(secs) => playback.position = secs.min(playback.duration),
            Err(_) => player.show_message(&format!("seek: not a number: {}", secs)),
        },
        (None, _) => {}
        _ => player.show_message(&format!("unknown command: {}", command)),
    }
    player.refresh(&playback);
    true
}
