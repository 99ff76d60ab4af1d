//! Glyphframe
//!
//! A small terminal compositor. Framed screens hold stacks of surfaces;
//! the renderer composites the active screen and streams it to the terminal
//! as 24-bit ANSI text, with an input line below the frame.
//!
//! - `core`: cells, the UTF-8 codec, ANSI sequences, screens and compositing
//! - `surface`: text, image, progress and button surfaces
//! - `renderer`: the dirty-flag render loop
//! - `input`: the input line, key handling and the input thread
//! - `tty`: raw mode, stdin polling and window size
//! - `app`: configuration for the demo shell

pub mod app;
pub mod core;
pub mod input;
pub mod renderer;
pub mod surface;
pub mod tty;

pub use crate::core::{Cell, FrameStyle, Rgba, Screen, SurfaceId};
pub use crate::renderer::{Renderer, SharedScreen};
pub use crate::surface::{Surface, SurfaceKind};
