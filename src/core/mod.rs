//! Compositor Core
//!
//! Platform-independent pieces of the compositor:
//! - Glyph cells and RGBA colors
//! - The UTF-8 codec cells are encoded and decoded with
//! - ANSI output sequences
//! - Screens: framed surface stacks and their composited buffers
//!
//! Nothing here performs terminal I/O; the renderer drives it.

pub mod ansi;
mod cell;
mod screen;
mod utf8;

pub use cell::{Cell, Rgba, DEFAULT_BG, DEFAULT_FG};
pub use screen::{composite_surface, FrameStyle, Screen, SurfaceId};
pub use utf8::{
    decode_lossy, decode_utf8, encode_scalar, encode_utf8, normalize_scalar, DecodeError,
    DecodeLossy, Utf8Bytes, REPLACEMENT,
};
