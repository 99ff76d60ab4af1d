//! Glyph Cell
//!
//! Represents a single cell of a composited buffer: one Unicode scalar value
//! with a 24-bit foreground and a reserved background color.

use serde::{Deserialize, Serialize};

use super::utf8::{self, Utf8Bytes};

/// A 32-bit RGBA color, laid out as `0xRRGGBBAA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const WHITE: Rgba = Rgba(0xFFFF_FFFF);
    pub const BLACK: Rgba = Rgba(0x0000_00FF);
    /// Dim gray used for unfilled progress tracks
    pub const DARK_GRAY: Rgba = Rgba(0x4242_42FF);
    pub const RED: Rgba = Rgba(0xFF50_50FF);

    /// Build an opaque color from its components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn a(self) -> u8 {
        self.0 as u8
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// Default foreground of a blank cell
pub const DEFAULT_FG: Rgba = Rgba::WHITE;
/// Default background of a blank cell
pub const DEFAULT_BG: Rgba = Rgba::BLACK;

/// A single renderable cell. Copied by value, never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// The glyph. Always a valid Unicode scalar value.
    pub ch: char,
    /// Foreground color
    pub fg: Rgba,
    /// Background color
    pub bg: Rgba,
}

impl Default for Cell {
    fn default() -> Self {
        Cell::BLANK
    }
}

impl Cell {
    /// White-on-black space; returned for every out-of-range query
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: DEFAULT_FG,
        bg: DEFAULT_BG,
    };

    /// Create a cell with the default background
    pub const fn new(ch: char, fg: Rgba) -> Self {
        Self { ch, fg, bg: DEFAULT_BG }
    }

    /// Create a cell from a raw code point, substituting U+FFFD for
    /// surrogate halves and values past U+10FFFF
    pub fn from_scalar(codepoint: u32, fg: Rgba) -> Self {
        Self::new(utf8::normalize_scalar(codepoint), fg)
    }

    pub const fn with_bg(mut self, bg: Rgba) -> Self {
        self.bg = bg;
        self
    }

    /// UTF-8 bytes of this cell's glyph
    pub fn utf8(&self) -> Utf8Bytes {
        utf8::encode_utf8(self.ch)
    }

    /// Terminal columns this glyph occupies (0, 1 or 2)
    pub fn display_width(&self) -> usize {
        use unicode_width::UnicodeWidthChar;
        self.ch.width().unwrap_or(0)
    }

    pub fn is_blank(&self) -> bool {
        *self == Cell::BLANK
    }
}
