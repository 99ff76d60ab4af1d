//! ANSI/VT100 output sequences
//!
//! Everything the renderer writes to the terminal is built here.

use std::io::{self, Write};

use super::cell::{Cell, Rgba, DEFAULT_BG};

/// Attribute reset; must follow every colored glyph
pub const ANSI_RESET: &str = "\x1b[0m";
/// Clear scrollback, clear screen, home the cursor
pub const CLEAR_SCREEN: &str = "\x1b[3J\x1b[2J\x1b[H";
/// Clear the whole current line
pub const CLEAR_LINE: &str = "\x1b[2K";

/// 24-bit foreground color. The alpha byte is not emitted.
pub fn ansi_foreground(color: Rgba) -> String {
    format!("\x1b[38;2;{};{};{}m", color.r(), color.g(), color.b())
}

/// 24-bit background color
pub fn ansi_background(color: Rgba) -> String {
    format!("\x1b[48;2;{};{};{}m", color.r(), color.g(), color.b())
}

/// Cursor positioning; `row` and `col` are 1-based
pub fn cursor_to(row: usize, col: usize) -> String {
    format!("\x1b[{};{}H", row, col)
}

/// Write one cell as color prefix, glyph bytes and reset.
///
/// Glyphs with no display width (controls, combining marks) are emitted as a
/// space so the row keeps its column count.
pub fn write_cell<W: Write + ?Sized>(out: &mut W, cell: &Cell) -> io::Result<()> {
    write!(out, "\x1b[38;2;{};{};{}m", cell.fg.r(), cell.fg.g(), cell.fg.b())?;
    if cell.bg != DEFAULT_BG {
        write!(out, "\x1b[48;2;{};{};{}m", cell.bg.r(), cell.bg.g(), cell.bg.b())?;
    }
    if cell.display_width() == 0 {
        out.write_all(b" ")?;
    } else {
        out.write_all(&cell.utf8())?;
    }
    out.write_all(ANSI_RESET.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_sequence() {
        assert_eq!(ansi_foreground(Rgba(0x0A14_1E80)), "\x1b[38;2;10;20;30m");
        assert_eq!(ansi_foreground(Rgba::WHITE), "\x1b[38;2;255;255;255m");
    }

    #[test]
    fn test_background_sequence() {
        assert_eq!(ansi_background(Rgba::rgb(1, 2, 3)), "\x1b[48;2;1;2;3m");
    }

    #[test]
    fn test_cell_is_reset_after_glyph() {
        let mut out = Vec::new();
        write_cell(&mut out, &Cell::new('─', Rgba::rgb(1, 2, 3))).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\x1b[38;2;1;2;3m─\x1b[0m"
        );
    }

    #[test]
    fn test_non_default_background_is_emitted() {
        let mut out = Vec::new();
        write_cell(&mut out, &Cell::new('x', Rgba::WHITE).with_bg(Rgba::rgb(9, 8, 7))).unwrap();
        assert_eq!(out, b"\x1b[38;2;255;255;255m\x1b[48;2;9;8;7mx\x1b[0m");
    }

    #[test]
    fn test_control_glyph_becomes_space() {
        let mut out = Vec::new();
        write_cell(&mut out, &Cell::new('\u{1b}', Rgba::WHITE)).unwrap();
        assert_eq!(out, b"\x1b[38;2;255;255;255m \x1b[0m");
    }

    #[test]
    fn test_cursor_to() {
        assert_eq!(cursor_to(24, 1), "\x1b[24;1H");
    }
}
