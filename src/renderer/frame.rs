//! Frame encoding
//!
//! Turns a composited screen plus the input line into the byte stream for
//! one full redraw.

use std::io::{self, Write};

use crate::core::ansi::{self, CLEAR_LINE, CLEAR_SCREEN};
use crate::core::{Cell, Screen};
use crate::input::InputState;

/// Encode a full redraw of `screen` followed by the input line.
///
/// The screen must already be composited. Rows are separated by `\r\n`; the
/// input line is the row directly below the frame.
pub fn encode_frame<W: Write + ?Sized>(
    out: &mut W,
    screen: &Screen,
    input: &InputState,
) -> io::Result<()> {
    out.write_all(CLEAR_SCREEN.as_bytes())?;

    for y in 0..screen.height() {
        if let Some(row) = screen.row(y) {
            encode_row(out, row)?;
        }
        out.write_all(b"\r\n")?;
    }

    out.write_all(ansi::cursor_to(screen.height() as usize + 1, 1).as_bytes())?;
    out.write_all(CLEAR_LINE.as_bytes())?;
    out.write_all(input.mode.prompt().as_bytes())?;
    out.write_all(input.buffer.as_bytes())?;
    out.flush()
}

/// Write one buffer row so that it covers exactly `row.len()` columns.
///
/// A double-width glyph takes the following column, whose cell is skipped:
/// whatever was composited there is not drawn, so text that puts a wide
/// glyph next to a space loses the space. One that would spill onto the last
/// column is drawn as a space.
fn encode_row<W: Write + ?Sized>(out: &mut W, row: &[Cell]) -> io::Result<()> {
    let w = row.len();
    let mut x = 0;
    while x < w {
        let cell = row[x];
        if cell.display_width() == 2 {
            if x + 2 < w {
                ansi::write_cell(out, &cell)?;
                x += 2;
                continue;
            }
            ansi::write_cell(out, &Cell { ch: ' ', ..cell })?;
        } else {
            ansi::write_cell(out, &cell)?;
        }
        x += 1;
    }
    Ok(())
}
