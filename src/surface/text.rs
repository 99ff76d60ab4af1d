//! Text surface
//!
//! Stores decoded glyphs in one flat run plus the offset at which each line
//! starts. Newlines separate lines and are never stored as glyphs; there is
//! no wrapping.

use crate::core::{decode_lossy, Cell, Rgba};

use super::{local_index, Glyphs};

/// A fixed block of colored text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// Glyphs of every line, concatenated
    content: Vec<Cell>,
    /// Index into `content` where each line starts; never empty
    line_starts: Vec<usize>,
    /// Longest line length
    width: u32,
}

impl TextBlock {
    /// Build a text block from a string
    pub fn new(text: &str, fg: Rgba) -> Self {
        Self::from_bytes(text.as_bytes(), fg)
    }

    /// Build a text block from UTF-8 bytes; malformed bytes become U+FFFD
    pub fn from_bytes(bytes: &[u8], fg: Rgba) -> Self {
        let mut content = Vec::with_capacity(bytes.len());
        let mut line_starts = vec![0];
        let mut longest = 0usize;
        let mut line_len = 0usize;

        for ch in decode_lossy(bytes) {
            if ch == '\n' {
                longest = longest.max(line_len);
                line_len = 0;
                line_starts.push(content.len());
            } else {
                content.push(Cell::new(ch, fg));
                line_len += 1;
            }
        }
        longest = longest.max(line_len);

        Self {
            content,
            line_starts,
            width: longest as u32,
        }
    }

    /// Replace the whole content, recomputing the size
    pub fn set_text(&mut self, text: &str, fg: Rgba) {
        *self = Self::new(text, fg);
    }

    /// Number of stored glyphs
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The stored text with line breaks restored
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.content.len() + self.line_starts.len());
        for row in 0..self.line_starts.len() {
            if row > 0 {
                out.push('\n');
            }
            out.extend(self.content[self.line_range(row)].iter().map(|c| c.ch));
        }
        out
    }

    /// Recolor the foreground of `count` glyphs starting at `start`.
    ///
    /// `count == 0` paints to the end. A `start` at or past the end is a
    /// no-op.
    pub fn paint(&mut self, color: Rgba, start: usize, count: usize) {
        for cell in self.run_mut(start, count) {
            cell.fg = color;
        }
    }

    /// Recolor the background of a run, with the same clamping as [`paint`](Self::paint)
    pub fn paint_background(&mut self, color: Rgba, start: usize, count: usize) {
        for cell in self.run_mut(start, count) {
            cell.bg = color;
        }
    }

    fn run_mut(&mut self, start: usize, count: usize) -> &mut [Cell] {
        let len = self.content.len();
        if start >= len {
            return &mut [];
        }
        let end = if count == 0 {
            len
        } else {
            start.saturating_add(count).min(len)
        };
        &mut self.content[start..end]
    }

    fn line_range(&self, row: usize) -> std::ops::Range<usize> {
        let start = self.line_starts[row];
        let end = self
            .line_starts
            .get(row + 1)
            .copied()
            .unwrap_or(self.content.len());
        start..end
    }
}

impl Glyphs for TextBlock {
    fn size(&self) -> (u32, u32) {
        (self.width, self.line_starts.len() as u32)
    }

    fn glyph_at(&self, x: i32, y: i32) -> Cell {
        let (w, h) = self.size();
        let Some((col, row)) = local_index(x, y, w, h) else {
            return Cell::BLANK;
        };
        let line = self.line_range(row);
        // Lines shorter than the block are padded with blanks
        if col >= line.len() {
            return Cell::BLANK;
        }
        self.content[line.start + col]
    }
}
