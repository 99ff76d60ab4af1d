//! Seek bar
//!
//! Keeps no cell storage; every glyph is synthesized from the progress value.

use crate::core::{Cell, Rgba};

use super::{local_index, Glyphs};

/// Track glyph, drawn filled or muted
pub const TRACK_GLYPH: char = '─';
/// Marker at the current position
pub const THUMB_GLYPH: char = '●';

/// A horizontal progress bar for a 0-100 value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBar {
    width: u32,
    height: u32,
    progress: u8,
    accent: Rgba,
    muted: Rgba,
}

impl ProgressBar {
    /// A one-row bar; `progress` is clamped to 100
    pub fn new(width: u32, progress: u8) -> Self {
        Self {
            width,
            height: 1,
            progress: progress.min(100),
            accent: Rgba::WHITE,
            muted: Rgba::DARK_GRAY,
        }
    }

    pub fn with_colors(mut self, accent: Rgba, muted: Rgba) -> Self {
        self.accent = accent;
        self.muted = muted;
        self
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }

    /// Number of filled cells: `floor(width * progress / 100)`
    pub fn filled(&self) -> u32 {
        (self.width as u64 * self.progress as u64 / 100) as u32
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl Glyphs for ProgressBar {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn glyph_at(&self, x: i32, y: i32) -> Cell {
        let Some((col, _)) = local_index(x, y, self.width, self.height) else {
            return Cell::BLANK;
        };
        let filled = self.filled() as usize;
        match col.cmp(&filled) {
            std::cmp::Ordering::Less => Cell::new(TRACK_GLYPH, self.accent),
            std::cmp::Ordering::Equal => Cell::new(THUMB_GLYPH, self.accent),
            std::cmp::Ordering::Greater => Cell::new(TRACK_GLYPH, self.muted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_way() {
        let bar = ProgressBar::new(10, 50);
        assert_eq!(bar.filled(), 5);
        for x in 0..5 {
            assert_eq!(bar.glyph_at(x, 0), Cell::new(TRACK_GLYPH, Rgba::WHITE));
        }
        assert_eq!(bar.glyph_at(5, 0), Cell::new(THUMB_GLYPH, Rgba::WHITE));
        for x in 6..10 {
            assert_eq!(bar.glyph_at(x, 0), Cell::new(TRACK_GLYPH, Rgba::DARK_GRAY));
        }
        assert_eq!(bar.glyph_at(10, 0), Cell::BLANK);
        assert_eq!(bar.glyph_at(0, 1), Cell::BLANK);
    }

    #[test]
    fn test_clamped_on_every_set() {
        let mut bar = ProgressBar::new(10, 250);
        assert_eq!(bar.progress(), 100);
        bar.set_progress(30);
        assert_eq!(bar.progress(), 30);
        bar.set_progress(101);
        assert_eq!(bar.progress(), 100);
    }

    #[test]
    fn test_empty_and_full() {
        let empty = ProgressBar::new(4, 0);
        assert_eq!(empty.glyph_at(0, 0).ch, THUMB_GLYPH);
        assert_eq!(empty.glyph_at(1, 0).fg, Rgba::DARK_GRAY);

        // At 100% the thumb sits just past the end and is not drawn
        let full = ProgressBar::new(4, 100);
        for x in 0..4 {
            assert_eq!(full.glyph_at(x, 0), Cell::new(TRACK_GLYPH, Rgba::WHITE));
        }
    }

    #[test]
    fn test_custom_colors() {
        let bar = ProgressBar::new(3, 0).with_colors(Rgba::RED, Rgba::BLACK);
        assert_eq!(bar.glyph_at(0, 0).fg, Rgba::RED);
        assert_eq!(bar.glyph_at(2, 0).fg, Rgba::BLACK);
    }
}
