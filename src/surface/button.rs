//! Button surface: a caller-sized box with its label centred on the middle row

use crate::core::{Cell, Rgba, DEFAULT_BG};

use super::{local_index, Glyphs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    width: u32,
    height: u32,
    label: Vec<char>,
    fg: Rgba,
    bg: Rgba,
    pressed: bool,
}

impl Button {
    pub fn new(width: u32, height: u32, label: &str) -> Self {
        Self {
            width,
            height,
            label: label.chars().collect(),
            fg: Rgba::WHITE,
            bg: DEFAULT_BG,
            pressed: false,
        }
    }

    pub fn with_colors(mut self, fg: Rgba, bg: Rgba) -> Self {
        self.fg = fg;
        self.bg = bg;
        self
    }

    pub fn label(&self) -> String {
        self.label.iter().collect()
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.chars().collect();
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// A pressed button swaps its foreground and background
    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn colors(&self) -> (Rgba, Rgba) {
        if self.pressed {
            (self.bg, self.fg)
        } else {
            (self.fg, self.bg)
        }
    }
}

impl Glyphs for Button {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn glyph_at(&self, x: i32, y: i32) -> Cell {
        let Some((col, row)) = local_index(x, y, self.width, self.height) else {
            return Cell::BLANK;
        };
        let (fg, bg) = self.colors();
        let fill = Cell::new(' ', fg).with_bg(bg);

        if row != self.height as usize / 2 {
            return fill;
        }
        let start = (self.width as usize).saturating_sub(self.label.len()) / 2;
        match col.checked_sub(start).and_then(|i| self.label.get(i)) {
            Some(&ch) => Cell::new(ch, fg).with_bg(bg),
            None => fill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(b: &Button, row: i32) -> String {
        (0..b.size().0 as i32).map(|x| b.glyph_at(x, row).ch).collect()
    }

    #[test]
    fn test_label_centred_on_middle_row() {
        let b = Button::new(8, 3, "play");
        assert_eq!(row_text(&b, 0), "        ");
        assert_eq!(row_text(&b, 1), "  play  ");
        assert_eq!(row_text(&b, 2), "        ");
    }

    #[test]
    fn test_long_label_is_cut() {
        let b = Button::new(3, 1, "shuffle");
        assert_eq!(row_text(&b, 0), "shu");
    }

    #[test]
    fn test_pressed_swaps_colors() {
        let mut b = Button::new(4, 1, "ok").with_colors(Rgba::WHITE, Rgba::RED);
        assert_eq!(b.glyph_at(1, 0).fg, Rgba::WHITE);
        b.set_pressed(true);
        assert!(b.is_pressed());
        let cell = b.glyph_at(1, 0);
        assert_eq!((cell.fg, cell.bg), (Rgba::RED, Rgba::WHITE));
    }

    #[test]
    fn test_set_label() {
        let mut b = Button::new(5, 1, "a");
        b.set_label("abc");
        assert_eq!(b.label(), "abc");
        assert_eq!(row_text(&b, 0), " abc ");
    }
}
