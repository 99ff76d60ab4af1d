//! Screen model
//!
//! A screen owns an ordered stack of surfaces, a border frame, and the
//! composited buffer the renderer streams to the terminal. The outermost ring
//! of the buffer belongs to the frame; surfaces are placed in the interior
//! with a +1 offset and anything falling outside it is dropped.

use crate::surface::{Glyphs, Surface};

use super::cell::{Cell, Rgba};

/// Handle to a surface owned by a [`Screen`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

/// Glyphs and color of the border frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStyle {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    pub color: Rgba,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
            color: Rgba::WHITE,
        }
    }
}

impl FrameStyle {
    /// Rounded corners
    pub fn rounded(color: Rgba) -> Self {
        Self {
            top_left: '╭',
            top_right: '╮',
            bottom_left: '╰',
            bottom_right: '╯',
            color,
            ..Self::default()
        }
    }
}

/// A framed container of surfaces with its composited buffer
#[derive(Debug, Clone)]
pub struct Screen {
    width: u32,
    height: u32,
    /// Bottommost first
    surfaces: Vec<(SurfaceId, Surface)>,
    next_id: u64,
    /// Row-major, `height * width`
    buffer: Vec<Cell>,
    frame: FrameStyle,
    frame_dirty: bool,
}

impl Screen {
    /// Create a screen with the default frame
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_frame(width, height, FrameStyle::default())
    }

    pub fn with_frame(width: u32, height: u32, frame: FrameStyle) -> Self {
        let mut screen = Self {
            width,
            height,
            surfaces: Vec::new(),
            next_id: 0,
            buffer: vec![Cell::BLANK; width as usize * height as usize],
            frame,
            frame_dirty: true,
        };
        screen.draw_frame();
        screen
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_style(&self) -> FrameStyle {
        self.frame
    }

    /// Change the frame; it is redrawn on the next composite
    pub fn set_frame_style(&mut self, frame: FrameStyle) {
        self.frame = frame;
        self.frame_dirty = true;
    }

    /// Redraw the frame on the next composite
    pub fn request_frame_redraw(&mut self) {
        self.frame_dirty = true;
    }

    /// Add a surface on top of the stack
    pub fn add_surface(&mut self, surface: Surface) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.push((id, surface));
        id
    }

    pub fn remove_surface(&mut self, id: SurfaceId) -> Option<Surface> {
        let index = self.surfaces.iter().position(|(sid, _)| *sid == id)?;
        Some(self.surfaces.remove(index).1)
    }

    pub fn clear_surfaces(&mut self) {
        self.surfaces.clear();
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, s)| s)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces
            .iter_mut()
            .find(|(sid, _)| *sid == id)
            .map(|(_, s)| s)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Rebuild the buffer from the surface stack.
    ///
    /// Clears the interior, redraws the frame if requested, then paints every
    /// surface bottom to top. Later surfaces overwrite earlier ones.
    pub fn composite(&mut self) -> &[Cell] {
        self.clear_interior();
        if self.frame_dirty {
            self.draw_frame();
        }
        for (_, surface) in &self.surfaces {
            composite_surface(&mut self.buffer, self.width, self.height, surface);
        }
        &self.buffer
    }

    /// The buffer as of the last composite
    pub fn buffer(&self) -> &[Cell] {
        &self.buffer
    }

    pub fn cell(&self, x: u32, y: u32) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.buffer.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn row(&self, y: u32) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let w = self.width as usize;
        let start = y as usize * w;
        self.buffer.get(start..start + w)
    }

    /// The buffer's glyphs as newline-separated rows
    pub fn text_snapshot(&self) -> String {
        let mut out = String::with_capacity(self.buffer.len() + self.height as usize);
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            if let Some(row) = self.row(y) {
                out.extend(row.iter().map(|c| c.ch));
            }
        }
        out
    }

    fn clear_interior(&mut self) {
        if self.width < 3 || self.height < 3 {
            return;
        }
        let w = self.width as usize;
        for y in 1..self.height as usize - 1 {
            self.buffer[y * w + 1..(y + 1) * w - 1].fill(Cell::BLANK);
        }
    }

    fn draw_frame(&mut self) {
        self.frame_dirty = false;
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (w, h) = (self.width as usize, self.height as usize);
        let f = self.frame;
        let glyph = |ch| Cell::new(ch, f.color);

        for x in 1..w.saturating_sub(1) {
            self.buffer[x] = glyph(f.horizontal);
            self.buffer[(h - 1) * w + x] = glyph(f.horizontal);
        }
        for y in 1..h.saturating_sub(1) {
            self.buffer[y * w] = glyph(f.vertical);
            self.buffer[y * w + w - 1] = glyph(f.vertical);
        }
        self.buffer[0] = glyph(f.top_left);
        self.buffer[w - 1] = glyph(f.top_right);
        self.buffer[(h - 1) * w] = glyph(f.bottom_left);
        self.buffer[(h - 1) * w + w - 1] = glyph(f.bottom_right);
    }
}

/// Paint one surface into the interior of a `width x height` buffer.
///
/// Buffer coordinates are `origin + local + 1`; only cells strictly inside
/// the frame ring are written.
pub fn composite_surface(buffer: &mut [Cell], width: u32, height: u32, surface: &Surface) {
    if width < 3 || height < 3 {
        return;
    }
    let (sw, sh) = surface.size();
    let (ox, oy) = (surface.x() as i64 + 1, surface.y() as i64 + 1);

    // Interior is [1, width - 2] x [1, height - 2]; clip local ranges to it
    let x_start = (1 - ox).max(0);
    let x_end = (width as i64 - 1 - ox).min(sw as i64);
    let y_start = (1 - oy).max(0);
    let y_end = (height as i64 - 1 - oy).min(sh as i64);

    let w = width as usize;
    for y in y_start..y_end {
        let row = ((oy + y) as usize) * w;
        for x in x_start..x_end {
            buffer[row + (ox + x) as usize] = surface.glyph_at(x as i32, y as i32);
        }
    }
}
