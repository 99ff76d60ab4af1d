//! Surfaces
//!
//! A surface is a positioned rectangle that answers "which glyph is at local
//! coordinate (x, y)". The set of kinds is closed:
//!
//! - `Text`: fixed text block with explicit line breaks
//! - `Image`: block-glyph grid built from an RGBA pixel grid
//! - `Progress`: seek bar synthesized from a 0-100 value
//! - `Button`: caller-sized box with a centred label
//!
//! Surfaces know nothing about their siblings or their container.

mod button;
mod image;
mod progress;
mod text;

pub use button::Button;
pub use image::{ImageBlock, ImageState, LoadError, PixelGrid, PixelSource, RgbaBuffer};
pub use progress::ProgressBar;
pub use text::TextBlock;

use crate::core::Cell;

/// Errors from surface geometry changes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("{kind} surfaces take their size from their content; rebuild the content instead")]
    ContentSized { kind: &'static str },
}

/// Content that can be sampled cell by cell
pub trait Glyphs {
    /// `(width, height)` in cells
    fn size(&self) -> (u32, u32);

    /// The cell at local `(x, y)`.
    ///
    /// Total over all integers: anything outside `[0, width) x [0, height)`
    /// is [`Cell::BLANK`].
    fn glyph_at(&self, x: i32, y: i32) -> Cell;
}

/// Map a local coordinate to `(col, row)` if it lies inside `width x height`
pub(crate) fn local_index(x: i32, y: i32, width: u32, height: u32) -> Option<(usize, usize)> {
    if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
        return None;
    }
    Some((x as usize, y as usize))
}

/// The concrete content of a surface
#[derive(Debug, Clone)]
pub enum SurfaceKind {
    Text(TextBlock),
    Image(ImageBlock),
    Progress(ProgressBar),
    Button(Button),
}

impl SurfaceKind {
    fn name(&self) -> &'static str {
        match self {
            SurfaceKind::Text(_) => "text",
            SurfaceKind::Image(_) => "image",
            SurfaceKind::Progress(_) => "progress",
            SurfaceKind::Button(_) => "button",
        }
    }
}

impl Glyphs for SurfaceKind {
    fn size(&self) -> (u32, u32) {
        match self {
            SurfaceKind::Text(t) => t.size(),
            SurfaceKind::Image(i) => i.size(),
            SurfaceKind::Progress(p) => p.size(),
            SurfaceKind::Button(b) => b.size(),
        }
    }

    fn glyph_at(&self, x: i32, y: i32) -> Cell {
        match self {
            SurfaceKind::Text(t) => t.glyph_at(x, y),
            SurfaceKind::Image(i) => i.glyph_at(x, y),
            SurfaceKind::Progress(p) => p.glyph_at(x, y),
            SurfaceKind::Button(b) => b.glyph_at(x, y),
        }
    }
}

/// A surface placed at an origin inside a screen's interior
#[derive(Debug, Clone)]
pub struct Surface {
    x: i32,
    y: i32,
    kind: SurfaceKind,
}

impl Surface {
    pub fn new(x: i32, y: i32, kind: SurfaceKind) -> Self {
        Self { x, y, kind }
    }

    pub fn text(x: i32, y: i32, text: TextBlock) -> Self {
        Self::new(x, y, SurfaceKind::Text(text))
    }

    pub fn image(x: i32, y: i32, image: ImageBlock) -> Self {
        Self::new(x, y, SurfaceKind::Image(image))
    }

    pub fn progress(x: i32, y: i32, bar: ProgressBar) -> Self {
        Self::new(x, y, SurfaceKind::Progress(bar))
    }

    pub fn button(x: i32, y: i32, button: Button) -> Self {
        Self::new(x, y, SurfaceKind::Button(button))
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_origin(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn width(&self) -> u32 {
        self.kind.size().0
    }

    pub fn height(&self) -> u32 {
        self.kind.size().1
    }

    /// Resize a caller-sized surface.
    ///
    /// Text and image surfaces derive their size from their content and
    /// reject this; rebuild their content instead.
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        match &mut self.kind {
            SurfaceKind::Progress(p) => {
                p.resize(width, height);
                Ok(())
            }
            SurfaceKind::Button(b) => {
                b.resize(width, height);
                Ok(())
            }
            other => {
                let kind = other.name();
                tracing::warn!(kind, width, height, "rejected resize of content-sized surface");
                Err(SurfaceError::ContentSized { kind })
            }
        }
    }

    pub fn kind(&self) -> &SurfaceKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut SurfaceKind {
        &mut self.kind
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextBlock> {
        match &mut self.kind {
            SurfaceKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageBlock> {
        match &mut self.kind {
            SurfaceKind::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_progress_mut(&mut self) -> Option<&mut ProgressBar> {
        match &mut self.kind {
            SurfaceKind::Progress(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_button_mut(&mut self) -> Option<&mut Button> {
        match &mut self.kind {
            SurfaceKind::Button(b) => Some(b),
            _ => None,
        }
    }
}

impl Glyphs for Surface {
    fn size(&self) -> (u32, u32) {
        self.kind.size()
    }

    fn glyph_at(&self, x: i32, y: i32) -> Cell {
        self.kind.glyph_at(x, y)
    }
}
