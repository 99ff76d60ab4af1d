//! Image surface
//!
//! Turns a pre-sized RGBA pixel grid into a grid of solid block glyphs, one
//! per pixel. Decoding and resizing images is the job of a [`PixelSource`];
//! this module only consumes the resulting grid.

use crate::core::{Cell, Rgba};

use super::{local_index, Glyphs};

/// Glyph used for every image pixel
pub const BLOCK_GLYPH: char = '█';
/// Glyph filling an image whose load failed
pub const BROKEN_GLYPH: char = '╳';

/// Failure to obtain pixel data
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("image data unavailable: {0}")]
    Unavailable(String),

    #[error("pixel grid is {width}x{height} but holds {actual} pixels")]
    DimensionMismatch { width: u32, height: u32, actual: usize },

    #[error("source returned a {actual_width}x{actual_height} grid for a {width}x{height} block")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fixed `width x height` grid of RGBA pixels, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self, LoadError> {
        if pixels.len() != width as usize * height as usize {
            return Err(LoadError::DimensionMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// Supplier of pixel grids resized to a caller-chosen target
pub trait PixelSource {
    fn fetch(&self, width: u32, height: u32) -> Result<PixelGrid, LoadError>;
}

/// Raw RGBA8 bytes held in memory, sampled nearest-neighbour to any target size
#[derive(Debug, Clone)]
pub struct RgbaBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl RgbaBuffer {
    pub fn new(width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self { width, height, bytes }
    }

    /// Build a buffer by evaluating `f` at every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut bytes = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                bytes.extend_from_slice(&f(x, y).0.to_be_bytes());
            }
        }
        Self { width, height, bytes }
    }
}

impl PixelSource for RgbaBuffer {
    fn fetch(&self, width: u32, height: u32) -> Result<PixelGrid, LoadError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.width == 0 || self.height == 0 || self.bytes.len() < expected {
            return Err(LoadError::Unavailable(format!(
                "{}x{} buffer holds {} of {} bytes",
                self.width,
                self.height,
                self.bytes.len(),
                expected
            )));
        }

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            let sy = (y as u64 * self.height as u64 / height as u64) as usize;
            for x in 0..width {
                let sx = (x as u64 * self.width as u64 / width as u64) as usize;
                let i = (sy * self.width as usize + sx) * 4;
                let px = &self.bytes[i..i + 4];
                pixels.push(Rgba::rgba(px[0], px[1], px[2], px[3]));
            }
        }
        PixelGrid::new(width, height, pixels)
    }
}

/// What an image block currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    /// Never loaded; all blanks
    Empty,
    Loaded,
    /// Last load failed with nothing to fall back to; shows the broken glyph
    Failed,
}

/// Block-glyph rendition of an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    cells: Vec<Cell>,
    width: u32,
    height: u32,
    state: ImageState,
    /// Color of the broken glyph
    error_color: Rgba,
}

impl ImageBlock {
    /// An empty block of the given size, waiting for [`load`](Self::load)
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![Cell::BLANK; width as usize * height as usize],
            width,
            height,
            state: ImageState::Empty,
            error_color: Rgba::RED,
        }
    }

    pub fn with_error_color(mut self, color: Rgba) -> Self {
        self.error_color = color;
        self
    }

    /// Build a block directly from a grid
    pub fn from_pixels(grid: &PixelGrid) -> Self {
        let mut block = Self::new(grid.width, grid.height);
        block.set_pixels(grid);
        block
    }

    /// Fetch pixels from `source` at this block's size.
    ///
    /// On failure, previously loaded content is kept; a block that never
    /// loaded is filled with the broken glyph.
    pub fn load(&mut self, source: &dyn PixelSource) -> Result<(), LoadError> {
        let result = source.fetch(self.width, self.height).and_then(|grid| {
            if grid.width != self.width || grid.height != self.height {
                return Err(LoadError::SizeMismatch {
                    width: self.width,
                    height: self.height,
                    actual_width: grid.width,
                    actual_height: grid.height,
                });
            }
            Ok(grid)
        });

        match result {
            Ok(grid) => {
                self.set_pixels(&grid);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "image load failed");
                if self.state != ImageState::Loaded {
                    self.cells.fill(Cell::new(BROKEN_GLYPH, self.error_color));
                    self.state = ImageState::Failed;
                }
                Err(e)
            }
        }
    }

    /// Rebuild the block from a grid, taking the grid's dimensions
    pub fn set_pixels(&mut self, grid: &PixelGrid) {
        self.width = grid.width;
        self.height = grid.height;
        self.cells = grid
            .pixels
            .iter()
            .map(|&px| Cell::new(BLOCK_GLYPH, px))
            .collect();
        self.state = ImageState::Loaded;
    }

    pub fn state(&self) -> ImageState {
        self.state
    }
}

impl Glyphs for ImageBlock {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn glyph_at(&self, x: i32, y: i32) -> Cell {
        match local_index(x, y, self.width, self.height) {
            Some((col, row)) => self
                .cells
                .get(row * self.width as usize + col)
                .copied()
                .unwrap_or(Cell::BLANK),
            None => Cell::BLANK,
        }
    }
}
