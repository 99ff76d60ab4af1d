//! Renderer
//!
//! Owns the render loop: selects the active screen, composites it and
//! streams the result to the terminal as ANSI text, followed by the input
//! line. Producers on other threads only flip the dirty flag; the draw pass
//! itself runs on the render thread without holding the state lock.

mod compositor;
mod frame;

pub use compositor::{shared, Renderer, SharedScreen};
pub use frame::encode_frame;
