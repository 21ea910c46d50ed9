//! Raster primitives for the ink canvas.
//!
//! This module defines the drawing types the session mutates every frame:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`Canvas`]: the persistent cairo raster that accumulates ink
//! - [`Palette`]: the fixed color strip and its hit test

pub mod canvas;
pub mod color;
pub mod palette;

// Re-export commonly used types at module level
pub use canvas::{Canvas, CanvasError};
pub use color::Color;
pub use palette::{Palette, PaletteEntry};

pub use color::{BLACK, BLUE, GREEN, RED, WHITE, YELLOW};
