//! Fixed color palette strip along the top edge of the frame.

use super::color::{BLUE, Color, GREEN, RED, WHITE};

/// One selectable ink color.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    /// Display name (e.g. "Red")
    pub name: String,
    pub color: Color,
}

impl PaletteEntry {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Palette layout: `entries.len()` equal-width cells starting at x = 0,
/// `height` pixels tall, anchored at the top of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    height: u32,
    cell_width: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(
            vec![
                PaletteEntry::new("White", WHITE),
                PaletteEntry::new("Red", RED),
                PaletteEntry::new("Green", GREEN),
                PaletteEntry::new("Blue", BLUE),
            ],
            50,
            100,
        )
    }
}

impl Palette {
    /// Builds a palette. Zero sizes are bumped to one pixel.
    pub fn new(entries: Vec<PaletteEntry>, height: u32, cell_width: u32) -> Self {
        Self {
            entries,
            height: height.max(1),
            cell_width: cell_width.max(1),
        }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&PaletteEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    /// Returns the palette cell under a pixel coordinate, if any.
    ///
    /// A point hits cell `i` when `0 <= y < height` and `i = x / cell_width`
    /// names an existing entry.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || y as u32 >= self.height {
            return None;
        }
        let index = (x as u32 / self.cell_width) as usize;
        (index < self.entries.len()).then_some(index)
    }

    /// Pixel rectangle `(x, y, width, height)` of cell `index`.
    pub fn cell_rect(&self, index: usize) -> (f64, f64, f64, f64) {
        (
            index as f64 * self.cell_width as f64,
            0.0,
            self.cell_width as f64,
            self.height as f64,
        )
    }
}
