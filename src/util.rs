//! Utility functions for color naming and geometry.
//!
//! This module provides:
//! - Color name ↔ [`Color`] mapping used by configuration and the compositor
//! - Small geometry helpers shared by the canvas and palette code

use crate::draw::{Color, color::*};

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
///
/// # Supported Names (case-insensitive)
/// - "white", "red", "green", "blue", "yellow", "black"
///
/// # Returns
/// - `Some(Color)` if the name matches a predefined color
/// - `None` if the name is not recognized
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.trim().to_lowercase().as_str() {
        "white" => Some(WHITE),
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "black" => Some(BLACK),
        _ => None,
    }
}

/// Maps a Color value to its human-readable name.
///
/// Uses approximate matching (threshold-based) to identify colors.
/// Returns "Custom" if the color doesn't match any predefined color.
pub fn color_to_name(color: &Color) -> &'static str {
    if color.r > 0.9 && color.g > 0.9 && color.b > 0.9 {
        "White"
    } else if color.r > 0.9 && color.g < 0.1 && color.b < 0.1 {
        "Red"
    } else if color.r < 0.1 && color.g > 0.9 && color.b < 0.1 {
        "Green"
    } else if color.r < 0.1 && color.g < 0.1 && color.b > 0.9 {
        "Blue"
    } else if color.r > 0.9 && color.g > 0.9 && color.b < 0.1 {
        "Yellow"
    } else if color.r < 0.1 && color.g < 0.1 && color.b < 0.1 {
        "Black"
    } else {
        "Custom"
    }
}

// ============================================================================
// Geometry Utilities
// ============================================================================

/// Converts a normalized coordinate pair into integer pixel coordinates.
///
/// Values are scaled by the frame size and truncated toward zero, so a
/// normalized `1.0` lands one pixel past the last column/row. Out-of-range
/// results are left for the raster primitives to clip.
pub fn normalized_to_pixel(x: f64, y: f64, width: u32, height: u32) -> (i32, i32) {
    ((x * width as f64) as i32, (y * height as f64) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_color_mappings_round_trip() {
        assert_eq!(name_to_color("white").unwrap(), WHITE);
        assert_eq!(name_to_color(" Blue ").unwrap(), BLUE);
        assert!(name_to_color("chartreuse").is_none());
        assert_eq!(color_to_name(&RED), "Red");
        assert_eq!(color_to_name(&GREEN), "Green");
    }

    #[test]
    fn color_to_name_falls_back_to_custom() {
        assert_eq!(
            color_to_name(&Color {
                r: 0.42,
                g: 0.42,
                b: 0.42,
                a: 1.0
            }),
            "Custom"
        );
    }

    #[test]
    fn normalized_coordinates_scale_and_truncate() {
        assert_eq!(normalized_to_pixel(0.5, 0.25, 640, 480), (320, 120));
        assert_eq!(normalized_to_pixel(0.999, 0.999, 100, 100), (99, 99));
        assert_eq!(normalized_to_pixel(-0.01, 1.2, 100, 100), (-1, 120));
    }
}
