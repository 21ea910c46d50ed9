//! Configuration enum types.

use crate::draw::{Color, color::WHITE};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What a hand-free frame does while a recognition outcome is on screen.
///
/// The outcome (Result or Invalid Expression) can either stay up until the
/// next draw/erase gesture, or fall back to Idle and re-arm the idle timer so
/// the canvas is recognized again after another idle period.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AfterResult {
    /// Keep showing the outcome until Pointing or Fist is seen
    #[default]
    Hold,
    /// Return to Idle and start a new idle period
    Rearm,
}

/// Color specification - either a named color or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// default_color = "red"
///
/// # Custom RGB color (0-255 per component)
/// default_color = [255, 128, 0]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color: white, red, green, blue, yellow, black
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`] struct.
    ///
    /// Unknown color names default to white with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => crate::util::name_to_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using white", name);
                WHITE
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgb8(*r, *g, *b),
        }
    }

    /// Display name for palette cells.
    pub fn display_name(&self) -> String {
        match self {
            ColorSpec::Name(name) => {
                let mut chars = name.trim().chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                }
            }
            ColorSpec::Rgb([r, g, b]) => format!("#{r:02x}{g:02x}{b:02x}"),
        }
    }
}
