//! Configuration type definitions.

use super::enums::{AfterResult, ColorSpec};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ink settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Initial ink color - a named color or an RGB array like `[255, 0, 0]`.
    /// When it matches a palette entry that cell starts selected.
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Stroke thickness in pixels (valid range: 1.0 - 50.0)
    #[serde(default = "default_thickness")]
    pub thickness: f64,

    /// Radius of the eraser disc in pixels (valid range: 5.0 - 200.0)
    #[serde(default = "default_eraser_radius")]
    pub eraser_radius: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            thickness: default_thickness(),
            eraser_radius: default_eraser_radius(),
        }
    }
}

/// Color palette strip drawn along the top edge of the frame.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaletteConfig {
    /// Selectable colors, left to right
    #[serde(default = "default_palette_colors")]
    pub colors: Vec<ColorSpec>,

    /// Strip height in pixels (valid range: 10 - 200)
    #[serde(default = "default_palette_height")]
    pub height: u32,

    /// Width of each cell in pixels (valid range: 20 - 400)
    #[serde(default = "default_palette_cell_width")]
    pub cell_width: u32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: default_palette_colors(),
            height: default_palette_height(),
            cell_width: default_palette_cell_width(),
        }
    }
}

/// Idle-triggered recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecognitionConfig {
    /// Seconds of uninterrupted Idle before the canvas is recognized (valid range: 1.0 - 120.0)
    #[serde(default = "default_idle_seconds")]
    pub idle_seconds: f64,

    /// Binarization cutoff applied after inverting the canvas (0 - 254)
    #[serde(default = "default_threshold")]
    pub threshold: u8,

    /// Behaviour of a hand-free frame while a result is displayed
    #[serde(default)]
    pub after_result: AfterResult,

    /// OCR program; receives the binarized PNG on stdin and prints one
    /// text fragment per line
    #[serde(default = "default_recognizer_command")]
    pub command: String,

    /// Arguments passed to the OCR program
    #[serde(default = "default_recognizer_args")]
    pub args: Vec<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            idle_seconds: default_idle_seconds(),
            threshold: default_threshold(),
            after_result: AfterResult::default(),
            command: default_recognizer_command(),
            args: default_recognizer_args(),
        }
    }
}

/// Hand landmark helper process.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrackerConfig {
    /// Helper program; when unset, frames must carry their own landmarks
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments passed to the helper
    #[serde(default)]
    pub args: Vec<String>,

    /// Minimum hand confidence accepted from the helper (0.0 - 1.0)
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            min_confidence: default_min_confidence(),
        }
    }
}

/// Response frame presentation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UiConfig {
    /// Flip incoming frames horizontally before detection (selfie view)
    #[serde(default = "default_mirror")]
    pub mirror: bool,

    /// Show the idle countdown bar
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,

    /// Draw the detected hand skeleton on the response frame
    #[serde(default = "default_show_landmarks")]
    pub show_landmarks: bool,

    /// Font family for status and result text
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font size for status and result text (valid range: 8.0 - 72.0)
    #[serde(default = "default_status_font_size")]
    pub status_font_size: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            mirror: default_mirror(),
            show_progress: default_show_progress(),
            show_landmarks: default_show_landmarks(),
            font_family: default_font_family(),
            status_font_size: default_status_font_size(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_color() -> ColorSpec {
    ColorSpec::Name("white".to_string())
}

fn default_thickness() -> f64 {
    10.0
}

fn default_eraser_radius() -> f64 {
    30.0
}

pub(super) fn default_palette_colors() -> Vec<ColorSpec> {
    ["white", "red", "green", "blue"]
        .into_iter()
        .map(|name| ColorSpec::Name(name.to_string()))
        .collect()
}

fn default_palette_height() -> u32 {
    50
}

fn default_palette_cell_width() -> u32 {
    100
}

fn default_idle_seconds() -> f64 {
    7.0
}

fn default_threshold() -> u8 {
    127
}

fn default_recognizer_command() -> String {
    "tesseract".to_string()
}

fn default_recognizer_args() -> Vec<String> {
    ["stdin", "stdout", "--psm", "7"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_min_confidence() -> f64 {
    0.7
}

fn default_mirror() -> bool {
    true
}

fn default_show_progress() -> bool {
    true
}

fn default_show_landmarks() -> bool {
    true
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_status_font_size() -> f64 {
    18.0
}
