//! Configuration file support for luxdraw.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/luxdraw/config.toml`. Settings include ink defaults, the color
//! palette layout, recognition timing and the external helper programs.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{AfterResult, ColorSpec};
pub use types::{DrawingConfig, PaletteConfig, RecognitionConfig, TrackerConfig, UiConfig};

use crate::draw::{Palette, PaletteEntry};
use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [drawing]
/// default_color = "white"
/// thickness = 10.0
/// eraser_radius = 30.0
///
/// [palette]
/// colors = ["white", "red", "green", "blue"]
///
/// [recognition]
/// idle_seconds = 7.0
/// after_result = "hold"
/// command = "tesseract"
/// args = ["stdin", "stdout", "--psm", "7"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Ink defaults (color, thickness, eraser size)
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Palette strip layout and colors
    #[serde(default)]
    pub palette: PaletteConfig,

    /// Idle timer and OCR settings
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Hand landmark helper process
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Response frame presentation
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `drawing.thickness`: 1.0 - 50.0
    /// - `drawing.eraser_radius`: 5.0 - 200.0
    /// - `palette.height`: 10 - 200, `palette.cell_width`: 20 - 400
    /// - `recognition.idle_seconds`: 1.0 - 120.0
    /// - `recognition.threshold`: 0 - 254
    /// - `tracker.min_confidence`: 0.0 - 1.0
    /// - `ui.status_font_size`: 8.0 - 72.0
    pub fn validate_and_clamp(&mut self) {
        if !(1.0..=50.0).contains(&self.drawing.thickness) {
            log::warn!(
                "Invalid thickness {:.1}, clamping to 1.0-50.0 range",
                self.drawing.thickness
            );
            self.drawing.thickness = clamp_f64(self.drawing.thickness, 1.0, 50.0);
        }

        if !(5.0..=200.0).contains(&self.drawing.eraser_radius) {
            log::warn!(
                "Invalid eraser_radius {:.1}, clamping to 5.0-200.0 range",
                self.drawing.eraser_radius
            );
            self.drawing.eraser_radius = clamp_f64(self.drawing.eraser_radius, 5.0, 200.0);
        }

        if self.palette.colors.is_empty() {
            log::warn!("Palette has no colors, falling back to white/red/green/blue");
            self.palette.colors = types::default_palette_colors();
        }

        if !(10..=200).contains(&self.palette.height) {
            log::warn!(
                "Invalid palette height {}, clamping to 10-200 range",
                self.palette.height
            );
            self.palette.height = self.palette.height.clamp(10, 200);
        }

        if !(20..=400).contains(&self.palette.cell_width) {
            log::warn!(
                "Invalid palette cell_width {}, clamping to 20-400 range",
                self.palette.cell_width
            );
            self.palette.cell_width = self.palette.cell_width.clamp(20, 400);
        }

        if !(1.0..=120.0).contains(&self.recognition.idle_seconds) {
            log::warn!(
                "Invalid idle_seconds {:.2}, clamping to 1.0-120.0 range",
                self.recognition.idle_seconds
            );
            self.recognition.idle_seconds = clamp_f64(self.recognition.idle_seconds, 1.0, 120.0);
        }

        // 255 would binarize everything to black
        if self.recognition.threshold == u8::MAX {
            log::warn!("Invalid threshold 255, clamping to 254");
            self.recognition.threshold = 254;
        }

        if self.recognition.command.trim().is_empty() {
            log::warn!("Empty recognition command, falling back to 'tesseract'");
            self.recognition.command = "tesseract".to_string();
        }

        if !(0.0..=1.0).contains(&self.tracker.min_confidence) {
            log::warn!(
                "Invalid min_confidence {:.2}, clamping to 0.0-1.0 range",
                self.tracker.min_confidence
            );
            self.tracker.min_confidence = clamp_f64(self.tracker.min_confidence, 0.0, 1.0);
        }

        if !(8.0..=72.0).contains(&self.ui.status_font_size) {
            log::warn!(
                "Invalid status_font_size {:.1}, clamping to 8.0-72.0 range",
                self.ui.status_font_size
            );
            self.ui.status_font_size = clamp_f64(self.ui.status_font_size, 8.0, 72.0);
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/luxdraw/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("luxdraw");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from `path` (or the default location), or returns
    /// defaults if the file does not exist.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::get_config_path()?,
        };

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;
        config.validate_and_clamp();
        Ok(config)
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Builds the runtime palette from the configured colors.
    pub fn palette(&self) -> Palette {
        let entries = self
            .palette
            .colors
            .iter()
            .map(|spec| PaletteEntry::new(spec.display_name(), spec.to_color()))
            .collect();
        Palette::new(entries, self.palette.height, self.palette.cell_width)
    }

    /// Idle period after which the canvas is recognized.
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs_f64(self.recognition.idle_seconds)
    }
}

/// Clamps, mapping NaN to the lower bound.
fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}
