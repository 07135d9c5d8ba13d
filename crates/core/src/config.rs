//! Editor configuration and per-session drawing settings.
//!
//! `EditorConfig` holds the tunable constants of the engine (erase width,
//! text box minimums, palette granularity) and the initial drawing settings.
//! It can be built programmatically, loaded from a TOML file, or overridden
//! from environment variables.

use crate::annotation::Color;
use crate::color::Palette;
use crate::error::{EditorError, EditorResult};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Configuration for the annotation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Initial ink and text color
    pub drawing_color: Color,
    /// Initial stroke width in points; also the text font size
    pub drawing_width: f64,
    /// Initial drawing alpha
    pub drawing_alpha: f32,
    /// Width of the outline built around a stroke when erasing
    pub erase_width: f64,
    /// Minimum text box width
    pub text_min_width: f64,
    /// Added to the stroke width to get the minimum text box height
    pub text_height_padding: f64,
    /// Initial value of a new text box
    pub text_placeholder: String,
    /// Background tint alpha of a text box while it is being edited
    pub text_background_alpha: f32,
    /// Side of one palette swatch
    pub palette_cell_size: f64,
    /// Fraction of the palette height taken by the grayscale strip
    pub palette_gray_fraction: f64,
    /// Multiplier from a 0..1 width slider to a stroke width
    pub width_slider_scale: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drawing_color: Color::RED,
            drawing_width: 15.0,
            drawing_alpha: 1.0,
            erase_width: 10.0,
            text_min_width: 150.0,
            text_height_padding: 8.0,
            text_placeholder: "Text here...".to_string(),
            text_background_alpha: 0.1,
            palette_cell_size: 10.0,
            palette_gray_fraction: 0.1,
            width_slider_scale: 50.0,
        }
    }
}

impl EditorConfig {
    /// Sets the initial drawing color.
    pub fn with_drawing_color(mut self, color: Color) -> Self {
        self.drawing_color = color;
        self
    }

    /// Sets the initial stroke width.
    pub fn with_drawing_width(mut self, width: f64) -> Self {
        self.drawing_width = width;
        self
    }

    /// Sets the initial drawing alpha.
    pub fn with_drawing_alpha(mut self, alpha: f32) -> Self {
        self.drawing_alpha = alpha;
        self
    }

    /// Sets the erase outline width.
    pub fn with_erase_width(mut self, width: f64) -> Self {
        self.erase_width = width;
        self
    }

    /// Sets the minimum text box width.
    pub fn with_text_min_width(mut self, width: f64) -> Self {
        self.text_min_width = width;
        self
    }

    /// Sets the palette swatch size.
    pub fn with_palette_cell_size(mut self, size: f64) -> Self {
        self.palette_cell_size = size;
        self
    }

    /// Loads configuration from environment variables on top of the defaults.
    ///
    /// Environment variables:
    /// - `PDF_INK_DRAWING_WIDTH`: initial stroke width (default: 15)
    /// - `PDF_INK_DRAWING_ALPHA`: initial alpha (default: 1)
    /// - `PDF_INK_ERASE_WIDTH`: erase outline width (default: 10)
    /// - `PDF_INK_TEXT_MIN_WIDTH`: minimum text box width (default: 150)
    /// - `PDF_INK_PALETTE_CELL_SIZE`: palette swatch size (default: 10)
    ///
    /// # Errors
    /// Returns an error if any variable is not a number or fails validation.
    pub fn from_env() -> EditorResult<Self> {
        Self::default().apply_env()
    }

    /// Applies environment overrides to this configuration.
    pub fn apply_env(mut self) -> EditorResult<Self> {
        if let Some(width) = env_value("PDF_INK_DRAWING_WIDTH")? {
            self.drawing_width = width;
        }
        if let Some(alpha) = env_value("PDF_INK_DRAWING_ALPHA")? {
            self.drawing_alpha = alpha;
        }
        if let Some(width) = env_value("PDF_INK_ERASE_WIDTH")? {
            self.erase_width = width;
        }
        if let Some(width) = env_value("PDF_INK_TEXT_MIN_WIDTH")? {
            self.text_min_width = width;
        }
        if let Some(size) = env_value("PDF_INK_PALETTE_CELL_SIZE")? {
            self.palette_cell_size = size;
        }

        self.validate()?;
        Ok(self)
    }

    /// Loads configuration from a TOML file.
    ///
    /// Missing keys keep their defaults:
    /// ```toml
    /// drawing_width = 15.0
    /// erase_width = 10.0
    ///
    /// [drawing_color]
    /// r = 1.0
    /// g = 0.0
    /// b = 0.0
    /// a = 1.0
    /// ```
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> EditorResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|source| EditorError::ConfigIo { path: path.to_path_buf(), source })?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> EditorResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Converts configuration to TOML format.
    pub fn to_toml_string(&self) -> EditorResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Checks that every value is usable by the engine.
    pub fn validate(&self) -> EditorResult<()> {
        if !(self.drawing_width > 0.0) || !self.drawing_width.is_finite() {
            return Err(EditorError::InvalidStrokeWidth(self.drawing_width));
        }
        if !(0.0..=1.0).contains(&self.drawing_alpha) {
            return Err(EditorError::InvalidAlpha(self.drawing_alpha));
        }
        positive("erase_width", self.erase_width)?;
        positive("text_min_width", self.text_min_width)?;
        positive("palette_cell_size", self.palette_cell_size)?;
        positive("width_slider_scale", self.width_slider_scale)?;
        if self.text_height_padding < 0.0 {
            return Err(invalid("text_height_padding", "must not be negative"));
        }
        if !(0.0..1.0).contains(&self.palette_gray_fraction) {
            return Err(invalid("palette_gray_fraction", "must be within 0..1"));
        }
        if !(0.0..=1.0).contains(&self.text_background_alpha) {
            return Err(invalid("text_background_alpha", "must be within 0..=1"));
        }
        Ok(())
    }

    /// Drawing settings a new session starts with.
    pub fn initial_settings(&self) -> DrawSettings {
        DrawSettings {
            color: self.drawing_color,
            width: self.drawing_width,
            alpha: self.drawing_alpha,
        }
    }

    /// Color palette laid out over `bounds` with the configured grid.
    pub fn palette(&self, bounds: Rect) -> EditorResult<Palette> {
        Palette::new(bounds, self.palette_cell_size, self.palette_gray_fraction)
    }
}

fn positive(key: &'static str, value: f64) -> EditorResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(key, "must be finite and positive"))
    }
}

fn invalid(key: &'static str, reason: &str) -> EditorError {
    EditorError::InvalidConfig { key, reason: reason.to_string() }
}

fn env_value<T: FromStr>(key: &'static str) -> EditorResult<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(key, &format!("not a number: {value:?}"))),
        Err(_) => Ok(None),
    }
}

/// Color, width and alpha applied to new annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawSettings {
    color: Color,
    width: f64,
    alpha: f32,
}

impl DrawSettings {
    pub fn new(color: Color, width: f64, alpha: f32) -> EditorResult<Self> {
        let mut settings = Self { color, width: 1.0, alpha: 1.0 };
        settings.set_width(width)?;
        settings.set_alpha(alpha)?;
        Ok(settings)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Sets the drawing color; its own alpha is ignored in favor of `alpha`.
    pub fn set_color(&mut self, color: Color) {
        self.color = color.with_alpha(1.0);
    }

    pub fn set_width(&mut self, width: f64) -> EditorResult<()> {
        if !(width > 0.0) || !width.is_finite() {
            return Err(EditorError::InvalidStrokeWidth(width));
        }
        self.width = width;
        Ok(())
    }

    pub fn set_alpha(&mut self, alpha: f32) -> EditorResult<()> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(EditorError::InvalidAlpha(alpha));
        }
        self.alpha = alpha;
        Ok(())
    }
}

impl Default for DrawSettings {
    fn default() -> Self {
        EditorConfig::default().initial_settings()
    }
}
