//! Overlay options with TOML file support.
//!
//! All sub-structs use `#[serde(default)]` so partial TOML files (e.g. only
//! overriding `[picking]`) work correctly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canvas::Color;
use crate::error::PickError;

/// How the hidden target is read back for a query.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ReadbackMode {
    /// Read the whole drawing buffer and index into it.
    FullBuffer,
    /// Read only the pixel under the query point.
    #[default]
    SinglePixel,
}

/// Canvas creation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CanvasOptions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Visible background as `[r, g, b]`.
    pub background: [u8; 3],
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: [0, 0, 0],
        }
    }
}

impl CanvasOptions {
    /// Background as an opaque color.
    #[must_use]
    pub fn background_color(&self) -> Color {
        let [r, g, b] = self.background;
        Color::rgb(r, g, b)
    }
}

/// Picking parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PickingOptions {
    /// Readback strategy for queries.
    pub readback: ReadbackMode,
}

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PickerOptions {
    /// Canvas size and background.
    pub canvas: CanvasOptions,
    /// Picking behavior.
    pub picking: PickingOptions,
}

impl PickerOptions {
    /// Parse options from TOML text. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`PickError::OptionsParse`] on malformed TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, PickError> {
        toml::from_str(content).map_err(|e| PickError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`PickError::Io`] if the file cannot be read,
    /// [`PickError::OptionsParse`] on malformed TOML.
    pub fn load(path: &Path) -> Result<Self, PickError> {
        let content = std::fs::read_to_string(path).map_err(PickError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// [`PickError::OptionsParse`] if serialization fails,
    /// [`PickError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), PickError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PickError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(PickError::Io)?;
        }
        std::fs::write(path, content).map_err(PickError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = PickerOptions::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = PickerOptions::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[picking]
readback = "full_buffer"
"#;
        let opts = PickerOptions::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.picking.readback, ReadbackMode::FullBuffer);
        assert_eq!(opts.canvas, CanvasOptions::default());
    }

    #[test]
    fn background_converts_to_color() {
        let opts = PickerOptions::from_toml_str(
            "[canvas]\nbackground = [10, 20, 30]\n",
        )
        .unwrap();
        assert_eq!(opts.canvas.background_color(), Color::rgb(10, 20, 30));
        assert_eq!(opts.canvas.width, 800);
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(matches!(
            PickerOptions::from_toml_str("[canvas\nwidth = 3"),
            Err(PickError::OptionsParse(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("mirrorpick-options-{}", std::process::id()));
        let path = dir.join("picker.toml");
        let mut opts = PickerOptions::default();
        opts.canvas.width = 320;
        opts.picking.readback = ReadbackMode::FullBuffer;
        opts.save(&path).unwrap();
        assert_eq!(PickerOptions::load(&path).unwrap(), opts);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = Path::new("/nonexistent/mirrorpick/picker.toml");
        assert!(matches!(PickerOptions::load(path), Err(PickError::Io(_))));
    }
}
