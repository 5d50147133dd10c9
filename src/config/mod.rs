//! Configuration file support for photobooth.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/photobooth/config.toml`. Settings include frame layout, text and
//! sticker defaults, export scale and destination, and the camera stream request.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

pub use enums::{CameraFacing, ColorSpec, Orientation};
pub use types::{
    CameraConfig, ExportConfig, FrameConfig, NotificationConfig, StickerConfig, TextConfig,
};

use crate::draw::color;
use crate::layout::{MAX_FONT_SIZE, MAX_STICKER_SIZE, MIN_FONT_SIZE, MIN_STICKER_SIZE};
use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [frame]
/// orientation = "vertical"
/// background_color = "#ffe4ec"
///
/// [text]
/// font_family = "Pacifico"
/// font_size = 32
///
/// [export]
/// scale = 2.0
/// save_directory = "~/Pictures/Photobooth"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Frame layout and appearance
    #[serde(default)]
    pub frame: FrameConfig,

    /// Defaults for new text labels
    #[serde(default)]
    pub text: TextConfig,

    /// Sticker limits and defaults
    #[serde(default)]
    pub sticker: StickerConfig,

    /// Export scale and destination
    #[serde(default)]
    pub export: ExportConfig,

    /// Camera stream request
    #[serde(default)]
    pub camera: CameraConfig,

    /// Notification delivery
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `text.font_size`: 10 - 72
    /// - `text.rotation`: 0 - 360
    /// - `sticker.default_size`: 10 - 200
    /// - `sticker.max_stickers`: 1 - 10
    /// - `export.scale`: 0.5 - 8.0
    /// - `frame.corner_radius`: 0 - 64
    /// - frame widths: 100 - 4000, padding/gap/footer: 0 - 200
    /// - `camera.width` x `camera.height`: 160 - 3840 x 120 - 2160
    pub fn validate_and_clamp(&mut self) {
        clamp_f64(
            "text.font_size",
            &mut self.text.font_size,
            MIN_FONT_SIZE,
            MAX_FONT_SIZE,
        );
        clamp_f64("text.rotation", &mut self.text.rotation, 0.0, 360.0);
        clamp_f64(
            "sticker.default_size",
            &mut self.sticker.default_size,
            MIN_STICKER_SIZE,
            MAX_STICKER_SIZE,
        );

        if !(1..=10).contains(&self.sticker.max_stickers) {
            log::warn!(
                "Invalid sticker.max_stickers {}, clamping to 1-10 range",
                self.sticker.max_stickers
            );
            self.sticker.max_stickers = self.sticker.max_stickers.clamp(1, 10);
        }

        clamp_f64("export.scale", &mut self.export.scale, 0.5, 8.0);
        clamp_f64("frame.corner_radius", &mut self.frame.corner_radius, 0.0, 64.0);
        clamp_f64(
            "frame.horizontal_width",
            &mut self.frame.horizontal_width,
            100.0,
            4000.0,
        );
        clamp_f64(
            "frame.vertical_width",
            &mut self.frame.vertical_width,
            100.0,
            4000.0,
        );
        clamp_f64(
            "frame.square_width",
            &mut self.frame.square_width,
            100.0,
            4000.0,
        );
        clamp_f64("frame.padding", &mut self.frame.padding, 0.0, 200.0);
        clamp_f64("frame.gap", &mut self.frame.gap, 0.0, 200.0);
        clamp_f64("frame.footer", &mut self.frame.footer, 0.0, 200.0);

        if !(160..=3840).contains(&self.camera.width) {
            log::warn!(
                "Invalid camera.width {}, clamping to 160-3840 range",
                self.camera.width
            );
            self.camera.width = self.camera.width.clamp(160, 3840);
        }
        if !(120..=2160).contains(&self.camera.height) {
            log::warn!(
                "Invalid camera.height {}, clamping to 120-2160 range",
                self.camera.height
            );
            self.camera.height = self.camera.height.clamp(120, 2160);
        }

        if self.frame.background_color.try_to_color().is_none() {
            log::warn!(
                "Invalid frame.background_color {:?}, falling back to white",
                self.frame.background_color
            );
            self.frame.background_color = ColorSpec::from(color::WHITE);
        }
        if self.text.color.try_to_color().is_none() {
            log::warn!(
                "Invalid text.color {:?}, falling back to black",
                self.text.color
            );
            self.text.color = ColorSpec::from(color::BLACK);
        }

        if self.export.filename_prefix.trim().is_empty()
            || self.export.filename_prefix.contains(['/', '\\'])
        {
            log::warn!(
                "Invalid export.filename_prefix '{}', falling back to 'photobooth'",
                self.export.filename_prefix
            );
            self.export.filename_prefix = "photobooth".to_string();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/photobooth/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("photobooth");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `config_path`, or returns defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Writes the documented example config to the user's config directory.
    ///
    /// # Errors
    /// Returns an error if a config file already exists at the target path
    /// or the file cannot be written.
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&config_path, EXAMPLE_CONFIG)?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

/// The documented example configuration shipped with the crate.
pub const EXAMPLE_CONFIG: &str = include_str!("../../config.example.toml");

fn clamp_f64(name: &str, value: &mut f64, min: f64, max: f64) {
    if !(min..=max).contains(value) {
        log::warn!("Invalid {name} {value:.1}, clamping to {min:.1}-{max:.1} range");
        *value = if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.export.scale, 2.0);
        assert_eq!(config.sticker.max_stickers, 10);
        assert_eq!(config.camera.width, 1280);
        assert_eq!(config.camera.height, 720);
        assert_eq!(config.frame.orientation, Orientation::Horizontal);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r##"
[text]
font_size = 500
color = "not-a-color"

[sticker]
max_stickers = 50
default_size = 1

[export]
scale = 0.0
filename_prefix = "../escape/"

[camera]
width = 99999
"##,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.text.font_size, MAX_FONT_SIZE);
        assert_eq!(config.text.color.try_to_color(), Some(color::BLACK));
        assert_eq!(config.sticker.max_stickers, 10);
        assert_eq!(config.sticker.default_size, MIN_STICKER_SIZE);
        assert_eq!(config.export.scale, 0.5);
        assert_eq!(config.export.filename_prefix, "photobooth");
        assert_eq!(config.camera.width, 3840);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[frame\norientation = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn example_config_parses_cleanly() {
        let mut config: Config = toml::from_str(EXAMPLE_CONFIG).unwrap();
        config.validate_and_clamp();
        assert_eq!(config.frame.corner_radius, 8.0);
        assert_eq!(config.text.font_family, "Sans");
    }

    #[test]
    fn schema_mentions_sections() {
        let schema = serde_json::to_string(&Config::json_schema()).unwrap();
        assert!(schema.contains("frame"));
        assert!(schema.contains("export"));
    }
}
