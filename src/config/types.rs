//! Configuration type definitions.

use super::enums::{CameraFacing, ColorSpec, Orientation};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Frame layout and appearance settings.
///
/// Widths are in preview pixels; heights follow from the slot grid and the
/// number of captured photos.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FrameConfig {
    /// Orientation used when the editor starts (horizontal, vertical, square)
    #[serde(default)]
    pub orientation: Orientation,

    /// Round and clip photo slots (the "borders" toggle)
    #[serde(default = "default_show_borders")]
    pub show_borders: bool,

    /// Corner radius of the frame and of bordered slots, in preview pixels
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f64,

    /// Background color used when no background image is set
    #[serde(default = "default_background_color")]
    pub background_color: ColorSpec,

    /// Frame width for the horizontal layout
    #[serde(default = "default_horizontal_width")]
    pub horizontal_width: f64,

    /// Frame width for the vertical strip layout
    #[serde(default = "default_vertical_width")]
    pub vertical_width: f64,

    /// Frame width for the square grid layout
    #[serde(default = "default_square_width")]
    pub square_width: f64,

    /// Inner padding between the frame edge and the slots
    #[serde(default = "default_padding")]
    pub padding: f64,

    /// Gap between adjacent slots
    #[serde(default = "default_gap")]
    pub gap: f64,

    /// Space reserved below the slots for captions
    #[serde(default = "default_footer")]
    pub footer: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            show_borders: default_show_borders(),
            corner_radius: default_corner_radius(),
            background_color: default_background_color(),
            horizontal_width: default_horizontal_width(),
            vertical_width: default_vertical_width(),
            square_width: default_square_width(),
            padding: default_padding(),
            gap: default_gap(),
            footer: default_footer(),
        }
    }
}

/// Defaults for newly added text labels (the text property panel).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TextConfig {
    /// Initial text content
    #[serde(default)]
    pub default_content: String,

    /// Font family name, e.g. "Sans", "Pacifico"
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Text color
    #[serde(default = "default_text_color")]
    pub color: ColorSpec,

    /// Font size in pixels (valid range: 10 - 72)
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Rotation in degrees (valid range: 0 - 360)
    #[serde(default)]
    pub rotation: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            default_content: String::new(),
            font_family: default_font_family(),
            color: default_text_color(),
            font_size: default_font_size(),
            rotation: 0.0,
        }
    }
}

/// Sticker limits and defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StickerConfig {
    /// Maximum number of stickers on one frame (valid range: 1 - 10)
    #[serde(default = "default_max_stickers")]
    pub max_stickers: usize,

    /// Width of a newly added sticker in pixels (valid range: 10 - 200)
    #[serde(default = "default_sticker_size")]
    pub default_size: f64,
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            max_stickers: default_max_stickers(),
            default_size: default_sticker_size(),
        }
    }
}

/// Export output settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportConfig {
    /// Output upscale factor relative to the preview (valid range: 0.5 - 8.0)
    #[serde(default = "default_export_scale")]
    pub scale: f64,

    /// Directory exported PNGs are written to (supports `~/`)
    #[serde(default = "default_save_directory")]
    pub save_directory: String,

    /// File name prefix; files are named `<prefix>-<unix-epoch-ms>.png`
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: default_export_scale(),
            save_directory: default_save_directory(),
            filename_prefix: default_filename_prefix(),
        }
    }
}

/// Camera stream request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CameraConfig {
    /// Ideal frame width
    #[serde(default = "default_camera_width")]
    pub width: u32,

    /// Ideal frame height
    #[serde(default = "default_camera_height")]
    pub height: u32,

    /// Preferred camera (user-facing or environment-facing)
    #[serde(default)]
    pub facing: CameraFacing,

    /// Native camera index used by the webcam backend
    #[serde(default)]
    pub device_index: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: default_camera_width(),
            height: default_camera_height(),
            facing: CameraFacing::default(),
            device_index: 0,
        }
    }
}

/// User-facing notification settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotificationConfig {
    /// Also send freedesktop desktop notifications
    #[serde(default)]
    pub desktop: bool,
}

impl ExportConfig {
    /// Save directory with `~/` expanded.
    pub fn resolved_directory(&self) -> PathBuf {
        crate::compositor::file::expand_tilde(&self.save_directory)
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_show_borders() -> bool {
    true
}

fn default_corner_radius() -> f64 {
    8.0
}

fn default_background_color() -> ColorSpec {
    ColorSpec::Name("#ffffff".to_string())
}

fn default_horizontal_width() -> f64 {
    800.0
}

fn default_vertical_width() -> f64 {
    320.0
}

fn default_square_width() -> f64 {
    600.0
}

fn default_padding() -> f64 {
    16.0
}

fn default_gap() -> f64 {
    10.0
}

fn default_footer() -> f64 {
    60.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_text_color() -> ColorSpec {
    ColorSpec::Name("#000000".to_string())
}

fn default_font_size() -> f64 {
    24.0
}

fn default_max_stickers() -> usize {
    10
}

fn default_sticker_size() -> f64 {
    100.0
}

fn default_export_scale() -> f64 {
    2.0
}

fn default_save_directory() -> String {
    "~/Pictures/Photobooth".to_string()
}

fn default_filename_prefix() -> String {
    "photobooth".to_string()
}

fn default_camera_width() -> u32 {
    1280
}

fn default_camera_height() -> u32 {
    720
}
