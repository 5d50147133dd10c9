//! Scene files: a TOML description of a frame to build and export.
//!
//! # Example
//! ```toml
//! orientation = "vertical"
//!
//! [background]
//! color = "#ffe4ec"
//! image = "hearts.png"
//! repeat = true
//!
//! [[photos]]
//! path = "shots/1.jpg"
//!
//! [[texts]]
//! content = "Happy birthday!"
//! font = "Pacifico"
//! size = 32
//! x = 20
//! y = 250
//!
//! [[stickers]]
//! path = "stickers/crown.png"
//! size = 80
//! rotation = -15
//! ```
//!
//! Relative paths resolve against the scene file's directory. Everything is
//! applied through [`Photobooth`], so the usual limits and clamps hold.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::booth::Photobooth;
use crate::config::{ColorSpec, Orientation};
use crate::draw::color;
use crate::util::{self, Point};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    pub orientation: Option<Orientation>,
    pub show_borders: Option<bool>,
    #[serde(default)]
    pub background: SceneBackground,
    #[serde(default)]
    pub photos: Vec<ScenePhoto>,
    #[serde(default)]
    pub texts: Vec<SceneText>,
    #[serde(default)]
    pub stickers: Vec<SceneSticker>,

    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneBackground {
    pub color: Option<ColorSpec>,
    pub image: Option<PathBuf>,
    pub repeat: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenePhoto {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneText {
    pub content: String,
    pub font: Option<String>,
    pub color: Option<ColorSpec>,
    pub size: Option<f64>,
    pub rotation: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneSticker {
    pub path: PathBuf,
    pub size: Option<f64>,
    pub rotation: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Counts of scene entries that were applied or rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneOutcome {
    pub applied: usize,
    pub rejected: usize,
}

impl SceneOutcome {
    fn record<T, E>(&mut self, result: std::result::Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => {
                self.applied += 1;
                Some(value)
            }
            Err(_) => {
                self.rejected += 1;
                None
            }
        }
    }

    fn merge(&mut self, other: SceneOutcome) {
        self.applied += other.applied;
        self.rejected += other.rejected;
    }
}

impl Scene {
    /// Reads and parses a scene file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene {}", path.display()))?;
        let mut scene = Self::parse(&text)
            .with_context(|| format!("Failed to parse scene {}", path.display()))?;
        scene.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        log::info!(
            "Loaded scene {} ({} photos, {} texts, {} stickers)",
            path.display(),
            scene.photos.len(),
            scene.texts.len(),
            scene.stickers.len()
        );
        Ok(scene)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Directory that relative paths resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let resolved = self.resolve(path);
        fs::read(&resolved).with_context(|| format!("Failed to read {}", resolved.display()))
    }

    /// Applies the whole scene: frame settings, photos, then overlays.
    pub fn apply(&self, booth: &mut Photobooth) -> Result<SceneOutcome> {
        self.apply_frame(booth);
        let mut outcome = self.apply_photos(booth)?;
        outcome.merge(self.apply_overlays(booth)?);
        Ok(outcome)
    }

    /// Orientation, borders and background color.
    pub fn apply_frame(&self, booth: &mut Photobooth) {
        let model = booth.model_mut();
        if let Some(orientation) = self.orientation {
            model.set_orientation(orientation);
        }
        if let Some(show) = self.show_borders {
            model.set_show_borders(show);
        }
        if let Some(spec) = &self.background.color {
            model.set_background_color(spec.to_color_or(color::WHITE));
        }
        if let Some(repeat) = self.background.repeat {
            model.set_repeat_background(repeat);
        }
    }

    /// Imports the listed photos as if they had been captured.
    pub fn apply_photos(&self, booth: &mut Photobooth) -> Result<SceneOutcome> {
        let mut outcome = SceneOutcome::default();
        for photo in &self.photos {
            let bytes = self.read(&photo.path)?;
            outcome.record(booth.import_photo(&bytes));
        }
        Ok(outcome)
    }

    /// Background image, text and stickers. Needs the photos in place.
    pub fn apply_overlays(&self, booth: &mut Photobooth) -> Result<SceneOutcome> {
        let mut outcome = SceneOutcome::default();

        if let Some(path) = &self.background.image {
            let bytes = self.read(path)?;
            outcome.record(booth.set_background_image(bytes));
        }

        for text in &self.texts {
            let mut style = booth.text_style().clone();
            style.content = text.content.clone();
            if let Some(font) = &text.font {
                style.font.family = font.clone();
            }
            if let Some(spec) = &text.color {
                style.color = spec.to_color_or(style.color);
            }
            if let Some(size) = text.size {
                style.size = size;
            }
            if let Some(rotation) = text.rotation {
                style.rotation = rotation;
            }

            if let Some(id) = outcome.record(booth.add_text_with_style(style)) {
                let model = booth.model_mut();
                if let Some(current) = model.text(id).map(|t| t.position) {
                    let target = Point::new(text.x.unwrap_or(current.x), text.y.unwrap_or(current.y));
                    model.move_to(id, target)?;
                }
            }
        }

        for sticker in &self.stickers {
            let bytes = self.read(&sticker.path)?;
            let mime = util::mime_from_path(&sticker.path);
            let Some(id) = outcome.record(booth.add_sticker(bytes, mime)) else {
                continue;
            };
            let model = booth.model_mut();
            if let Some(size) = sticker.size {
                model.set_sticker_size(id, size)?;
            }
            if let Some(rotation) = sticker.rotation {
                model.set_sticker_rotation(id, rotation)?;
            }
            if let Some(current) = model.sticker(id).map(|s| s.position) {
                let target = Point::new(
                    sticker.x.unwrap_or(current.x),
                    sticker.y.unwrap_or(current.y),
                );
                model.move_to(id, target)?;
            }
        }

        log_summary(booth, &outcome);
        Ok(outcome)
    }
}

fn log_summary(booth: &Photobooth, outcome: &SceneOutcome) {
    let model = booth.model();
    log::debug!(
        "Scene applied: {} entries, {} rejected; frame {}x{} with {} texts and {} stickers",
        outcome.applied,
        outcome.rejected,
        model.frame_size().width,
        model.frame_size().height,
        model.texts().len(),
        model.stickers().len()
    );
}
