//! The photobooth controller.
//!
//! [`Photobooth`] is the single owner of the frame being edited: it holds the
//! layout model, the camera capture, the export sink and the notifier. Every
//! rejected user action is reported to the notifier and returned as a
//! [`BoothError`].

#[cfg(test)]
mod tests;

use std::sync::Arc;
use thiserror::Error;

use crate::camera::{CameraBackend, CameraCapture, CameraError, StreamRequest};
use crate::compositor::{DirectorySink, ExportError, ExportResult, ExportSink, ExportSnapshot};
use crate::config::Config;
use crate::draw::{DecodedImage, FontDescriptor, image};
use crate::layout::{
    ItemId, LayoutError, LayoutModel, PangoTextMeasurer, Photo, Selection, StickerSource,
    TextMeasurer, TextStyle,
};
use crate::notification::{LogNotifier, Notice, Notifier};

/// Any rejected photobooth action.
#[derive(Debug, Error)]
pub enum BoothError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Collaborators of the controller. Each component can be mocked in tests.
#[derive(Clone)]
pub struct BoothDependencies {
    pub camera: Arc<dyn CameraBackend>,
    pub notifier: Arc<dyn Notifier>,
    pub sink: Arc<dyn ExportSink>,
    pub measurer: Arc<dyn TextMeasurer>,
}

impl BoothDependencies {
    /// Logs notices, measures with Pango and saves into `export.save_directory`.
    pub fn new(camera: Arc<dyn CameraBackend>, config: &Config) -> Self {
        Self {
            camera,
            notifier: Arc::new(LogNotifier),
            sink: Arc::new(DirectorySink::new(config.export.resolved_directory())),
            measurer: Arc::new(PangoTextMeasurer),
        }
    }
}

pub struct Photobooth {
    config: Config,
    model: LayoutModel,
    camera: CameraCapture,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn ExportSink>,
    text_style: TextStyle,
}

impl Photobooth {
    pub fn new(config: Config, dependencies: BoothDependencies) -> Self {
        let model = LayoutModel::with_measurer(&config, dependencies.measurer);
        let camera = CameraCapture::new(
            dependencies.camera,
            StreamRequest::from(&config.camera),
        );
        let text_style = default_text_style(&config);
        Self {
            config,
            model,
            camera,
            notifier: dependencies.notifier,
            sink: dependencies.sink,
            text_style,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &LayoutModel {
        &self.model
    }

    /// Direct access for property edits, moves and drags.
    pub fn model_mut(&mut self) -> &mut LayoutModel {
        &mut self.model
    }

    /// Current text panel values, applied to newly added text.
    pub fn text_style(&self) -> &TextStyle {
        &self.text_style
    }

    pub fn set_text_style(&mut self, style: TextStyle) {
        self.text_style = style;
    }

    // ------------------------------------------------------------------
    // Camera
    // ------------------------------------------------------------------

    pub async fn start_camera(&mut self) -> Result<(), BoothError> {
        let result = self.camera.start().await;
        self.check("Camera unavailable", result)
    }

    pub fn stop_camera(&mut self) {
        self.camera.stop();
    }

    pub async fn toggle_camera(&mut self) -> Result<bool, BoothError> {
        let result = self.camera.toggle().await;
        self.check("Camera unavailable", result)
    }

    pub fn is_camera_active(&self) -> bool {
        self.camera.is_active()
    }

    /// Takes a mirrored photo into the next free slot and returns its index.
    pub fn capture(&mut self) -> Result<usize, BoothError> {
        if !self.model.has_free_slot() {
            let limit = LayoutError::PhotoLimit {
                max: crate::layout::MAX_PHOTOS,
            };
            return self.check("Capture refused", Err(limit));
        }
        let photo = self.camera.snapshot();
        let photo = self.check("Capture failed", photo)?;
        let slot = self.model.push_photo(photo);
        self.check("Capture refused", slot)
    }

    /// Adds an existing image as if it had been captured.
    pub fn import_photo(&mut self, bytes: &[u8]) -> Result<usize, BoothError> {
        let photo = photo_from_bytes(bytes);
        let photo = match photo {
            Ok(photo) => photo,
            Err(e) => {
                let err = LayoutError::InvalidImage(e.to_string());
                return self.check("Photo rejected", Err(err));
            }
        };
        let slot = self.model.push_photo(photo);
        self.check("Photo rejected", slot)
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Adds text using the current text panel style.
    pub fn add_text(&mut self, content: &str) -> Result<ItemId, BoothError> {
        let style = TextStyle {
            content: content.to_string(),
            ..self.text_style.clone()
        };
        self.add_text_with_style(style)
    }

    pub fn add_text_with_style(&mut self, style: TextStyle) -> Result<ItemId, BoothError> {
        let result = self.model.add_text(style);
        self.check("Cannot add text", result)
    }

    pub fn add_sticker(&mut self, bytes: Vec<u8>, mime: &str) -> Result<ItemId, BoothError> {
        let result = self.model.add_sticker(StickerSource::new(bytes, mime));
        self.check("Cannot add sticker", result)
    }

    pub fn set_background_image(&mut self, bytes: Vec<u8>) -> Result<(), BoothError> {
        let result = self.model.set_background_image(bytes);
        self.check("Background image rejected", result)
    }

    /// Deletes the active element (or the background image).
    pub fn remove_selected(&mut self) -> Result<Selection, BoothError> {
        let result = self.model.remove_selected();
        self.check("Nothing to delete", result)
    }

    /// Clears the frame; the camera keeps running.
    pub fn reset(&mut self) {
        self.model.reset();
        log::info!("Frame reset");
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Composites the frame at the configured scale and saves it.
    pub async fn export(&self) -> Result<ExportResult, BoothError> {
        if self.model.photo_count() == 0 {
            return self.check("Nothing to download", Err(ExportError::NoPhotos));
        }

        let snapshot = ExportSnapshot::from_model(&self.model, self.config.frame.corner_radius);
        let result = crate::compositor::export_frame(
            snapshot,
            self.config.export.scale,
            &self.config.export.filename_prefix,
            Arc::clone(&self.sink),
        )
        .await;
        let result = self.check("Export failed", result)?;

        if result.report.is_complete() {
            self.notifier.notify(&Notice::info(
                "Frame saved",
                result.path.display().to_string(),
            ));
        } else {
            self.notifier.notify(&Notice::warning(
                "Frame saved with missing layers",
                format!(
                    "{} of {} layers could not be drawn; saved to {}",
                    result.report.failures.len(),
                    result.report.resolved,
                    result.path.display()
                ),
            ));
        }
        Ok(result)
    }

    /// Notifies the user about a failed action and converts the error.
    fn check<T, E>(&self, summary: &str, result: Result<T, E>) -> Result<T, BoothError>
    where
        E: Into<BoothError>,
    {
        result.map_err(|e| {
            let err = e.into();
            self.notifier.notify(&Notice::error(summary, err.to_string()));
            err
        })
    }
}

fn default_text_style(config: &Config) -> TextStyle {
    TextStyle {
        content: config.text.default_content.clone(),
        font: FontDescriptor::family(config.text.font_family.clone()),
        color: config.text.color.to_color_or(crate::draw::color::BLACK),
        size: config.text.font_size,
        rotation: config.text.rotation,
    }
}

fn photo_from_bytes(bytes: &[u8]) -> Result<Photo, image::ImageError> {
    let decoded = DecodedImage::decode(bytes)?;
    let (width, height) = (decoded.width(), decoded.height());
    let surface = decoded.into_surface()?;
    let png = image::encode_png(&surface)?;
    Ok(Photo {
        png: Arc::from(png),
        width,
        height,
    })
}
