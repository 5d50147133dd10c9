use std::sync::Arc;

use super::backend::{CameraBackend, VideoStream};
use super::types::{CameraError, FALLBACK_HEIGHT, FALLBACK_WIDTH, StreamRequest, VideoFrame};
use crate::draw::{DecodedImage, image, render};
use crate::layout::Photo;
use crate::util::Rect;

/// Owns at most one camera stream and turns frames into photos.
///
/// The stream is released before a new one is acquired, on [`stop`], and
/// when the capture is dropped.
///
/// [`stop`]: CameraCapture::stop
pub struct CameraCapture {
    backend: Arc<dyn CameraBackend>,
    request: StreamRequest,
    stream: Option<Box<dyn VideoStream>>,
}

impl CameraCapture {
    pub fn new(backend: Arc<dyn CameraBackend>, request: StreamRequest) -> Self {
        Self {
            backend,
            request,
            stream: None,
        }
    }

    pub fn request(&self) -> &StreamRequest {
        &self.request
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Acquires a stream, releasing the current one first.
    pub async fn start(&mut self) -> Result<(), CameraError> {
        self.stop();
        let stream = self.backend.open(&self.request).await?;
        log::info!(
            "Camera started: {} ({}x{} requested)",
            self.backend.name(),
            self.request.width,
            self.request.height
        );
        self.stream = Some(stream);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            log::info!("Camera stopped: {}", self.backend.name());
        }
    }

    /// Stops an active stream or starts a new one. Returns whether the
    /// camera is now active.
    pub async fn toggle(&mut self) -> Result<bool, CameraError> {
        if self.is_active() {
            self.stop();
            Ok(false)
        } else {
            self.start().await?;
            Ok(true)
        }
    }

    /// Grabs the current frame as a mirrored PNG photo.
    pub fn snapshot(&mut self) -> Result<Photo, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::Inactive)?;
        let frame = stream.frame()?;
        mirror_frame(&frame)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Draws `frame` flipped horizontally and encodes it as PNG.
///
/// Frames that report zero dimensions yield a blank 1280x720 photo.
pub fn mirror_frame(frame: &VideoFrame) -> Result<Photo, CameraError> {
    let has_pixels = frame.width > 0 && frame.height > 0;
    let (width, height) = if has_pixels {
        (frame.width, frame.height)
    } else {
        (FALLBACK_WIDTH, FALLBACK_HEIGHT)
    };

    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)?;
    {
        let ctx = cairo::Context::new(&surface)?;
        ctx.translate(width as f64, 0.0);
        ctx.scale(-1.0, 1.0);
        if has_pixels {
            let source = DecodedImage::from_rgba(frame.width, frame.height, &frame.rgba)?
                .into_surface()?;
            render::draw_image_in_rect(
                &ctx,
                &source,
                Rect::new(0.0, 0.0, width as f64, height as f64),
            )?;
        }
        ctx.identity_matrix();
    }

    let png = image::encode_png(&surface)?;
    log::debug!("Captured {width}x{height} photo ({} bytes)", png.len());
    Ok(Photo {
        png: Arc::from(png),
        width,
        height,
    })
}
