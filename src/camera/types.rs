//! Data types for camera capture.

use crate::config::{CameraConfig, CameraFacing};
use crate::draw::ImageError;
use thiserror::Error;

/// Frame size assumed when a stream reports zero dimensions.
pub const FALLBACK_WIDTH: u32 = 1280;
pub const FALLBACK_HEIGHT: u32 = 720;

/// Ideal stream parameters handed to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub width: u32,
    pub height: u32,
    pub facing: CameraFacing,
    pub audio: bool,
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            width: FALLBACK_WIDTH,
            height: FALLBACK_HEIGHT,
            facing: CameraFacing::User,
            audio: false,
        }
    }
}

impl From<&CameraConfig> for StreamRequest {
    fn from(config: &CameraConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            facing: config.facing,
            audio: false,
        }
    }
}

/// One straight-alpha RGBA8 video frame.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// A camera the backend can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    pub index: u32,
    pub name: String,
}

/// Errors that can occur while acquiring or reading a camera.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Camera access was denied: {0}")]
    PermissionDenied(String),

    #[error("Camera is unavailable: {0}")]
    Unavailable(String),

    #[error("The camera is not running. Start the camera first.")]
    Inactive,

    #[error("Failed to read a frame: {0}")]
    Frame(String),

    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    #[error("Drawing failed: {0}")]
    Surface(#[from] cairo::Error),
}
