//! Camera backend that serves a fixed image as every frame.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;

use super::backend::{CameraBackend, VideoStream};
use super::types::{CameraError, StreamRequest, VideoFrame};

/// Replays an image file (or in-memory image) in place of a webcam.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    source: Option<PathBuf>,
    bytes: Arc<[u8]>,
}

impl StillImageCamera {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            source: None,
            bytes: Arc::from(bytes),
        }
    }

    /// Reads the image file up front; decoding happens when the stream opens.
    pub fn from_path(path: &Path) -> Result<Self, CameraError> {
        let bytes = std::fs::read(path).map_err(|e| {
            CameraError::Unavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(Self {
            source: Some(path.to_path_buf()),
            bytes: Arc::from(bytes),
        })
    }
}

#[async_trait]
impl CameraBackend for StillImageCamera {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError> {
        log::debug!(
            "Opening still image stream (ideal {}x{}, {:?})",
            request.width,
            request.height,
            request.facing
        );
        let bytes = Arc::clone(&self.bytes);
        let frame = task::spawn_blocking(move || {
            image::load_from_memory(&bytes).map(|decoded| {
                let rgba = decoded.into_rgba8();
                VideoFrame {
                    width: rgba.width(),
                    height: rgba.height(),
                    rgba: rgba.into_raw(),
                }
            })
        })
        .await
        .map_err(|e| CameraError::Unavailable(format!("decode task failed: {e}")))?
        .map_err(|e| CameraError::Unavailable(format!("image is not decodable: {e}")))?;

        Ok(Box::new(StillStream {
            frame,
            running: true,
        }))
    }

    fn name(&self) -> String {
        match &self.source {
            Some(path) => format!("still image {}", path.display()),
            None => "still image".to_string(),
        }
    }
}

struct StillStream {
    frame: VideoFrame,
    running: bool,
}

impl VideoStream for StillStream {
    fn frame(&mut self) -> Result<VideoFrame, CameraError> {
        if !self.running {
            return Err(CameraError::Inactive);
        }
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        self.running = false;
    }
}
