use async_trait::async_trait;

use super::types::{CameraError, StreamRequest, VideoFrame};

/// Source of camera streams. Each component can be mocked in tests.
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Acquires a stream; permission prompts and device setup happen here.
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError>;

    /// Human-readable backend name for logs.
    fn name(&self) -> String;
}

/// An acquired stream, released by [`VideoStream::stop`].
pub trait VideoStream: Send + Sync {
    /// Latest frame of the stream.
    fn frame(&mut self) -> Result<VideoFrame, CameraError>;

    fn stop(&mut self);
}
