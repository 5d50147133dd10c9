//! Camera acquisition and photo capture.
//!
//! - [`CameraBackend`]: opens streams (still image, or nokhwa with the `webcam` feature)
//! - [`CameraCapture`]: owns the active stream and produces mirrored photos

pub mod types;

mod backend;
mod capture;
mod still;
#[cfg(test)]
mod tests;
#[cfg(feature = "webcam")]
mod webcam;

pub use backend::{CameraBackend, VideoStream};
pub use capture::{CameraCapture, mirror_frame};
pub use still::StillImageCamera;
pub use types::{CameraError, CameraInfo, StreamRequest, VideoFrame};
#[cfg(feature = "webcam")]
pub use webcam::{NokhwaCamera, list_cameras};

/// Lists native cameras. Always empty without the `webcam` feature.
#[cfg(not(feature = "webcam"))]
pub fn list_cameras() -> Vec<CameraInfo> {
    Vec::new()
}
