//! Native webcam backend built on nokhwa.
//!
//! nokhwa cameras are not `Send`, so each stream owns a capture thread that
//! opens the device and publishes the latest decoded frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use async_trait::async_trait;
use nokhwa::Camera;
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use tokio::sync::oneshot;

use super::backend::{CameraBackend, VideoStream};
use super::types::{CameraError, CameraInfo, StreamRequest, VideoFrame};

/// Lists native cameras; failures are logged and yield an empty list.
pub fn list_cameras() -> Vec<CameraInfo> {
    match nokhwa::query(ApiBackend::Auto) {
        Ok(cameras) => cameras
            .iter()
            .enumerate()
            .map(|(index, info)| CameraInfo {
                index: index as u32,
                name: info.human_name(),
            })
            .collect(),
        Err(e) => {
            log::warn!("Failed to enumerate cameras: {e}");
            Vec::new()
        }
    }
}

/// Webcam selected by native device index.
#[derive(Debug, Clone, Copy)]
pub struct NokhwaCamera {
    index: u32,
}

impl NokhwaCamera {
    pub fn new(index: u32) -> Self {
        Self { index }
    }
}

#[async_trait]
impl CameraBackend for NokhwaCamera {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError> {
        let latest = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = oneshot::channel();

        let index = self.index;
        let request = *request;
        let thread_latest = Arc::clone(&latest);
        let thread_running = Arc::clone(&running);
        let handle = std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || capture_thread(index, request, thread_latest, thread_running, ready_tx))
            .map_err(|e| CameraError::Unavailable(format!("cannot spawn capture thread: {e}")))?;

        match ready_rx.await {
            Ok(Ok(())) => Ok(Box::new(NokhwaStream {
                latest,
                running,
                handle: Some(handle),
            })),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(CameraError::Unavailable(
                    "capture thread exited during setup".to_string(),
                ))
            }
        }
    }

    fn name(&self) -> String {
        format!("webcam {}", self.index)
    }
}

fn open_camera(index: u32, request: &StreamRequest) -> Result<Camera, CameraError> {
    let ideal = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::Closest(
        CameraFormat::new(
            Resolution::new(request.width, request.height),
            FrameFormat::MJPEG,
            30,
        ),
    ));
    let mut camera = match Camera::new(CameraIndex::Index(index), ideal) {
        Ok(camera) => camera,
        Err(e) => {
            log::warn!("Camera {index} rejected {}x{}: {e}", request.width, request.height);
            let any = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::None);
            Camera::new(CameraIndex::Index(index), any)
                .map_err(|e| CameraError::Unavailable(e.to_string()))?
        }
    };
    camera
        .open_stream()
        .map_err(|e| CameraError::PermissionDenied(e.to_string()))?;
    Ok(camera)
}

fn capture_thread(
    index: u32,
    request: StreamRequest,
    latest: Arc<Mutex<Option<VideoFrame>>>,
    running: Arc<AtomicBool>,
    ready: oneshot::Sender<Result<(), CameraError>>,
) {
    let mut camera = match open_camera(index, &request) {
        Ok(camera) => camera,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    log::info!(
        "Camera opened: {} ({}x{})",
        camera.info().human_name(),
        camera.resolution().width(),
        camera.resolution().height()
    );
    if ready.send(Ok(())).is_err() {
        running.store(false, Ordering::Release);
    }

    while running.load(Ordering::Acquire) {
        match camera.frame() {
            Ok(buffer) => match buffer.decode_image::<RgbAFormat>() {
                Ok(image) => {
                    let frame = VideoFrame {
                        width: buffer.resolution().width(),
                        height: buffer.resolution().height(),
                        rgba: image.into_raw(),
                    };
                    *lock(&latest) = Some(frame);
                }
                Err(e) => log::warn!("Failed to decode frame: {e}"),
            },
            Err(e) => {
                log::warn!("Failed to capture frame: {e}");
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    if let Err(e) = camera.stop_stream() {
        log::warn!("Failed to stop camera stream: {e}");
    }
    log::info!("Camera capture thread stopped");
}

fn lock(frame: &Mutex<Option<VideoFrame>>) -> MutexGuard<'_, Option<VideoFrame>> {
    frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct NokhwaStream {
    latest: Arc<Mutex<Option<VideoFrame>>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl VideoStream for NokhwaStream {
    fn frame(&mut self) -> Result<VideoFrame, CameraError> {
        if !self.running.load(Ordering::Acquire) {
            return Err(CameraError::Inactive);
        }
        // The first frame may still be in flight right after opening
        Ok(lock(&self.latest).clone().unwrap_or(VideoFrame {
            width: 0,
            height: 0,
            rgba: Vec::new(),
        }))
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop();
    }
}
