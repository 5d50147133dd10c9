use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
    backend::{CameraBackend, VideoStream},
    capture::{CameraCapture, mirror_frame},
    still::StillImageCamera,
    types::{CameraError, StreamRequest, VideoFrame},
};
use crate::config::CameraFacing;

#[derive(Clone, Default)]
struct MockBackend {
    deny: bool,
    events: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<StreamRequest>>>,
}

struct MockStream {
    id: usize,
    events: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl CameraBackend for MockBackend {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError> {
        self.requests.lock().unwrap().push(*request);
        if self.deny {
            return Err(CameraError::PermissionDenied("denied by user".to_string()));
        }
        let mut events = self.events.lock().unwrap();
        let id = events.iter().filter(|e| e.starts_with("open")).count();
        events.push(format!("open {id}"));
        Ok(Box::new(MockStream {
            id,
            events: Arc::clone(&self.events),
        }))
    }

    fn name(&self) -> String {
        "mock".to_string()
    }
}

impl VideoStream for MockStream {
    fn frame(&mut self) -> Result<VideoFrame, CameraError> {
        Ok(VideoFrame {
            width: 0,
            height: 0,
            rgba: Vec::new(),
        })
    }

    fn stop(&mut self) {
        self.events.lock().unwrap().push(format!("stop {}", self.id));
    }
}

/// 4x2 image: left half red, right half blue.
fn split_frame() -> VideoFrame {
    let mut rgba = Vec::new();
    for _row in 0..2 {
        for col in 0..4 {
            if col < 2 {
                rgba.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                rgba.extend_from_slice(&[0, 0, 255, 255]);
            }
        }
    }
    VideoFrame {
        width: 4,
        height: 2,
        rgba,
    }
}

fn png_of(frame: &VideoFrame) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone()).unwrap();
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn default_request_is_hd_user_facing_without_audio() {
    let request = StreamRequest::default();
    assert_eq!((request.width, request.height), (1280, 720));
    assert_eq!(request.facing, CameraFacing::User);
    assert!(!request.audio);
}

#[test]
fn snapshot_is_mirrored() {
    let photo = mirror_frame(&split_frame()).unwrap();
    assert_eq!((photo.width, photo.height), (4, 2));

    let decoded = image::load_from_memory(&photo.png).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 255, 255]);
    assert_eq!(decoded.get_pixel(3, 1).0, [255, 0, 0, 255]);
}

#[test]
fn zero_sized_frames_fall_back_to_hd() {
    let photo = mirror_frame(&VideoFrame {
        width: 0,
        height: 0,
        rgba: Vec::new(),
    })
    .unwrap();
    assert_eq!((photo.width, photo.height), (1280, 720));
}

#[tokio::test]
async fn snapshot_requires_an_active_stream() {
    let mut capture = CameraCapture::new(
        Arc::new(StillImageCamera::new(png_of(&split_frame()))),
        StreamRequest::default(),
    );
    assert!(matches!(capture.snapshot(), Err(CameraError::Inactive)));

    capture.start().await.unwrap();
    let photo = capture.snapshot().unwrap();
    assert_eq!((photo.width, photo.height), (4, 2));

    capture.stop();
    assert!(!capture.is_active());
    assert!(matches!(capture.snapshot(), Err(CameraError::Inactive)));
}

#[tokio::test]
async fn restarting_releases_the_previous_stream() {
    let backend = MockBackend::default();
    let events = Arc::clone(&backend.events);
    let mut capture = CameraCapture::new(Arc::new(backend), StreamRequest::default());

    capture.start().await.unwrap();
    capture.start().await.unwrap();
    assert_eq!(
        *events.lock().unwrap(),
        vec!["open 0", "stop 0", "open 1"]
    );

    drop(capture);
    assert_eq!(events.lock().unwrap().last().unwrap(), "stop 1");
}

#[tokio::test]
async fn toggle_alternates_stream_state() {
    let backend = MockBackend::default();
    let events = Arc::clone(&backend.events);
    let mut capture = CameraCapture::new(Arc::new(backend), StreamRequest::default());

    assert!(capture.toggle().await.unwrap());
    assert!(capture.is_active());
    assert!(!capture.toggle().await.unwrap());
    assert!(!capture.is_active());
    assert_eq!(*events.lock().unwrap(), vec!["open 0", "stop 0"]);
}

#[tokio::test]
async fn denied_access_leaves_capture_inactive() {
    let backend = MockBackend {
        deny: true,
        ..MockBackend::default()
    };
    let requests = Arc::clone(&backend.requests);
    let mut capture = CameraCapture::new(Arc::new(backend), StreamRequest::default());

    let err = capture.start().await.unwrap_err();
    assert!(matches!(err, CameraError::PermissionDenied(_)));
    assert!(!capture.is_active());
    assert_eq!(requests.lock().unwrap()[0], StreamRequest::default());
}

#[tokio::test]
async fn undecodable_still_image_is_unavailable() {
    let camera = StillImageCamera::new(b"not an image".to_vec());
    let err = camera.open(&StreamRequest::default()).await.err().unwrap();
    assert!(matches!(err, CameraError::Unavailable(_)));
}
