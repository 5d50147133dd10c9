use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use super::{BoothDependencies, BoothError, Photobooth};
use crate::camera::StillImageCamera;
use crate::compositor::{ExportError, ExportSink};
use crate::config::Config;
use crate::layout::{ApproximateTextMeasurer, LayoutError, Selection};
use crate::notification::{NoticeLevel, RecordingNotifier};

#[derive(Clone, Default)]
struct MockSink {
    calls: Arc<Mutex<usize>>,
}

impl ExportSink for MockSink {
    fn save(&self, _png: &[u8], filename: &str) -> Result<PathBuf, ExportError> {
        *self.calls.lock().unwrap() += 1;
        Ok(PathBuf::from("/tmp").join(filename))
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 90, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

struct Harness {
    booth: Photobooth,
    notifier: RecordingNotifier,
    sink: MockSink,
}

fn harness() -> Harness {
    let notifier = RecordingNotifier::new();
    let sink = MockSink::default();
    let dependencies = BoothDependencies {
        camera: Arc::new(StillImageCamera::new(png_bytes(16, 9))),
        notifier: Arc::new(notifier.clone()),
        sink: Arc::new(sink.clone()),
        measurer: Arc::new(ApproximateTextMeasurer),
    };
    Harness {
        booth: Photobooth::new(Config::default(), dependencies),
        notifier,
        sink,
    }
}

#[tokio::test]
async fn captures_fill_slots_until_the_limit() {
    let mut h = harness();
    h.booth.start_camera().await.unwrap();

    for expected in 0..4 {
        assert_eq!(h.booth.capture().unwrap(), expected);
        assert_eq!(
            h.booth.model().geometry().visible_slots().count(),
            expected + 1
        );
    }

    let err = h.booth.capture().unwrap_err();
    assert!(matches!(
        err,
        BoothError::Layout(LayoutError::PhotoLimit { max: 4 })
    ));
    assert_eq!(h.booth.model().photo_count(), 4);

    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].body, "Maximum of 4 photos reached.");
}

#[tokio::test]
async fn photo_limit_is_checked_before_camera_state() {
    let mut h = harness();
    for _ in 0..4 {
        h.booth.import_photo(&png_bytes(4, 3)).unwrap();
    }
    // Camera never started; the limit still wins
    assert!(matches!(
        h.booth.capture(),
        Err(BoothError::Layout(LayoutError::PhotoLimit { .. }))
    ));
}

#[test]
fn capture_without_camera_is_refused() {
    let mut h = harness();
    assert!(matches!(
        h.booth.capture(),
        Err(BoothError::Camera(crate::camera::CameraError::Inactive))
    ));
    assert_eq!(h.notifier.notices().len(), 1);
}

#[test]
fn elements_before_photos_are_rejected_and_notified() {
    let mut h = harness();
    assert!(h.booth.add_text("Hello").is_err());
    assert!(h.booth.add_sticker(png_bytes(5, 5), "image/png").is_err());
    assert!(h.booth.model().texts().is_empty());
    assert!(h.booth.model().stickers().is_empty());

    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
}

#[test]
fn sticker_rejections_are_notified() {
    let mut h = harness();
    h.booth.import_photo(&png_bytes(4, 3)).unwrap();
    for _ in 0..10 {
        h.booth.add_sticker(png_bytes(5, 5), "image/png").unwrap();
    }
    assert!(h.booth.add_sticker(png_bytes(5, 5), "image/png").is_err());
    assert!(h.booth.add_sticker(b"text".to_vec(), "text/plain").is_err());
    assert_eq!(h.booth.model().sticker_count(), 10);
    assert_eq!(h.notifier.notices().len(), 2);
}

#[test]
fn text_uses_the_panel_style() {
    let mut h = harness();
    h.booth.import_photo(&png_bytes(4, 3)).unwrap();
    let mut style = h.booth.text_style().clone();
    style.size = 40.0;
    style.rotation = 15.0;
    h.booth.set_text_style(style);

    let id = h.booth.add_text("Party").unwrap();
    let text = h.booth.model().text(id).unwrap();
    assert_eq!(text.content, "Party");
    assert_eq!(text.size, 40.0);
    assert_eq!(text.rotation, 15.0);
}

#[test]
fn delete_without_selection_is_notified() {
    let mut h = harness();
    assert!(h.booth.remove_selected().is_err());
    assert_eq!(h.notifier.notices().len(), 1);

    h.booth.import_photo(&png_bytes(4, 3)).unwrap();
    let id = h.booth.add_text("x").unwrap();
    assert_eq!(h.booth.remove_selected().unwrap(), Selection::Text(id));
}

#[tokio::test]
async fn export_without_photos_is_rejected_once() {
    let h = harness();
    let err = h.booth.export().await.unwrap_err();
    assert!(matches!(err, BoothError::Export(ExportError::NoPhotos)));
    assert_eq!(*h.sink.calls.lock().unwrap(), 0);
    assert_eq!(h.notifier.notices().len(), 1);
}

#[tokio::test]
async fn export_saves_and_reports() {
    let mut h = harness();
    h.booth.start_camera().await.unwrap();
    h.booth.capture().unwrap();
    h.booth.add_text("Hello").unwrap();
    h.booth.add_sticker(png_bytes(8, 8), "image/png").unwrap();

    let result = h.booth.export().await.unwrap();
    assert_eq!(result.report.resolved, 3);
    assert!(result.report.is_complete());
    assert!(result.filename.starts_with("photobooth-"));
    assert_eq!(*h.sink.calls.lock().unwrap(), 1);

    let notices = h.notifier.notices();
    assert_eq!(notices.last().unwrap().level, NoticeLevel::Info);
}

#[tokio::test]
async fn reset_keeps_camera_running() {
    let mut h = harness();
    h.booth.start_camera().await.unwrap();
    h.booth.capture().unwrap();
    h.booth.reset();
    assert_eq!(h.booth.model().photo_count(), 0);
    assert!(h.booth.is_camera_active());
    assert!(!h.booth.toggle_camera().await.unwrap());
}

#[test]
fn undecodable_imports_are_rejected() {
    let mut h = harness();
    assert!(matches!(
        h.booth.import_photo(b"junk"),
        Err(BoothError::Layout(LayoutError::InvalidImage(_)))
    ));
    assert_eq!(h.booth.model().photo_count(), 0);
}
