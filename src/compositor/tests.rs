use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use super::{
    dependencies::ExportSink,
    pipeline::{composite, export_frame},
    snapshot::ExportSnapshot,
    types::{ExportError, LayerKind},
};
use crate::config::Config;
use crate::draw::{FontDescriptor, color};
use crate::layout::{ApproximateTextMeasurer, LayoutModel, Photo, StickerSource, TextStyle};

#[derive(Clone, Default)]
struct MockSink {
    should_fail: bool,
    saved: Arc<Mutex<Vec<(String, usize)>>>,
}

impl ExportSink for MockSink {
    fn save(&self, png: &[u8], filename: &str) -> Result<PathBuf, ExportError> {
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), png.len()));
        if self.should_fail {
            Err(ExportError::Save(std::io::Error::other("disk full")))
        } else {
            Ok(PathBuf::from("/tmp").join(filename))
        }
    }
}

fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Left half red, right half blue.
fn split_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 255, 255])
        }
    });
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn photo(rgba: [u8; 4]) -> Photo {
    Photo {
        png: Arc::from(solid_png(8, 6, rgba)),
        width: 8,
        height: 6,
    }
}

fn model() -> LayoutModel {
    LayoutModel::with_measurer(&Config::default(), Arc::new(ApproximateTextMeasurer))
}

fn text_style(content: &str) -> TextStyle {
    TextStyle {
        content: content.to_string(),
        font: FontDescriptor::default(),
        color: color::BLACK,
        size: 24.0,
        rotation: 0.0,
    }
}

fn pixel(png: &[u8], x: u32, y: u32) -> [u8; 4] {
    let decoded = image::load_from_memory(png).unwrap().to_rgba8();
    decoded.get_pixel(x, y).0
}

#[tokio::test]
async fn empty_frame_is_rejected_before_drawing() {
    let sink = MockSink::default();
    let saved = Arc::clone(&sink.saved);
    let snapshot = ExportSnapshot::from_model(&model(), 8.0);

    let err = export_frame(snapshot, 2.0, "photobooth", Arc::new(sink))
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::NoPhotos));
    assert!(saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn output_is_scaled_and_layered() {
    let mut model = model();
    model.set_show_borders(false);
    model.set_background_color(color::BLUE);
    model.push_photo(photo([255, 0, 0, 255])).unwrap();

    let snapshot = ExportSnapshot::from_model(&model, 8.0);
    let size = model.frame_size();
    let frame = composite(&snapshot, 2.0).await.unwrap();

    assert_eq!(frame.report.width, (size.width * 2.0).ceil() as i32);
    assert_eq!(frame.report.height, (size.height * 2.0).ceil() as i32);
    assert_eq!(frame.report.resolved, 1);
    assert_eq!(frame.report.drawn, 1);

    // Rounded outer clip leaves the corner transparent
    assert_eq!(pixel(&frame.png, 0, 0)[3], 0);
    // Padding shows the background
    assert_eq!(pixel(&frame.png, 16, 300), [0, 0, 255, 255]);
    // Slot 0 spans the inner width in the single-photo layout
    let slot = model.geometry().slots[0];
    let center = slot.center();
    assert_eq!(
        pixel(&frame.png, (center.x * 2.0) as u32, (center.y * 2.0) as u32),
        [255, 0, 0, 255]
    );
}

#[tokio::test]
async fn stickers_draw_above_photos() {
    let mut model = model();
    model.set_show_borders(false);
    model.push_photo(photo([255, 0, 0, 255])).unwrap();
    let id = model
        .add_sticker(StickerSource::new(
            solid_png(10, 10, [0, 255, 0, 255]),
            "image/png",
        ))
        .unwrap();
    model.set_sticker_rotation(id, 45.0).unwrap();

    let sticker = model.sticker(id).unwrap().clone();
    let snapshot = ExportSnapshot::from_model(&model, 8.0);
    let frame = composite(&snapshot, 2.0).await.unwrap();

    let cx = (sticker.position.x + sticker.width / 2.0) * 2.0;
    let cy = (sticker.position.y + sticker.height() / 2.0) * 2.0;
    assert_eq!(pixel(&frame.png, cx as u32, cy as u32), [0, 255, 0, 255]);
    assert_eq!(frame.report.resolved, 2);
}

#[tokio::test]
async fn corrupt_layers_are_counted_and_omitted() {
    let mut model = model();
    model.push_photo(photo([255, 0, 0, 255])).unwrap();
    model.push_photo(photo([0, 0, 255, 255])).unwrap();
    model
        .add_sticker(StickerSource::new(
            solid_png(4, 4, [0, 255, 0, 255]),
            "image/png",
        ))
        .unwrap();
    model.add_text(text_style("Hello")).unwrap();

    let mut snapshot = ExportSnapshot::from_model(&model, 8.0);
    snapshot.photos[1].png = Arc::from(b"not a png".to_vec());
    snapshot.stickers[0].bytes = Arc::from(b"garbage".to_vec());
    let sticker_id = snapshot.stickers[0].id;

    let sink = MockSink::default();
    let saved = Arc::clone(&sink.saved);
    let result = export_frame(snapshot, 1.0, "photobooth", Arc::new(sink))
        .await
        .unwrap();

    assert_eq!(result.report.resolved, 4);
    assert_eq!(result.report.drawn, 2);
    let failed: Vec<LayerKind> = result.report.failures.iter().map(|f| f.layer).collect();
    assert_eq!(
        failed,
        vec![LayerKind::Photo(1), LayerKind::Sticker(sticker_id)]
    );

    let saved = saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].0.starts_with("photobooth-"));
    assert!(saved[0].0.ends_with(".png"));
    assert_eq!(result.filename, saved[0].0);
}

#[tokio::test]
async fn snapshot_is_isolated_from_later_edits() {
    let mut model = model();
    model.push_photo(photo([255, 0, 0, 255])).unwrap();
    model.add_text(text_style("kept")).unwrap();
    let snapshot = ExportSnapshot::from_model(&model, 8.0);

    model.reset();

    let frame = composite(&snapshot, 1.0).await.unwrap();
    assert_eq!(snapshot.layer_count(), 2);
    assert_eq!(frame.report.resolved, 2);
}

#[tokio::test]
async fn undecodable_background_falls_back_to_color() {
    let mut model = model();
    model.push_photo(photo([255, 0, 0, 255])).unwrap();
    model.set_background_color(color::YELLOW);
    model.set_background_image(solid_png(4, 4, [0, 0, 0, 255])).unwrap();

    let mut snapshot = ExportSnapshot::from_model(&model, 0.0);
    if let Some(image) = snapshot.background.image.as_mut() {
        image.bytes = Arc::from(b"broken".to_vec());
    }
    let frame = composite(&snapshot, 1.0).await.unwrap();
    assert_eq!(pixel(&frame.png, 2, 2), [255, 255, 0, 255]);
    // The background is not a counted layer
    assert_eq!(frame.report.resolved, 1);
}

#[tokio::test]
async fn tiled_background_is_scaled_with_the_frame() {
    let mut model = model();
    model.push_photo(photo([0, 255, 0, 255])).unwrap();
    model.set_background_color(color::YELLOW);
    model.set_background_image(split_png(8, 4)).unwrap();
    let tile = model.background().image.as_ref().unwrap().tile;
    assert_eq!((tile.width, tile.height), (8.0, 4.0));

    let snapshot = ExportSnapshot::from_model(&model, 8.0);
    let frame = composite(&snapshot, 2.0).await.unwrap();

    // 16px tiles at scale 2: red for the first 8 px, blue for the next 8
    let y = 20;
    for (x, expected) in [
        (4, [255, 0, 0, 255]),
        (12, [0, 0, 255, 255]),
        (20, [255, 0, 0, 255]),
        (28, [0, 0, 255, 255]),
    ] {
        assert_eq!(pixel(&frame.png, x, y), expected, "pixel at x={x}");
    }
    assert_eq!(frame.report.resolved, 1);
}

#[tokio::test]
async fn background_without_repeat_is_stretched() {
    let mut model = model();
    model.push_photo(photo([0, 255, 0, 255])).unwrap();
    model.set_background_color(color::YELLOW);
    model.set_background_image(split_png(2, 1)).unwrap();
    model.set_repeat_background(false);

    let snapshot = ExportSnapshot::from_model(&model, 8.0);
    let frame = composite(&snapshot, 2.0).await.unwrap();
    let width = frame.report.width as u32;

    assert_eq!(pixel(&frame.png, width / 4, 20), [255, 0, 0, 255]);
    assert_eq!(pixel(&frame.png, width * 3 / 4, 20), [0, 0, 255, 255]);
}

#[tokio::test]
async fn sink_failure_is_reported() {
    let mut model = model();
    model.push_photo(photo([255, 0, 0, 255])).unwrap();
    let sink = MockSink {
        should_fail: true,
        ..MockSink::default()
    };
    let snapshot = ExportSnapshot::from_model(&model, 8.0);
    let err = export_frame(snapshot, 1.0, "photobooth", Arc::new(sink))
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::Save(_)));
}
