use std::{path::PathBuf, sync::Arc};

use futures::future::join_all;
use tokio::task;

use super::{
    dependencies::ExportSink,
    file,
    snapshot::ExportSnapshot,
    types::{ExportError, ExportReport, ExportResult, LayerFailure, LayerKind, RenderedFrame},
};
use crate::draw::{
    BackgroundFill, DecodedImage, clip_rounded, image, render_background, render_photo,
    render_sticker, render_text,
};
use crate::util::{Point, Rect};

type Decoded = Result<DecodedImage, String>;

/// Composites the snapshot and hands the PNG to `sink`.
pub async fn export_frame(
    snapshot: ExportSnapshot,
    scale: f64,
    filename_prefix: &str,
    sink: Arc<dyn ExportSink>,
) -> Result<ExportResult, ExportError> {
    log::info!(
        "Starting export: {} photos, {} stickers, {} texts at {scale}x",
        snapshot.photos.len(),
        snapshot.stickers.len(),
        snapshot.texts.len()
    );

    let frame = composite(&snapshot, scale).await?;
    let filename = file::export_filename(filename_prefix);
    let path = save_frame(sink, frame.png, filename.clone()).await?;

    if !frame.report.is_complete() {
        log::warn!(
            "Exported {} with {} of {} layers missing",
            filename,
            frame.report.failures.len(),
            frame.report.resolved
        );
    }

    Ok(ExportResult {
        path,
        filename,
        report: frame.report,
    })
}

/// Decodes every layer and draws the frame at `scale` times preview size.
///
/// Returns only after all photo, sticker and text layers have resolved.
/// Layers whose image data cannot be decoded are left out and listed in
/// the report.
pub async fn composite(snapshot: &ExportSnapshot, scale: f64) -> Result<RenderedFrame, ExportError> {
    if snapshot.photos.is_empty() {
        return Err(ExportError::NoPhotos);
    }

    let photo_sources: Vec<Arc<[u8]>> =
        snapshot.photos.iter().map(|p| Arc::clone(&p.png)).collect();
    let sticker_sources: Vec<Arc<[u8]>> = snapshot
        .stickers
        .iter()
        .map(|s| Arc::clone(&s.bytes))
        .collect();
    let background_source = snapshot
        .background
        .image
        .as_ref()
        .map(|image| Arc::clone(&image.bytes));

    let (photos, stickers, background) = futures::join!(
        decode_layers(photo_sources),
        decode_layers(sticker_sources),
        decode_background(background_source)
    );

    render(snapshot, scale, background, photos, stickers)
}

async fn decode_layers(sources: Vec<Arc<[u8]>>) -> Vec<Decoded> {
    let handles = sources.into_iter().map(|bytes| {
        task::spawn_blocking(move || DecodedImage::decode(&bytes).map_err(|e| e.to_string()))
    });

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(format!("decode task failed: {e}")),
        })
        .collect()
}

async fn decode_background(source: Option<Arc<[u8]>>) -> Option<DecodedImage> {
    let bytes = source?;
    match decode_layers(vec![bytes]).await.pop() {
        Some(Ok(image)) => Some(image),
        Some(Err(reason)) => {
            log::warn!("Background image could not be decoded, using solid color: {reason}");
            None
        }
        None => None,
    }
}

fn render(
    snapshot: &ExportSnapshot,
    scale: f64,
    background: Option<DecodedImage>,
    photos: Vec<Decoded>,
    stickers: Vec<Decoded>,
) -> Result<RenderedFrame, ExportError> {
    let size = snapshot.geometry.size.scaled(scale);
    let (width, height) = (size.width.ceil(), size.height.ceil());
    let max = image::MAX_SURFACE_DIMENSION as f64;
    if !(width >= 1.0 && height >= 1.0 && width <= max && height <= max) {
        return Err(ExportError::InvalidSize { width, height });
    }

    let surface =
        cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)?;
    let mut report = ExportReport {
        width: width as i32,
        height: height as i32,
        ..ExportReport::default()
    };
    log::debug!("Export surface {}x{}", report.width, report.height);

    {
        let ctx = cairo::Context::new(&surface)?;
        let bounds = Rect::new(0.0, 0.0, width, height);
        let radius = snapshot.corner_radius * scale;
        clip_rounded(&ctx, bounds, radius);

        draw_background(&ctx, snapshot, scale, bounds, background)?;

        for (index, decoded) in photos.into_iter().enumerate() {
            let outcome = decoded.and_then(|image| {
                let slot = snapshot
                    .geometry
                    .slots
                    .get(index)
                    .ok_or_else(|| format!("no slot for photo {index}"))?;
                let layer = image.into_surface().map_err(|e| e.to_string())?;
                let clip = snapshot.show_borders.then_some(radius);
                render_photo(&ctx, &layer, slot.scaled(scale), clip).map_err(|e| e.to_string())
            });
            settle(&mut report, LayerKind::Photo(index), outcome);
        }

        for (sticker, decoded) in snapshot.stickers.iter().zip(stickers) {
            let outcome = decoded.and_then(|image| {
                let layer = image.into_surface().map_err(|e| e.to_string())?;
                let origin = Point::new(sticker.position.x * scale, sticker.position.y * scale);
                render_sticker(
                    &ctx,
                    &layer,
                    origin,
                    sticker.width * scale,
                    sticker.rotation,
                )
                .map_err(|e| e.to_string())
            });
            settle(&mut report, LayerKind::Sticker(sticker.id), outcome);
        }

        for text in &snapshot.texts {
            let origin = Point::new(text.position.x * scale, text.position.y * scale);
            let outcome = render_text(
                &ctx,
                origin,
                &text.content,
                text.color,
                text.size * scale,
                &text.font,
                text.rotation,
            )
            .map_err(|e| e.to_string());
            settle(&mut report, LayerKind::Text(text.id), outcome);
        }
    }

    surface.flush();
    let png = image::encode_png(&surface)?;
    log::info!(
        "Composited {} of {} layers ({} bytes)",
        report.drawn,
        report.resolved,
        png.len()
    );

    Ok(RenderedFrame { png, report })
}

fn draw_background(
    ctx: &cairo::Context,
    snapshot: &ExportSnapshot,
    scale: f64,
    bounds: Rect,
    decoded: Option<DecodedImage>,
) -> Result<(), ExportError> {
    let background = &snapshot.background;
    let surface = match decoded {
        Some(image) => match image.into_surface() {
            Ok(surface) => Some(surface),
            Err(e) => {
                log::warn!("Background image unusable, using solid color: {e}");
                None
            }
        },
        None => None,
    };

    let fill = match (&surface, &background.image) {
        (Some(image), Some(meta)) if background.repeat => Some(BackgroundFill::Tiled {
            image,
            tile: meta.tile.scaled(scale),
        }),
        (Some(image), _) => Some(BackgroundFill::Stretched { image }),
        (None, _) => None,
    };

    render_background(ctx, bounds, background.color, fill)?;
    Ok(())
}

fn settle(report: &mut ExportReport, layer: LayerKind, outcome: Result<(), String>) {
    report.resolved += 1;
    match outcome {
        Ok(()) => report.drawn += 1,
        Err(reason) => {
            log::warn!("Omitting {layer} from export: {reason}");
            report.failures.push(LayerFailure { layer, reason });
        }
    }
}

async fn save_frame(
    sink: Arc<dyn ExportSink>,
    png: Vec<u8>,
    filename: String,
) -> Result<PathBuf, ExportError> {
    task::spawn_blocking(move || sink.save(&png, &filename))
        .await
        .map_err(|e| ExportError::Task(format!("Save task failed: {e}")))?
}
