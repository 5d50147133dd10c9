//! Cairo-based rendering functions for frame layers.
//!
//! Every function takes coordinates already mapped into output space; the
//! compositor owns the preview-to-output scaling.

use super::color::Color;
use super::font::FontDescriptor;
use crate::util::{Point, Rect, Size};
use std::f64::consts::PI;

/// How an image background covers the frame.
pub enum BackgroundFill<'a> {
    /// Repeat the image from the origin, each copy drawn at `tile` size.
    Tiled {
        image: &'a cairo::ImageSurface,
        tile: Size,
    },
    /// Stretch one copy across the whole frame.
    Stretched { image: &'a cairo::ImageSurface },
}

/// Adds a rounded-rectangle path, matching canvas `roundRect` semantics.
///
/// The radius is reduced so opposite corners never overlap.
pub fn rounded_rect_path(ctx: &cairo::Context, rect: Rect, radius: f64) {
    let r = radius.max(0.0).min(rect.width / 2.0).min(rect.height / 2.0);
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);

    ctx.new_sub_path();
    if r <= 0.0 {
        ctx.rectangle(x, y, w, h);
        return;
    }
    ctx.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
    ctx.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
    ctx.arc(x + r, y + h - r, r, PI / 2.0, PI);
    ctx.arc(x + r, y + r, r, PI, 3.0 * PI / 2.0);
    ctx.close_path();
}

/// Intersects the current clip with a rounded rectangle.
pub fn clip_rounded(ctx: &cairo::Context, rect: Rect, radius: f64) {
    ctx.new_path();
    rounded_rect_path(ctx, rect, radius);
    ctx.clip();
}

/// Paints the frame background over `bounds`.
///
/// With an image fill the color is not painted underneath, so transparent
/// regions of the image stay transparent in the export.
pub fn render_background(
    ctx: &cairo::Context,
    bounds: Rect,
    color: Color,
    fill: Option<BackgroundFill<'_>>,
) -> Result<(), cairo::Error> {
    ctx.save()?;
    match fill {
        Some(BackgroundFill::Tiled { image, tile }) if tile.width > 0.0 && tile.height > 0.0 => {
            let pattern = cairo::SurfacePattern::create(image);
            pattern.set_extend(cairo::Extend::Repeat);
            // Pattern matrices map user space into pattern space
            let mut matrix = cairo::Matrix::identity();
            matrix.scale(
                image.width() as f64 / tile.width,
                image.height() as f64 / tile.height,
            );
            matrix.translate(-bounds.x, -bounds.y);
            pattern.set_matrix(matrix);
            ctx.set_source(&pattern)?;
            ctx.rectangle(bounds.x, bounds.y, bounds.width, bounds.height);
            ctx.fill()?;
        }
        Some(BackgroundFill::Stretched { image }) => {
            draw_image_in_rect(ctx, image, bounds)?;
        }
        _ => {
            color.apply(ctx);
            ctx.rectangle(bounds.x, bounds.y, bounds.width, bounds.height);
            ctx.fill()?;
        }
    }
    ctx.restore()
}

/// Draws `image` stretched to exactly cover `rect`.
pub fn draw_image_in_rect(
    ctx: &cairo::Context,
    image: &cairo::ImageSurface,
    rect: Rect,
) -> Result<(), cairo::Error> {
    let (iw, ih) = (image.width() as f64, image.height() as f64);
    if iw <= 0.0 || ih <= 0.0 || rect.width <= 0.0 || rect.height <= 0.0 {
        return Ok(());
    }

    ctx.save()?;
    ctx.translate(rect.x, rect.y);
    ctx.scale(rect.width / iw, rect.height / ih);
    ctx.set_source_surface(image, 0.0, 0.0)?;
    // Pad avoids a faded 1px seam at the scaled edges
    ctx.source().set_extend(cairo::Extend::Pad);
    ctx.rectangle(0.0, 0.0, iw, ih);
    ctx.fill()?;
    ctx.restore()
}

/// Draws a photo into its slot, optionally clipped to rounded corners.
pub fn render_photo(
    ctx: &cairo::Context,
    image: &cairo::ImageSurface,
    slot: Rect,
    corner_radius: Option<f64>,
) -> Result<(), cairo::Error> {
    ctx.save()?;
    if let Some(radius) = corner_radius {
        clip_rounded(ctx, slot, radius);
    }
    draw_image_in_rect(ctx, image, slot)?;
    ctx.restore()
}

/// Draws a sticker rotated about its center.
///
/// `origin` is the unrotated top-left corner and `width` the drawn width,
/// both in output pixels; height follows the image's natural aspect ratio.
pub fn render_sticker(
    ctx: &cairo::Context,
    image: &cairo::ImageSurface,
    origin: Point,
    width: f64,
    rotation_degrees: f64,
) -> Result<(), cairo::Error> {
    if image.width() <= 0 {
        return Ok(());
    }
    let height = image.height() as f64 / image.width() as f64 * width;

    ctx.save()?;
    ctx.translate(origin.x + width / 2.0, origin.y + height / 2.0);
    ctx.rotate(rotation_degrees.to_radians());
    draw_image_in_rect(
        ctx,
        image,
        Rect::new(-width / 2.0, -height / 2.0, width, height),
    )?;
    ctx.restore()
}

/// Renders a text label rotated about `origin`.
///
/// After translating to `origin` and rotating, the first line's baseline sits
/// on the origin (canvas `fillText(text, 0, 0)` placement). Newlines produce
/// additional lines below it.
pub fn render_text(
    ctx: &cairo::Context,
    origin: Point,
    text: &str,
    color: Color,
    size_px: f64,
    font: &FontDescriptor,
    rotation_degrees: f64,
) -> Result<(), cairo::Error> {
    if text.is_empty() {
        return Ok(());
    }

    ctx.save()?;
    // Subpixel AA fringes on transparent pixels, so use gray
    ctx.set_antialias(cairo::Antialias::Best);
    ctx.translate(origin.x, origin.y);
    ctx.rotate(rotation_degrees.to_radians());

    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&font.to_pango_description(size_px)));
    layout.set_text(text);

    let baseline = layout.baseline() as f64 / pango::SCALE as f64;
    ctx.move_to(0.0, -baseline);
    color.apply(ctx);
    pangocairo::functions::show_layout(ctx, &layout);

    ctx.restore()
}

/// Measures the logical extent of `text` in pixels with Pango.
///
/// Returns `None` only when Cairo cannot create a scratch surface.
pub fn measure_text(text: &str, font: &FontDescriptor, size_px: f64) -> Option<Size> {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1).ok()?;
    let ctx = cairo::Context::new(&surface).ok()?;
    let layout = pangocairo::functions::create_layout(&ctx);
    layout.set_font_description(Some(&font.to_pango_description(size_px)));
    layout.set_text(text);
    let (width, height) = layout.pixel_size();
    Some(Size::new(width as f64, height as f64))
}
