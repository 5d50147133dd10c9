//! Geometry helpers shared by the layout model and the compositor.
//!
//! All coordinates are `f64` pixels in frame-local space (origin at the
//! frame's top-left corner) unless a function says otherwise.

use std::path::Path;

/// A point in frame-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Scales both dimensions by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Maps the rectangle from preview space into output space.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Clamps a top-left position so a box of `item` size stays inside `bounds`.
///
/// The allowed range is `[0, bounds - item]` on each axis. When the item is
/// larger than the bounds the range is empty and the position pins to 0.
/// Rotation is not considered: the box is the unrotated element size.
pub fn clamp_position(position: Point, item: Size, bounds: Size) -> Point {
    let max_x = (bounds.width - item.width).max(0.0);
    let max_y = (bounds.height - item.height).max(0.0);
    Point::new(
        clamp_finite(position.x, max_x),
        clamp_finite(position.y, max_y),
    )
}

fn clamp_finite(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

/// Guesses an image MIME type from a file extension.
///
/// Returns `application/octet-stream` for anything unrecognised so callers
/// can reject it the same way a browser file picker reports a foreign type.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
