//! Element records held by the layout model.
//!
//! Items are plain data keyed by a stable [`ItemId`]; renderers look up
//! whatever presentation state they need by id.

use crate::draw::{Color, FontDescriptor};
use crate::util::{Point, Size};
use std::fmt;
use std::sync::Arc;

/// Stable identifier for a text or sticker element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A captured photo: self-contained PNG bytes plus pixel size.
#[derive(Debug, Clone)]
pub struct Photo {
    pub png: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
}

/// Style applied to newly added text (the text property panel values).
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub content: String,
    pub font: FontDescriptor,
    pub color: Color,
    pub size: f64,
    pub rotation: f64,
}

/// Text placed on the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub id: ItemId,
    pub content: String,
    pub font: FontDescriptor,
    pub color: Color,
    /// Font size in pixels (10 - 72)
    pub size: f64,
    /// Degrees, stored exactly as set
    pub rotation: f64,
    /// Frame-local anchor. Clamping treats it as the top-left of `extent`,
    /// while rendering puts the first baseline here, so the ascent is drawn
    /// above it (text at y = 0 exports with its glyphs off the top edge).
    pub position: Point,
    /// Index of the newest photo when this text was added
    pub slot_index: usize,
    /// Measured unrotated size, used for bounds clamping
    pub extent: Size,
}

/// Uploaded image data handed to the layout model.
#[derive(Debug, Clone)]
pub struct StickerSource {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl StickerSource {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }
}

/// Sticker image placed on the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerItem {
    pub id: ItemId,
    pub bytes: Arc<[u8]>,
    /// Natural pixel size of the source image
    pub natural: (u32, u32),
    /// Drawn width in pixels (10 - 200)
    pub width: f64,
    /// Degrees, stored exactly as set
    pub rotation: f64,
    /// Top-left corner in frame-local pixels
    pub position: Point,
    /// Index of the newest photo when this sticker was added
    pub slot_index: usize,
}

impl StickerItem {
    /// Height derived from the natural aspect ratio.
    pub fn height(&self) -> f64 {
        let (w, h) = self.natural;
        if w == 0 {
            return self.width;
        }
        self.width * h as f64 / w as f64
    }

    pub fn extent(&self) -> Size {
        Size::new(self.width, self.height())
    }
}

/// Background image with its precomputed tile size.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    pub bytes: Arc<[u8]>,
    pub natural: (u32, u32),
    /// Tile size in preview pixels, fixed when the image was set
    pub tile: Size,
}

/// Frame background: solid color, optionally covered by an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub color: Color,
    pub image: Option<BackgroundImage>,
    /// Tile the image (`true`) or stretch it over the frame (`false`)
    pub repeat: bool,
}

impl Background {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            image: None,
            repeat: true,
        }
    }
}

/// Tile size for a background image on a frame of `frame` size.
///
/// Bounded by a quarter of the frame's shorter side on each axis, then
/// shrunk along one axis to restore the image's aspect ratio.
pub fn compute_tile_size(natural: (u32, u32), frame: Size) -> Size {
    let (nw, nh) = (natural.0 as f64, natural.1 as f64);
    if nw <= 0.0 || nh <= 0.0 {
        return Size::default();
    }
    let max_tile = frame.width.min(frame.height) / 4.0;
    let mut width = nw.min(max_tile);
    let mut height = nh.min(max_tile);
    let aspect = nw / nh;
    if width / height > aspect {
        width = height * aspect;
    } else {
        height = width / aspect;
    }
    Size::new(width, height)
}

/// Which single element (if any) is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Text(ItemId),
    Sticker(ItemId),
    Background,
}

impl Selection {
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Selection::Text(id) | Selection::Sticker(id) => Some(*id),
            Selection::None | Selection::Background => None,
        }
    }
}
