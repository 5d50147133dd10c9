//! Frame layout: slot geometry, placed elements and selection state.

pub mod geometry;
pub mod items;
pub mod model;


pub use geometry::{FrameGeometry, FrameMetrics, SLOT_COUNT};
pub use items::{
    Background, BackgroundImage, ItemId, Photo, Selection, StickerItem, StickerSource, TextItem,
    TextStyle, compute_tile_size,
};
pub use model::{
    ApproximateTextMeasurer, LayoutError, LayoutModel, MAX_FONT_SIZE, MAX_STICKER_SIZE,
    MAX_STICKERS, MIN_FONT_SIZE, MIN_STICKER_SIZE, PangoTextMeasurer, TextMeasurer,
};

/// Maximum number of captured photos per frame.
pub const MAX_PHOTOS: usize = SLOT_COUNT;
