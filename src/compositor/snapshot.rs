use crate::layout::{Background, FrameGeometry, LayoutModel, Photo, StickerItem, TextItem};

/// Everything the compositor needs, detached from the live model.
///
/// Image data is shared through `Arc`, so taking a snapshot is cheap and
/// edits made while an export is in flight do not reach it.
#[derive(Debug, Clone)]
pub struct ExportSnapshot {
    pub geometry: FrameGeometry,
    pub show_borders: bool,
    pub corner_radius: f64,
    pub background: Background,
    pub photos: Vec<Photo>,
    pub stickers: Vec<StickerItem>,
    pub texts: Vec<TextItem>,
}

impl ExportSnapshot {
    pub fn from_model(model: &LayoutModel, corner_radius: f64) -> Self {
        Self {
            geometry: model.geometry(),
            show_borders: model.show_borders(),
            corner_radius,
            background: model.background().clone(),
            photos: model.photos().to_vec(),
            stickers: model.stickers().to_vec(),
            texts: model.texts().to_vec(),
        }
    }

    /// Number of layers an export resolves.
    pub fn layer_count(&self) -> usize {
        self.photos.len() + self.stickers.len() + self.texts.len()
    }
}
