//! Placement state for one photobooth frame.

use super::geometry::{FrameGeometry, FrameMetrics, SLOT_COUNT};
use super::items::{
    Background, BackgroundImage, ItemId, Photo, Selection, StickerItem, StickerSource, TextItem,
    TextStyle, compute_tile_size,
};
use crate::config::{Config, Orientation};
use crate::draw::{Color, FontDescriptor, color, image};
use crate::util::{self, Point, Size};
use std::sync::Arc;
use thiserror::Error;

pub const MIN_FONT_SIZE: f64 = 10.0;
pub const MAX_FONT_SIZE: f64 = 72.0;
pub const MIN_STICKER_SIZE: f64 = 10.0;
pub const MAX_STICKER_SIZE: f64 = 200.0;
/// Hard ceiling on stickers regardless of configuration.
pub const MAX_STICKERS: usize = 10;

/// Default placement of new text, in frame-local pixels.
const TEXT_ORIGIN: Point = Point { x: 10.0, y: 120.0 };

/// Rejected layout operations. Display strings are shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Please take at least one photo first.")]
    NoPhotos,

    #[error("Maximum of {max} photos reached.")]
    PhotoLimit { max: usize },

    #[error("You have reached the maximum of {max} stickers. Remove one before adding another.")]
    StickerLimit { max: usize },

    #[error("Please choose an image file (JPEG, PNG, GIF); '{mime}' is not an image.")]
    NotAnImage { mime: String },

    #[error("Could not load the image: {0}")]
    InvalidImage(String),

    #[error("Nothing is selected.")]
    NoSelection,

    #[error("Element {0} does not exist.")]
    UnknownItem(ItemId),

    #[error("There is no photo in slot {0}.")]
    UnknownPhoto(usize),

    #[error("Element {0} must be selected before it can be dragged.")]
    NotSelected(ItemId),
}

/// Measures unrotated text extents for bounds clamping.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &str, font: &FontDescriptor, size_px: f64) -> Size;
}

/// Pango-backed measurer; agrees with what the compositor draws.
#[derive(Debug, Default, Clone, Copy)]
pub struct PangoTextMeasurer;

impl TextMeasurer for PangoTextMeasurer {
    fn measure(&self, text: &str, font: &FontDescriptor, size_px: f64) -> Size {
        crate::draw::measure_text(text, font, size_px)
            .unwrap_or_else(|| ApproximateTextMeasurer.measure(text, font, size_px))
    }
}

/// Font-independent estimate: 0.6em per character, 1.2em per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproximateTextMeasurer;

impl TextMeasurer for ApproximateTextMeasurer {
    fn measure(&self, text: &str, _font: &FontDescriptor, size_px: f64) -> Size {
        let lines = text.split('\n');
        let line_count = lines.clone().count().max(1);
        let longest = lines.map(|line| line.chars().count()).max().unwrap_or(0);
        Size::new(
            longest as f64 * size_px * 0.6,
            line_count as f64 * size_px * 1.2,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    id: ItemId,
    /// Pointer position minus element position at drag start
    offset: Point,
}

/// In-memory placement state: photos, text, stickers, background, selection.
///
/// All mutation goes through methods that enforce the capacity limits and
/// keep every text/sticker box inside the frame at placement and on move.
pub struct LayoutModel {
    orientation: Orientation,
    show_borders: bool,
    metrics: FrameMetrics,
    photos: Vec<Photo>,
    texts: Vec<TextItem>,
    stickers: Vec<StickerItem>,
    background: Background,
    default_background: Color,
    selection: Selection,
    drag: Option<DragState>,
    next_id: u64,
    max_stickers: usize,
    sticker_size: f64,
    measurer: Arc<dyn TextMeasurer>,
}

impl std::fmt::Debug for LayoutModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutModel")
            .field("orientation", &self.orientation)
            .field("photos", &self.photos.len())
            .field("texts", &self.texts.len())
            .field("stickers", &self.stickers.len())
            .field("selection", &self.selection)
            .finish()
    }
}

impl LayoutModel {
    /// Creates an empty frame configured from `config`, measuring with Pango.
    pub fn new(config: &Config) -> Self {
        Self::with_measurer(config, Arc::new(PangoTextMeasurer))
    }

    pub fn with_measurer(config: &Config, measurer: Arc<dyn TextMeasurer>) -> Self {
        let default_background = config.frame.background_color.to_color_or(color::WHITE);
        Self {
            orientation: config.frame.orientation,
            show_borders: config.frame.show_borders,
            metrics: FrameMetrics::from(&config.frame),
            photos: Vec::new(),
            texts: Vec::new(),
            stickers: Vec::new(),
            background: Background::solid(default_background),
            default_background,
            selection: Selection::None,
            drag: None,
            next_id: 1,
            max_stickers: config.sticker.max_stickers.clamp(1, MAX_STICKERS),
            sticker_size: config
                .sticker
                .default_size
                .clamp(MIN_STICKER_SIZE, MAX_STICKER_SIZE),
            measurer,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Rendered layout for the current orientation and photo count.
    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry::compute(self.orientation, self.photos.len(), &self.metrics)
    }

    pub fn frame_size(&self) -> Size {
        self.geometry().size
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn show_borders(&self) -> bool {
        self.show_borders
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    pub fn texts(&self) -> &[TextItem] {
        &self.texts
    }

    pub fn stickers(&self) -> &[StickerItem] {
        &self.stickers
    }

    pub fn sticker_count(&self) -> usize {
        self.stickers.len()
    }

    pub fn max_stickers(&self) -> usize {
        self.max_stickers
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn text(&self, id: ItemId) -> Option<&TextItem> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn sticker(&self, id: ItemId) -> Option<&StickerItem> {
        self.stickers.iter().find(|s| s.id == id)
    }

    /// The selected text, if the selection is a text item.
    pub fn active_text(&self) -> Option<&TextItem> {
        match self.selection {
            Selection::Text(id) => self.text(id),
            _ => None,
        }
    }

    /// The selected sticker, if the selection is a sticker.
    pub fn active_sticker(&self) -> Option<&StickerItem> {
        match self.selection {
            Selection::Sticker(id) => self.sticker(id),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Photos
    // ------------------------------------------------------------------

    /// Appends a photo to the next free slot.
    pub fn push_photo(&mut self, photo: Photo) -> Result<usize, LayoutError> {
        if self.photos.len() >= SLOT_COUNT {
            return Err(LayoutError::PhotoLimit { max: SLOT_COUNT });
        }
        self.photos.push(photo);
        log::debug!("Photo stored in slot {}", self.photos.len() - 1);
        Ok(self.photos.len() - 1)
    }

    /// Whether another photo fits.
    pub fn has_free_slot(&self) -> bool {
        self.photos.len() < SLOT_COUNT
    }

    /// Deletes one photo; later photos move up one slot.
    pub fn remove_photo(&mut self, index: usize) -> Result<Photo, LayoutError> {
        if index >= self.photos.len() {
            return Err(LayoutError::UnknownPhoto(index));
        }
        Ok(self.photos.remove(index))
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Adds a text label at the default position and selects it.
    pub fn add_text(&mut self, style: TextStyle) -> Result<ItemId, LayoutError> {
        if self.photos.is_empty() {
            return Err(LayoutError::NoPhotos);
        }

        let size = style.size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        let extent = self.measurer.measure(&style.content, &style.font, size);
        let position = util::clamp_position(TEXT_ORIGIN, extent, self.frame_size());
        let id = self.allocate_id();

        self.texts.push(TextItem {
            id,
            content: style.content,
            font: style.font,
            color: style.color,
            size,
            rotation: style.rotation,
            position,
            slot_index: self.photos.len() - 1,
            extent,
        });
        self.selection = Selection::Text(id);
        log::debug!("Added text {id} at ({:.1}, {:.1})", position.x, position.y);
        Ok(id)
    }

    pub fn set_text_content(&mut self, id: ItemId, content: &str) -> Result<(), LayoutError> {
        self.edit_text(id, |text| text.content = content.to_string())
    }

    pub fn set_text_font(&mut self, id: ItemId, family: &str) -> Result<(), LayoutError> {
        self.edit_text(id, |text| text.font.family = family.to_string())
    }

    pub fn set_text_color(&mut self, id: ItemId, color: Color) -> Result<(), LayoutError> {
        self.edit_text(id, |text| text.color = color)
    }

    /// Sets the font size, clamped to 10-72 px.
    pub fn set_text_size(&mut self, id: ItemId, size: f64) -> Result<(), LayoutError> {
        self.edit_text(id, |text| {
            text.size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
        })
    }

    /// Stores the rotation exactly as given (no modulo).
    pub fn set_text_rotation(&mut self, id: ItemId, degrees: f64) -> Result<(), LayoutError> {
        self.edit_text(id, |text| text.rotation = degrees)
    }

    fn edit_text(
        &mut self,
        id: ItemId,
        edit: impl FnOnce(&mut TextItem),
    ) -> Result<(), LayoutError> {
        let measurer = Arc::clone(&self.measurer);
        let text = self
            .texts
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(LayoutError::UnknownItem(id))?;
        edit(text);
        text.extent = measurer.measure(&text.content, &text.font, text.size);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stickers
    // ------------------------------------------------------------------

    /// Checks the preconditions for opening a sticker upload.
    pub fn can_add_sticker(&self) -> Result<(), LayoutError> {
        if self.photos.is_empty() {
            return Err(LayoutError::NoPhotos);
        }
        if self.stickers.len() >= self.max_stickers {
            return Err(LayoutError::StickerLimit {
                max: self.max_stickers,
            });
        }
        Ok(())
    }

    /// Adds a sticker centered on the frame and selects it.
    pub fn add_sticker(&mut self, source: StickerSource) -> Result<ItemId, LayoutError> {
        self.can_add_sticker()?;
        if !source.mime.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(LayoutError::NotAnImage { mime: source.mime });
        }
        let natural = image::probe_dimensions(&source.bytes)
            .map_err(|e| LayoutError::InvalidImage(e.to_string()))?;

        let frame = self.frame_size();
        let id = self.allocate_id();
        let half = self.sticker_size / 2.0;
        let mut sticker = StickerItem {
            id,
            bytes: Arc::from(source.bytes),
            natural,
            width: self.sticker_size,
            rotation: 0.0,
            position: Point::new(frame.width / 2.0 - half, frame.height / 2.0 - half),
            slot_index: self.photos.len() - 1,
        };
        sticker.position = util::clamp_position(sticker.position, sticker.extent(), frame);

        log::debug!(
            "Added sticker {id} ({}x{}) at ({:.1}, {:.1})",
            natural.0,
            natural.1,
            sticker.position.x,
            sticker.position.y
        );
        self.stickers.push(sticker);
        self.selection = Selection::Sticker(id);
        Ok(id)
    }

    /// Sets the drawn width, clamped to 10-200 px.
    pub fn set_sticker_size(&mut self, id: ItemId, width: f64) -> Result<(), LayoutError> {
        let sticker = self.sticker_mut(id)?;
        sticker.width = width.clamp(MIN_STICKER_SIZE, MAX_STICKER_SIZE);
        Ok(())
    }

    /// Stores the rotation exactly as given (no modulo).
    pub fn set_sticker_rotation(&mut self, id: ItemId, degrees: f64) -> Result<(), LayoutError> {
        self.sticker_mut(id)?.rotation = degrees;
        Ok(())
    }

    fn sticker_mut(&mut self, id: ItemId) -> Result<&mut StickerItem, LayoutError> {
        self.stickers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(LayoutError::UnknownItem(id))
    }

    // ------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------

    /// Moves an element by a delta, clamped to the frame.
    pub fn move_by(&mut self, id: ItemId, dx: f64, dy: f64) -> Result<Point, LayoutError> {
        let (position, _) = self.placement(id)?;
        self.move_to(id, Point::new(position.x + dx, position.y + dy))
    }

    /// Places an element's top-left corner, clamped to the frame.
    pub fn move_to(&mut self, id: ItemId, target: Point) -> Result<Point, LayoutError> {
        let (_, extent) = self.placement(id)?;
        let clamped = util::clamp_position(target, extent, self.frame_size());

        if let Some(text) = self.texts.iter_mut().find(|t| t.id == id) {
            text.position = clamped;
        } else if let Some(sticker) = self.stickers.iter_mut().find(|s| s.id == id) {
            sticker.position = clamped;
        }
        Ok(clamped)
    }

    /// Starts dragging the selected element from `pointer`.
    pub fn begin_drag(&mut self, id: ItemId, pointer: Point) -> Result<(), LayoutError> {
        if self.selection.item() != Some(id) {
            return Err(LayoutError::NotSelected(id));
        }
        let (position, _) = self.placement(id)?;
        self.drag = Some(DragState {
            id,
            offset: Point::new(pointer.x - position.x, pointer.y - position.y),
        });
        Ok(())
    }

    /// Follows the pointer during a drag. Returns the new clamped position.
    pub fn drag_to(&mut self, pointer: Point) -> Option<Point> {
        let drag = self.drag?;
        let target = Point::new(pointer.x - drag.offset.x, pointer.y - drag.offset.y);
        self.move_to(drag.id, target).ok()
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn placement(&self, id: ItemId) -> Result<(Point, Size), LayoutError> {
        if let Some(text) = self.text(id) {
            return Ok((text.position, text.extent));
        }
        if let Some(sticker) = self.sticker(id) {
            return Ok((sticker.position, sticker.extent()));
        }
        Err(LayoutError::UnknownItem(id))
    }

    // ------------------------------------------------------------------
    // Selection and removal
    // ------------------------------------------------------------------

    /// Makes `id` the single active element.
    pub fn select(&mut self, id: ItemId) -> Result<(), LayoutError> {
        self.selection = if self.text(id).is_some() {
            Selection::Text(id)
        } else if self.sticker(id).is_some() {
            Selection::Sticker(id)
        } else {
            return Err(LayoutError::UnknownItem(id));
        };
        self.drag = None;
        Ok(())
    }

    /// Activates the background; only possible while it has an image.
    ///
    /// Returns whether the background became active. Without an image the
    /// selection is cleared instead.
    pub fn select_background(&mut self) -> bool {
        self.drag = None;
        if self.background.image.is_some() {
            self.selection = Selection::Background;
            true
        } else {
            self.selection = Selection::None;
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
        self.drag = None;
    }

    /// Deletes a text or sticker element.
    pub fn remove(&mut self, id: ItemId) -> Result<(), LayoutError> {
        if let Some(index) = self.texts.iter().position(|t| t.id == id) {
            self.texts.remove(index);
        } else if let Some(index) = self.stickers.iter().position(|s| s.id == id) {
            self.stickers.remove(index);
        } else {
            return Err(LayoutError::UnknownItem(id));
        }

        if self.selection.item() == Some(id) {
            self.selection = Selection::None;
        }
        if self.drag.is_some_and(|d| d.id == id) {
            self.drag = None;
        }
        Ok(())
    }

    /// Deletes whatever is active; the background loses its image.
    pub fn remove_selected(&mut self) -> Result<Selection, LayoutError> {
        let selection = self.selection;
        match selection {
            Selection::None => return Err(LayoutError::NoSelection),
            Selection::Text(id) | Selection::Sticker(id) => self.remove(id)?,
            Selection::Background => self.clear_background_image(),
        }
        Ok(selection)
    }

    // ------------------------------------------------------------------
    // Frame and background
    // ------------------------------------------------------------------

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn set_show_borders(&mut self, show: bool) {
        self.show_borders = show;
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background.color = color;
    }

    /// Sets the background image, computing its tile size for the current frame.
    pub fn set_background_image(&mut self, bytes: Vec<u8>) -> Result<(), LayoutError> {
        let natural = image::probe_dimensions(&bytes)
            .map_err(|e| LayoutError::InvalidImage(e.to_string()))?;
        let tile = compute_tile_size(natural, self.frame_size());
        log::debug!(
            "Background image {}x{}, tile {:.1}x{:.1}",
            natural.0,
            natural.1,
            tile.width,
            tile.height
        );
        self.background.image = Some(BackgroundImage {
            bytes: Arc::from(bytes),
            natural,
            tile,
        });
        Ok(())
    }

    pub fn clear_background_image(&mut self) {
        self.background.image = None;
        if self.selection == Selection::Background {
            self.selection = Selection::None;
        }
    }

    pub fn set_repeat_background(&mut self, repeat: bool) {
        self.background.repeat = repeat;
    }

    /// Clears photos, text and stickers and restores the default background.
    pub fn reset(&mut self) {
        self.photos.clear();
        self.texts.clear();
        self.stickers.clear();
        self.selection = Selection::None;
        self.drag = None;
        self.background = Background::solid(self.default_background);
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }
}
