//! Data types for frame export.

use crate::draw::ImageError;
use crate::layout::ItemId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One drawable layer of the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Photo(usize),
    Sticker(ItemId),
    Text(ItemId),
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Photo(index) => write!(f, "photo {}", index + 1),
            LayerKind::Sticker(id) => write!(f, "sticker {id}"),
            LayerKind::Text(id) => write!(f, "text {id}"),
        }
    }
}

/// A layer that was omitted from the export.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerFailure {
    pub layer: LayerKind,
    pub reason: String,
}

/// Per-layer bookkeeping for one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// Output surface width in pixels
    pub width: i32,
    /// Output surface height in pixels
    pub height: i32,
    /// Layers that finished, drawn or failed (`photos + stickers + texts`)
    pub resolved: usize,
    /// Layers actually drawn
    pub drawn: usize,
    pub failures: Vec<LayerFailure>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A composited frame, before it is handed to a sink.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub png: Vec<u8>,
    pub report: ExportReport,
}

/// A frame written by an [`ExportSink`](super::ExportSink).
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub path: PathBuf,
    pub filename: String,
    pub report: ExportReport,
}

/// Errors that abort an export. Individual layer failures never do.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Please take at least one photo before downloading.")]
    NoPhotos,

    #[error("Frame size {width}x{height} cannot be rendered")]
    InvalidSize { width: f64, height: f64 },

    #[error("Drawing failed: {0}")]
    Surface(#[from] cairo::Error),

    #[error("Failed to encode frame: {0}")]
    Encode(#[from] ImageError),

    #[error("Failed to save frame: {0}")]
    Save(#[from] std::io::Error),

    #[error("Export task failed: {0}")]
    Task(String),
}
