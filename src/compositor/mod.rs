//! High-resolution export of the composed frame.
//!
//! The compositor works from an [`ExportSnapshot`], decodes every image layer
//! on the blocking pool, draws background, photos, stickers and text in that
//! order, and hands the encoded PNG to an [`ExportSink`].

pub mod file;
pub mod types;

mod dependencies;
mod pipeline;
mod snapshot;
#[cfg(test)]
mod tests;

pub use dependencies::{DirectorySink, ExportSink};
pub use pipeline::{composite, export_frame};
pub use snapshot::ExportSnapshot;
pub use types::{ExportError, ExportReport, ExportResult, LayerFailure, LayerKind, RenderedFrame};
