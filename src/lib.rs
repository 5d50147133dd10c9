//! Photobooth frame editor.
//!
//! Captures up to four photos into a fixed slot layout, decorates the frame
//! with text, stickers and a background, and exports a high-resolution PNG.
//!
//! - [`layout`]: frame geometry, placed elements and selection
//! - [`compositor`]: high-resolution PNG export
//! - [`camera`]: stream acquisition and mirrored snapshots
//! - [`booth`]: the [`Photobooth`] controller tying them together

pub mod booth;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod draw;
pub mod layout;
pub mod notification;
pub mod scene;
pub mod util;

pub use booth::{BoothDependencies, BoothError, Photobooth};
pub use config::Config;
