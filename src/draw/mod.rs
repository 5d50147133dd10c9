//! Rendering primitives for the photobooth frame (Cairo + Pango).
//!
//! - [`Color`]: RGBA color with hex parsing for the color pickers
//! - [`FontDescriptor`]: font family/weight/style shared by measuring and drawing
//! - [`image`]: decoding uploads and captures into Cairo-ready buffers
//! - [`render`]: background, photo, sticker and text drawing

pub mod color;
pub mod font;
pub mod image;
pub mod render;

pub use color::Color;
pub use font::FontDescriptor;
pub use image::{DecodedImage, ImageError};
pub use render::{
    BackgroundFill, clip_rounded, measure_text, render_background, render_photo, render_sticker,
    render_text,
};
