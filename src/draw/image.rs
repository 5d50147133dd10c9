//! Decoding uploaded/captured images into Cairo-ready pixel buffers.
//!
//! Decoding happens off the drawing thread, so [`DecodedImage`] holds plain
//! bytes (`Send`) and is only turned into a [`cairo::ImageSurface`] by the
//! code that draws it.

use std::io::Cursor;
use thiserror::Error;

/// Cairo refuses surfaces wider or taller than this.
pub const MAX_SURFACE_DIMENSION: u32 = 32_767;

/// Errors raised while decoding or encoding image data.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unrecognised or corrupt image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to read image header: {0}")]
    Probe(#[from] std::io::Error),

    #[error("image dimensions {width}x{height} are not drawable")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("cairo surface error: {0}")]
    Surface(#[from] cairo::Error),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Premultiplied ARGB32 pixels in Cairo's native-endian layout.
#[derive(Clone)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl DecodedImage {
    /// Decodes any format the `image` crate recognises (PNG, JPEG, GIF, ...).
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let rgba = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.as_raw())
    }

    /// Packs straight-alpha RGBA8 pixels into a premultiplied ARGB32 buffer.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, ImageError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * 4;
        if rgba.len() < expected {
            return Err(ImageError::InvalidDimensions { width, height });
        }

        let stride = cairo::Format::ARgb32
            .stride_for_width(width)
            .map_err(ImageError::Surface)? as usize;
        let mut data = vec![0u8; stride * height as usize];

        for (row, src_row) in rgba[..expected]
            .chunks_exact(width as usize * 4)
            .enumerate()
        {
            let dst_row = &mut data[row * stride..row * stride + width as usize * 4];
            for (dst, px) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                let a = px[3] as u32;
                let premul = |c: u8| (c as u32 * a + 127) / 255;
                let argb = (a << 24) | (premul(px[0]) << 16) | (premul(px[1]) << 8) | premul(px[2]);
                dst.copy_from_slice(&argb.to_ne_bytes());
            }
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Height over width, the factor used to derive a sticker's height.
    pub fn aspect_ratio(&self) -> f64 {
        self.height as f64 / self.width as f64
    }

    /// Hands the pixel buffer to Cairo without copying.
    pub fn into_surface(self) -> Result<cairo::ImageSurface, ImageError> {
        let surface = cairo::ImageSurface::create_for_data(
            self.data,
            cairo::Format::ARgb32,
            self.width as i32,
            self.height as i32,
            self.stride as i32,
        )?;
        Ok(surface)
    }
}

/// Reads just the image header to learn its pixel dimensions.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let (width, height) = reader.into_dimensions()?;
    check_dimensions(width, height)?;
    Ok((width, height))
}

/// Serializes a surface as PNG bytes.
pub fn encode_png(surface: &cairo::ImageSurface) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    surface
        .write_to_png(&mut buffer)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Returns the premultiplied `[a, r, g, b]` channels of one pixel.
///
/// The surface must not be borrowed by a live [`cairo::Context`].
pub fn sample_pixel(surface: &mut cairo::ImageSurface, x: i32, y: i32) -> Option<[u8; 4]> {
    if x < 0 || y < 0 || x >= surface.width() || y >= surface.height() {
        return None;
    }
    surface.flush();
    let stride = surface.stride() as usize;
    let data = surface.data().ok()?;
    let offset = y as usize * stride + x as usize * 4;
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    let argb = u32::from_ne_bytes(bytes);
    Some([
        (argb >> 24) as u8,
        (argb >> 16) as u8,
        (argb >> 8) as u8,
        argb as u8,
    ])
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ImageError> {
    if width == 0 || height == 0 || width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION
    {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    Ok(())
}
