//! Raster codec boundary.
//!
//! Encoded images are decoded once at entry into a [`PixelBuffer`] and
//! encoded once at exit. Everything between works on raw RGBA8.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::{Result, SpriteKeyError};
use crate::frame::PixelBuffer;

/// Decode any supported encoded image into RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| SpriteKeyError::Decode(e.to_string()))?;
    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(SpriteKeyError::ContextUnavailable(format!(
            "decoded image has no pixels ({width}x{height})"
        )));
    }
    PixelBuffer::from_raw(width, height, rgba.into_raw())
}

/// Encode a buffer as PNG, keeping the alpha channel.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let image = RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.as_bytes().to_vec())
        .ok_or_else(|| {
            SpriteKeyError::ContextUnavailable(format!(
                "cannot build {}x{} raster",
                buffer.width(),
                buffer.height()
            ))
        })?;
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| SpriteKeyError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}
