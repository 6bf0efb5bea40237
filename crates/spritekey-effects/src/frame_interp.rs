//! Alpha-weighted cross-fade between two keyframes.
//!
//! Each source contributes in proportion to its own opacity times its time
//! weight, so a pixel that is already transparent in one frame takes its
//! color from the other frame instead of fading towards black.

use rayon::prelude::*;
use spritekey_core::frame::BYTES_PER_PIXEL;
use spritekey_core::{codec, EasingCurve, PixelBuffer, Result, SpriteKeyError};

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Blend one pixel pair at eased parameter `t`.
#[inline]
fn blend_pixel(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let w1 = a[3] as f32 / 255.0 * (1.0 - t);
    let w2 = b[3] as f32 / 255.0 * t;
    let sum = w1 + w2;
    if sum <= 0.0 {
        return TRANSPARENT;
    }
    let mix = |c1: u8, c2: u8| {
        ((c1 as f32 * w1 + c2 as f32 * w2) / sum)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    [
        mix(a[0], b[0]),
        mix(a[1], b[1]),
        mix(a[2], b[2]),
        (sum * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Interpolate between `a` (t = 0) and `b` (t = 1).
///
/// The output canvas is the larger of the two in each dimension. A smaller
/// frame sits at the origin at natural size and is transparent elsewhere.
pub fn blend_frames(
    a: &PixelBuffer,
    b: &PixelBuffer,
    t: f32,
    easing: EasingCurve,
) -> Result<PixelBuffer> {
    let width = a.width().max(b.width());
    let height = a.height().max(b.height());
    if width == 0 || height == 0 {
        return Err(SpriteKeyError::ContextUnavailable(format!(
            "cannot blend into a {width}x{height} canvas"
        )));
    }

    let eased = easing.apply(t);
    let mut out = PixelBuffer::new(width, height);
    let stride = width as usize * BYTES_PER_PIXEL;

    out.as_bytes_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            for (x, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let x = x as u32;
                let pa = a.pixel(x, y).unwrap_or(TRANSPARENT);
                let pb = b.pixel(x, y).unwrap_or(TRANSPARENT);
                px.copy_from_slice(&blend_pixel(pa, pb, eased));
            }
        });

    Ok(out)
}

/// Decode two encoded frames, blend them and encode the result as PNG.
pub fn blend_encoded(a: &[u8], b: &[u8], t: f32, easing: EasingCurve) -> Result<Vec<u8>> {
    let a = codec::decode_image(a)?;
    let b = codec::decode_image(b)?;
    codec::encode_png(&blend_frames(&a, &b, t, easing)?)
}
