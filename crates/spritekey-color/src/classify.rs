//! Strict chroma background classifiers.
//!
//! Both classifiers err on the side of keeping a pixel: a subject pixel
//! that survives is harmless, a subject pixel that gets keyed out leaves
//! a hole in the sticker.

use spritekey_core::{KeyFamily, Rgb};

use crate::hsl::rgb_to_hsl;

/// Hue window of generated green-screen backgrounds, in degrees.
pub const GREEN_HUE: (f32, f32) = (135.0, 147.0);
/// Hue window of generated magenta backgrounds, in degrees.
pub const MAGENTA_HUE: (f32, f32) = (295.0, 305.0);

const MIN_SATURATION: f32 = 0.65;
const LIGHTNESS: (f32, f32) = (0.3, 0.7);

/// Green-screen test. `tolerance` widens the hue window on both sides.
pub fn is_green_background(r: u8, g: u8, b: u8, tolerance: f32) -> bool {
    let hsl = rgb_to_hsl(r, g, b);
    if !hsl.hue_within(GREEN_HUE.0 - tolerance, GREEN_HUE.1 + tolerance) {
        return false;
    }
    if hsl.s <= MIN_SATURATION || hsl.l <= LIGHTNESS.0 || hsl.l >= LIGHTNESS.1 {
        return false;
    }

    let (r, g, b) = (r as f32, g as f32, b as f32);
    g >= r * 2.0 && g >= b * 2.0 && g > 120.0 && r < 100.0 && b < 100.0
}

/// Magenta-screen test. `tolerance` widens the hue window on both sides.
pub fn is_magenta_background(r: u8, g: u8, b: u8, tolerance: f32) -> bool {
    let hsl = rgb_to_hsl(r, g, b);
    if !hsl.hue_within(MAGENTA_HUE.0 - tolerance, MAGENTA_HUE.1 + tolerance) {
        return false;
    }
    if hsl.s <= MIN_SATURATION || hsl.l <= LIGHTNESS.0 || hsl.l >= LIGHTNESS.1 {
        return false;
    }

    r > 180 && b > 180 && g < 100 && (r as i16 - b as i16).abs() < 80
}

/// Family of a requested key color, judged by its own hue.
pub fn key_family(key: Rgb) -> KeyFamily {
    let hsl = rgb_to_hsl(key.r, key.g, key.b);
    if hsl.s < 0.3 {
        KeyFamily::Other
    } else if hsl.hue_within(80.0, 170.0) {
        KeyFamily::Green
    } else if hsl.hue_within(270.0, 330.0) {
        KeyFamily::Magenta
    } else {
        KeyFamily::Other
    }
}
