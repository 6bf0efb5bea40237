//! RGB → HSL conversion.

use serde::{Deserialize, Serialize};
use spritekey_core::Rgb;

/// Hue/saturation/lightness triple.
///
/// `h` is in degrees `[0, 360)`, `s` and `l` are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    /// Whether the hue lies in `[lo, hi]` degrees.
    #[inline]
    pub fn hue_within(&self, lo: f32, hi: f32) -> bool {
        self.h >= lo && self.h <= hi
    }
}

impl From<Rgb> for Hsl {
    fn from(c: Rgb) -> Self {
        rgb_to_hsl(c.r, c.g, c.b)
    }
}

/// Standard max/min channel conversion. Grays (max == min) have
/// hue and saturation 0.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let sector = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    let mut h = sector * 60.0;
    if h >= 360.0 {
        h -= 360.0;
    }

    Hsl { h, s, l }
}
