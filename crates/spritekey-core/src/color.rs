//! RGB colors and the supported chroma keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SpriteKeyError;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance in RGB space.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        let dr = self.r as f32 - other.r as f32;
        let dg = self.g as f32 - other.g as f32;
        let db = self.b as f32 - other.b as f32;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Longest possible RGB distance (black to white).
    pub const MAX_DISTANCE: f32 = 441.672_96;

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = SpriteKeyError;

    /// Parse `#RRGGBB` or `RRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(SpriteKeyError::InvalidParameter(format!(
                "expected #RRGGBB, got {s:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| {
                SpriteKeyError::InvalidParameter(format!("bad hex color {s:?}: {e}"))
            })
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Which chroma-key family a color belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyFamily {
    Green,
    Magenta,
    /// Neither supported family; removal falls back to plain RGB distance.
    Other,
}

/// Reference chroma keys the generator is asked to paint.
pub struct ChromaKey;

impl ChromaKey {
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);

    /// Resolve a preset name (`green`, `magenta`) or a hex color.
    pub fn parse(s: &str) -> Result<Rgb, SpriteKeyError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(Self::GREEN),
            "magenta" | "pink" => Ok(Self::MAGENTA),
            _ => s.parse(),
        }
    }
}
