//! Corner sampling to find the background color actually painted.

use std::collections::HashMap;

use spritekey_color::{key_family, rgb_to_hsl};
use spritekey_core::{KeyFamily, PixelBuffer, Rgb};
use tracing::debug;

use super::CORNER_SAMPLE_SIZE;

/// Background color detected for one image. Computed once before the
/// chunk loop and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedBackground {
    pub color: Rgb,
    pub is_magenta_family: bool,
    pub is_green_family: bool,
}

impl DetectedBackground {
    pub fn family(&self) -> KeyFamily {
        if self.is_magenta_family {
            KeyFamily::Magenta
        } else if self.is_green_family {
            KeyFamily::Green
        } else {
            KeyFamily::Other
        }
    }
}

/// Whether a sampled color could be the background of the given family.
fn plausible_for(color: Rgb, family: KeyFamily) -> bool {
    let hsl = rgb_to_hsl(color.r, color.g, color.b);
    match family {
        KeyFamily::Magenta => {
            hsl.hue_within(270.0, 330.0) && hsl.s > 0.3 && color.r > color.g && color.b > color.g
        }
        KeyFamily::Green => {
            hsl.hue_within(90.0, 160.0) && hsl.s > 0.3 && color.g > color.r && color.g > color.b
        }
        KeyFamily::Other => false,
    }
}

/// Sample the four corners and pick the most frequent plausible color.
///
/// Falls back to `requested` when no sampled color fits the family of the
/// requested key.
pub fn detect_background(buffer: &PixelBuffer, requested: Rgb) -> DetectedBackground {
    let family = key_family(requested);
    let fallback = DetectedBackground {
        color: requested,
        is_magenta_family: family == KeyFamily::Magenta,
        is_green_family: family == KeyFamily::Green,
    };
    if family == KeyFamily::Other || buffer.is_empty() {
        return fallback;
    }

    let (w, h) = (buffer.width(), buffer.height());
    let sw = CORNER_SAMPLE_SIZE.min(w);
    let sh = CORNER_SAMPLE_SIZE.min(h);
    let corners = [(0, 0), (w - sw, 0), (0, h - sh), (w - sw, h - sh)];

    let mut histogram: HashMap<Rgb, u32> = HashMap::new();
    for (x0, y0) in corners {
        for y in y0..y0 + sh {
            for x in x0..x0 + sw {
                let Some([r, g, b, a]) = buffer.pixel(x, y) else {
                    continue;
                };
                if a == 0 {
                    continue;
                }
                *histogram.entry(Rgb::new(r, g, b)).or_insert(0) += 1;
            }
        }
    }

    let best = histogram
        .into_iter()
        .filter(|(color, _)| plausible_for(*color, family))
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)));

    match best {
        Some((color, count)) => {
            debug!(requested = %requested, detected = %color, count, "background detected");
            DetectedBackground { color, ..fallback }
        }
        None => {
            debug!(requested = %requested, "no plausible corner color, using requested key");
            fallback
        }
    }
}
