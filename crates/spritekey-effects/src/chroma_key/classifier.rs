//! Chunked pixel classification.
//!
//! Each chunk gets two passes: a removal pass that zeroes alpha on
//! background pixels and an edge pass that fades partially transparent
//! pixels that still look like the key.

use spritekey_color::{is_green_background, is_magenta_background};
use spritekey_core::frame::BYTES_PER_PIXEL;
use spritekey_core::{KeyFamily, PixelBuffer, Result, Rgb, SpriteKeyError};
use tracing::debug;

use super::sampler::{detect_background, DetectedBackground};
use super::{
    ChromaKeyJob, ChromaKeyParams, ADAPTIVE_FUZZ_MULTIPLIER, CHUNK_PIXELS, EDGE_ALPHA_RETAIN,
    EDGE_FUZZ_MULTIPLIER, HUE_TOLERANCE_PER_FUZZ,
};

/// Distance and hue limits derived from the fuzz percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// RGB distance to the detected background that counts as a match.
    pub distance: f32,
    /// Hue tolerance in degrees for the strict HSL classifiers.
    pub hue_tolerance: f32,
    pub edge_distance: f32,
    pub edge_hue_tolerance: f32,
}

impl Thresholds {
    pub fn from_fuzz(fuzz: u8) -> Self {
        let fuzz = fuzz.min(100) as f32;
        let distance = fuzz / 100.0 * Rgb::MAX_DISTANCE * ADAPTIVE_FUZZ_MULTIPLIER;
        let hue_tolerance = fuzz * HUE_TOLERANCE_PER_FUZZ;
        Self {
            distance,
            hue_tolerance,
            edge_distance: distance * EDGE_FUZZ_MULTIPLIER,
            edge_hue_tolerance: hue_tolerance * EDGE_FUZZ_MULTIPLIER,
        }
    }
}

/// Counts gathered while classifying one image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierStats {
    /// Pixels whose alpha was set to zero.
    pub removed: usize,
    /// Edge pixels whose alpha was reduced.
    pub softened: usize,
}

/// Channel-dominance check that keeps skin tones and warm or cool subject
/// colors that happen to sit close to the key in RGB space.
fn confirms_family(px: Rgb, family: KeyFamily) -> bool {
    let (r, g, b) = (px.r as f32, px.g as f32, px.b as f32);
    match family {
        KeyFamily::Magenta => g < 150.0 && r >= g * 1.3 && b >= g * 1.3 && r + b > g * 3.0,
        KeyFamily::Green => {
            r < 150.0 && b < 150.0 && g >= r * 1.3 && g >= b * 1.3 && g * 2.0 > (r + b) * 1.5
        }
        KeyFamily::Other => true,
    }
}

fn hsl_matches(px: Rgb, family: KeyFamily, tolerance: f32) -> bool {
    match family {
        KeyFamily::Green => is_green_background(px.r, px.g, px.b, tolerance),
        KeyFamily::Magenta => is_magenta_background(px.r, px.g, px.b, tolerance),
        KeyFamily::Other => false,
    }
}

/// Whether a pixel belongs to the background.
fn is_background(px: Rgb, bg: &DetectedBackground, limits: &Thresholds) -> bool {
    let family = bg.family();
    if px.distance(bg.color) <= limits.distance && confirms_family(px, family) {
        return true;
    }
    hsl_matches(px, family, limits.hue_tolerance)
}

/// Looser test used on anti-aliased edge pixels.
fn is_chroma_like_edge(px: Rgb, bg: &DetectedBackground, limits: &Thresholds) -> bool {
    let family = bg.family();
    if hsl_matches(px, family, limits.edge_hue_tolerance) {
        return true;
    }
    px.distance(bg.color) <= limits.edge_distance && confirms_family(px, family)
}

/// Walks a buffer in fixed-size chunks.
///
/// The background is detected once in [`ChunkedClassifier::new`] and passed
/// by reference to every chunk.
pub struct ChunkedClassifier {
    buffer: PixelBuffer,
    background: DetectedBackground,
    limits: Thresholds,
    chunk_pixels: usize,
    cursor: usize,
    stats: ClassifierStats,
}

impl ChunkedClassifier {
    /// Prepare a buffer for classification. Fails when the buffer has no
    /// pixels to work on.
    pub fn new(buffer: PixelBuffer, params: &ChromaKeyParams) -> Result<Self> {
        if buffer.is_empty() {
            return Err(SpriteKeyError::ContextUnavailable(format!(
                "cannot key a {}x{} image",
                buffer.width(),
                buffer.height()
            )));
        }
        let background = detect_background(&buffer, params.key);
        Ok(Self {
            buffer,
            background,
            limits: Thresholds::from_fuzz(params.fuzz),
            chunk_pixels: CHUNK_PIXELS,
            cursor: 0,
            stats: ClassifierStats::default(),
        })
    }

    /// Override the chunk size (minimum one pixel).
    pub fn with_chunk_pixels(mut self, chunk_pixels: usize) -> Self {
        self.chunk_pixels = chunk_pixels.max(1);
        self
    }

    pub fn background(&self) -> &DetectedBackground {
        &self.background
    }

    pub fn stats(&self) -> ClassifierStats {
        self.stats
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.buffer.pixel_count()
    }

    /// Classify the next chunk and return the progress percentage, or
    /// `None` when every pixel has been visited.
    pub fn process_chunk(&mut self) -> Option<u8> {
        let total = self.buffer.pixel_count();
        if self.cursor >= total {
            return None;
        }
        let end = (self.cursor + self.chunk_pixels).min(total);
        let bytes = &mut self.buffer.as_bytes_mut()
            [self.cursor * BYTES_PER_PIXEL..end * BYTES_PER_PIXEL];

        let bg = &self.background;
        let limits = &self.limits;
        let mut removed = 0;
        for px in bytes.chunks_exact_mut(BYTES_PER_PIXEL) {
            if px[3] == 0 {
                continue;
            }
            if is_background(Rgb::new(px[0], px[1], px[2]), bg, limits) {
                px[3] = 0;
                removed += 1;
            }
        }

        let mut softened = 0;
        for px in bytes.chunks_exact_mut(BYTES_PER_PIXEL) {
            if px[3] == 0 || px[3] == 255 {
                continue;
            }
            if is_chroma_like_edge(Rgb::new(px[0], px[1], px[2]), bg, limits) {
                px[3] = (px[3] as f32 * EDGE_ALPHA_RETAIN).round() as u8;
                softened += 1;
            }
        }

        self.stats.removed += removed;
        self.stats.softened += softened;
        self.cursor = end;

        let percent = ((end * BYTES_PER_PIXEL) as f64 / (total * BYTES_PER_PIXEL) as f64 * 100.0)
            .round() as u8;
        debug!(end, total, removed, softened, percent, "chunk classified");
        Some(percent)
    }

    /// Hand the buffer back. Only meaningful once [`is_done`](Self::is_done).
    pub fn finish(self) -> PixelBuffer {
        self.buffer
    }
}

/// Run every chunk of a job, reporting progress after each one and
/// calling `between_chunks` before the next. Ends with a final 100.
pub(crate) fn run_chunks(
    job: ChromaKeyJob,
    progress: &mut dyn FnMut(u8),
    mut between_chunks: impl FnMut(),
) -> Result<(PixelBuffer, ClassifierStats)> {
    let mut classifier = ChunkedClassifier::new(job.buffer, &job.params)?;
    while let Some(percent) = classifier.process_chunk() {
        progress(percent);
        if !classifier.is_done() {
            between_chunks();
        }
    }
    progress(100);
    let stats = classifier.stats();
    Ok((classifier.finish(), stats))
}
