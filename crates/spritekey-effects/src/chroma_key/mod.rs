//! Adaptive chroma-key background removal.
//!
//! Pipeline per image: sample the corners to find the background color the
//! generator actually painted, then classify the buffer chunk by chunk,
//! zeroing alpha on background pixels and softening anti-aliased edges.
//! The chunk loop runs either on a worker thread or cooperatively on the
//! caller's thread; see [`ExecutionHost`].

mod classifier;
mod executor;
mod sampler;

pub use classifier::{ChunkedClassifier, ClassifierStats, Thresholds};
pub use executor::{
    ChromaKeyExecutor, CooperativeExecutor, ExecutionHost, ParallelExecutor, RequestId,
    WorkerEvent,
};
pub use sampler::{detect_background, DetectedBackground};

use serde::{Deserialize, Serialize};
use spritekey_core::{codec, ChromaKey, PixelBuffer, Result, Rgb};

/// Pixels classified per chunk before progress is reported.
pub const CHUNK_PIXELS: usize = 50_000;

/// Side of the square sampled at each image corner.
pub const CORNER_SAMPLE_SIZE: u32 = 10;

/// Widening of the distance threshold once the real background is known.
pub const ADAPTIVE_FUZZ_MULTIPLIER: f32 = 1.5;

/// Extra widening applied to partially transparent edge pixels.
pub const EDGE_FUZZ_MULTIPLIER: f32 = 1.5;

/// Fraction of alpha kept on a chroma-like edge pixel.
pub const EDGE_ALPHA_RETAIN: f32 = 0.3;

/// Hue tolerance in degrees per percent of fuzz.
pub const HUE_TOLERANCE_PER_FUZZ: f32 = 1.0;

/// Default fuzz percentage.
pub const DEFAULT_FUZZ: u8 = 10;

/// Parameters for one background removal call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaKeyParams {
    /// Background color the generator was asked to paint.
    pub key: Rgb,
    /// Tolerance percentage (0-100).
    pub fuzz: u8,
}

impl Default for ChromaKeyParams {
    fn default() -> Self {
        Self {
            key: ChromaKey::GREEN,
            fuzz: DEFAULT_FUZZ,
        }
    }
}

impl ChromaKeyParams {
    /// Green screen default.
    pub fn green_screen() -> Self {
        Self::default()
    }

    /// Magenta screen default.
    pub fn magenta_screen() -> Self {
        Self {
            key: ChromaKey::MAGENTA,
            ..Default::default()
        }
    }

    pub fn with_fuzz(mut self, fuzz: u8) -> Self {
        self.fuzz = fuzz.min(100);
        self
    }
}

/// A buffer plus the parameters to key it with. The buffer is owned by
/// the job until the call completes.
#[derive(Debug, Clone)]
pub struct ChromaKeyJob {
    pub buffer: PixelBuffer,
    pub params: ChromaKeyParams,
}

impl ChromaKeyJob {
    pub fn new(buffer: PixelBuffer, params: ChromaKeyParams) -> Self {
        Self { buffer, params }
    }
}

/// Remove the background from a decoded buffer.
///
/// Probes for a worker thread per call; callers keying many images should
/// hold one [`ExecutionHost`] instead.
pub fn remove_chroma_key(
    buffer: PixelBuffer,
    params: &ChromaKeyParams,
    on_progress: impl FnMut(u8),
) -> Result<PixelBuffer> {
    ExecutionHost::probe().remove_chroma_key(buffer, params, on_progress)
}

/// Decode, remove the background and re-encode as PNG.
pub fn remove_chroma_key_encoded(
    encoded: &[u8],
    params: &ChromaKeyParams,
    on_progress: impl FnMut(u8),
) -> Result<Vec<u8>> {
    let buffer = codec::decode_image(encoded)?;
    let keyed = remove_chroma_key(buffer, params, on_progress)?;
    codec::encode_png(&keyed)
}
