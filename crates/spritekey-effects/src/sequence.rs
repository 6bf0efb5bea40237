//! Keyframe sequence smoothing: in-between generation, FPS matching and
//! loop construction.

use serde::{Deserialize, Serialize};
use spritekey_core::{EasingCurve, LoopMode, SharedPixelBuffer};
use tracing::{debug, warn};

use crate::frame_interp::blend_frames;

/// Default source frame rate assumed for generated keyframes.
pub const DEFAULT_ORIGINAL_FPS: f32 = 12.0;

/// Default number of in-betweens per keyframe pair.
pub const DEFAULT_INSERT_FRAMES: usize = 2;

/// Upper bound on in-betweens per keyframe pair.
pub const MAX_INSERT_FRAMES: usize = 120;

/// Options for [`interpolate_frames`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationOptions {
    /// Synthetic frames inserted between each keyframe pair.
    pub insert_frames: usize,
    pub easing: EasingCurve,
    /// Also interpolate from the last keyframe back to the first.
    pub smooth_loop: bool,
}

impl Default for InterpolationOptions {
    fn default() -> Self {
        Self {
            insert_frames: DEFAULT_INSERT_FRAMES,
            easing: EasingCurve::default(),
            smooth_loop: false,
        }
    }
}

/// Options for [`generate_smooth_animation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothAnimationOptions {
    pub interpolation_frames: usize,
    pub easing: EasingCurve,
    pub loop_mode: LoopMode,
    /// When set, overrides `interpolation_frames` from the FPS ratio.
    pub target_fps: Option<f32>,
    pub original_fps: f32,
}

impl Default for SmoothAnimationOptions {
    fn default() -> Self {
        Self {
            interpolation_frames: DEFAULT_INSERT_FRAMES,
            easing: EasingCurve::default(),
            loop_mode: LoopMode::default(),
            target_fps: None,
            original_fps: DEFAULT_ORIGINAL_FPS,
        }
    }
}

/// In-betweens needed to lift `original_fps` to `target_fps`.
///
/// Always in `1..=MAX_INSERT_FRAMES`.
pub fn insert_frames_for_fps(target_fps: f32, original_fps: f32) -> usize {
    if original_fps <= 0.0 || !original_fps.is_finite() || !target_fps.is_finite() {
        return 1;
    }
    let ratio = (target_fps / original_fps).round();
    if ratio <= 2.0 {
        1
    } else if ratio > (MAX_INSERT_FRAMES + 1) as f32 {
        MAX_INSERT_FRAMES
    } else {
        ratio as usize - 1
    }
}

/// Insert synthetic frames between consecutive keyframes.
///
/// Keyframes are returned in order, each followed by its in-betweens at
/// `t = k / (n + 1)`, with `n` capped at [`MAX_INSERT_FRAMES`]. A segment
/// whose blend fails is logged and omitted; the following keyframe is
/// still emitted.
pub fn interpolate_frames(
    frames: &[SharedPixelBuffer],
    options: &InterpolationOptions,
) -> Vec<SharedPixelBuffer> {
    if frames.len() < 2 || options.insert_frames == 0 {
        return frames.to_vec();
    }
    let n = options.insert_frames.min(MAX_INSERT_FRAMES);
    if n < options.insert_frames {
        warn!(
            requested = options.insert_frames,
            used = n,
            "too many in-betweens requested, capping"
        );
    }

    let pairs = if options.smooth_loop {
        frames.len()
    } else {
        frames.len() - 1
    };
    let mut out = Vec::with_capacity(frames.len().saturating_add(pairs.saturating_mul(n)));

    for (i, keyframe) in frames.iter().enumerate() {
        out.push(keyframe.clone());
        if i >= pairs {
            continue;
        }
        let next = &frames[(i + 1) % frames.len()];
        match blend_segment(keyframe, next, n, options.easing) {
            Ok(in_betweens) => out.extend(in_betweens),
            Err(e) => warn!(segment = i, error = %e, "interpolation failed, skipping segment"),
        }
    }

    debug!(
        keyframes = frames.len(),
        output = out.len(),
        insert = n,
        "interpolated sequence"
    );
    out
}

fn blend_segment(
    a: &SharedPixelBuffer,
    b: &SharedPixelBuffer,
    n: usize,
    easing: EasingCurve,
) -> spritekey_core::Result<Vec<SharedPixelBuffer>> {
    (1..=n)
        .map(|k| {
            let t = k as f32 / (n + 1) as f32;
            blend_frames(a, b, t, easing).map(|frame| frame.into_shared())
        })
        .collect()
}

/// Arrange frames for playback according to `mode`.
///
/// `PingPong` appends the interior frames in reverse so the first and last
/// frames are not shown twice in a row when the sequence repeats.
pub fn create_looping_animation(
    frames: &[SharedPixelBuffer],
    mode: LoopMode,
) -> Vec<SharedPixelBuffer> {
    match mode {
        LoopMode::Loop | LoopMode::None => frames.to_vec(),
        LoopMode::PingPong => {
            let mut out = frames.to_vec();
            if frames.len() > 2 {
                out.extend(frames[1..frames.len() - 1].iter().rev().cloned());
            }
            out
        }
    }
}

/// Interpolate keyframes and arrange them for the requested loop mode.
pub fn generate_smooth_animation(
    keyframes: &[SharedPixelBuffer],
    options: &SmoothAnimationOptions,
) -> Vec<SharedPixelBuffer> {
    let insert_frames = match options.target_fps {
        Some(target) => insert_frames_for_fps(target, options.original_fps),
        None => options.interpolation_frames,
    };

    let interpolated = interpolate_frames(
        keyframes,
        &InterpolationOptions {
            insert_frames,
            easing: options.easing,
            smooth_loop: options.loop_mode == LoopMode::Loop,
        },
    );
    create_looping_animation(&interpolated, options.loop_mode)
}
