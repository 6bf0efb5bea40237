//! SpriteKey Effects - CPU pixel pipelines for generated sprite sheets
//!
//! Provides adaptive chroma-key background removal (with a worker-thread
//! and a cooperative execution path), alpha-weighted frame blending and
//! keyframe sequence interpolation.

pub mod chroma_key;
pub mod frame_interp;
pub mod sequence;

pub use chroma_key::{
    remove_chroma_key, remove_chroma_key_encoded, ChromaKeyExecutor, ChromaKeyJob,
    ChromaKeyParams, CooperativeExecutor, DetectedBackground, ExecutionHost, ParallelExecutor,
    RequestId,
};
pub use frame_interp::{blend_encoded, blend_frames};
pub use sequence::{
    create_looping_animation, generate_smooth_animation, insert_frames_for_fps,
    interpolate_frames, InterpolationOptions, SmoothAnimationOptions,
};
