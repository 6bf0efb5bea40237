//! SpriteKey Core - Foundation types for sticker and sprite processing
//!
//! This crate provides the fundamental types used throughout SpriteKey:
//! - RGBA pixel buffers
//! - RGB colors and the supported chroma keys
//! - Easing curves and loop modes for animation
//! - Raster codec boundary (decode once at entry, encode once at exit)

pub mod codec;
pub mod color;
pub mod easing;
pub mod error;
pub mod frame;

pub use codec::{decode_image, encode_png};
pub use color::{ChromaKey, KeyFamily, Rgb};
pub use easing::{EasingCurve, LoopMode};
pub use error::{Result, SpriteKeyError};
pub use frame::{PixelBuffer, SharedPixelBuffer};
