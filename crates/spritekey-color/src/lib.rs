//! SpriteKey Color - HSL conversion and chroma background classifiers.

pub mod classify;
pub mod hsl;

pub use classify::{is_green_background, is_magenta_background, key_family};
pub use hsl::{rgb_to_hsl, Hsl};
