//! Integration test crate for SpriteKey.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every spritekey library crate to verify they work together.

#[cfg(test)]
mod chroma;

#[cfg(test)]
mod execution;

#[cfg(test)]
mod interpolation;
