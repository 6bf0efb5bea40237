//! Integration tests for background removal through the codec boundary.
//!
//! Exercises spritekey-core codecs, spritekey-color classifiers and the
//! spritekey-effects chroma-key pipeline together.

use spritekey_color::{is_green_background, rgb_to_hsl};
use spritekey_core::{codec, ChromaKey, PixelBuffer, Rgb, SpriteKeyError};
use spritekey_effects::{remove_chroma_key, remove_chroma_key_encoded, ChromaKeyParams};

// ── Helpers ────────────────────────────────────────────────────

const SUBJECT: [u8; 4] = [200, 40, 40, 255];

/// A sheet painted `background` with an opaque subject square in the middle.
fn sprite_sheet(size: u32, background: Rgb) -> PixelBuffer {
    let mut buf = PixelBuffer::solid(size, size, background, 255);
    let (lo, hi) = (size / 4, size * 3 / 4);
    for y in lo..hi {
        for x in lo..hi {
            buf.set_pixel(x, y, SUBJECT);
        }
    }
    buf
}

fn key_png(buffer: &PixelBuffer, params: &ChromaKeyParams) -> PixelBuffer {
    let png = codec::encode_png(buffer).unwrap();
    let keyed = remove_chroma_key_encoded(&png, params, |_| {}).unwrap();
    codec::decode_image(&keyed).unwrap()
}

// ── Encoded round trip ─────────────────────────────────────────

#[test]
fn off_key_green_background_is_removed() {
    // Generator asked for #00FF00 but painted #14D23C.
    let sheet = sprite_sheet(64, Rgb::new(20, 210, 60));
    let keyed = key_png(&sheet, &ChromaKeyParams::green_screen());

    assert_eq!((keyed.width(), keyed.height()), (64, 64));
    for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63), (5, 40)] {
        assert_eq!(keyed.pixel(x, y).unwrap()[3], 0, "background at ({x}, {y})");
    }
    assert_eq!(keyed.pixel(32, 32), Some(SUBJECT));
    assert_eq!(keyed.pixel(16, 16), Some(SUBJECT));
}

#[test]
fn off_key_magenta_background_is_removed() {
    let mut sheet = sprite_sheet(48, Rgb::new(240, 20, 230));
    // A blue detail inside the subject must survive.
    sheet.set_pixel(24, 24, [30, 120, 200, 255]);
    let keyed = key_png(&sheet, &ChromaKeyParams::magenta_screen());

    assert_eq!(keyed.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(keyed.pixel(47, 47).unwrap()[3], 0);
    assert_eq!(keyed.pixel(24, 24), Some([30, 120, 200, 255]));
    assert_eq!(keyed.pixel(20, 20), Some(SUBJECT));
}

#[test]
fn keying_twice_changes_nothing() {
    let sheet = sprite_sheet(40, Rgb::new(10, 220, 40));
    let params = ChromaKeyParams::green_screen();
    let once = key_png(&sheet, &params);
    let twice = key_png(&once, &params);
    assert_eq!(once, twice);
}

#[test]
fn alpha_never_increases() {
    let mut sheet = sprite_sheet(32, Rgb::new(0, 230, 30));
    sheet.set_pixel(3, 20, [40, 200, 40, 128]);
    sheet.set_pixel(20, 3, [250, 250, 250, 90]);
    let keyed = remove_chroma_key(sheet.clone(), &ChromaKeyParams::green_screen(), |_| {}).unwrap();

    for (before, after) in sheet
        .as_bytes()
        .chunks_exact(4)
        .zip(keyed.as_bytes().chunks_exact(4))
    {
        assert!(after[3] <= before[3]);
        assert_eq!(&before[..3], &after[..3]);
    }
}

#[test]
fn hex_key_outside_both_families_uses_distance() {
    let key = ChromaKey::parse("#0000FF").unwrap();
    let sheet = sprite_sheet(32, key);
    let keyed = key_png(&sheet, &ChromaKeyParams { key, fuzz: 10 });
    assert_eq!(keyed.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(keyed.pixel(16, 16), Some(SUBJECT));
}

#[test]
fn undecodable_input_is_a_decode_error() {
    let params = ChromaKeyParams::default();
    let err = remove_chroma_key_encoded(b"definitely not a png", &params, |_| {}).unwrap_err();
    assert!(matches!(err, SpriteKeyError::Decode(_)));
}

#[test]
fn empty_buffer_is_context_unavailable() {
    let err = remove_chroma_key(PixelBuffer::new(0, 0), &ChromaKeyParams::default(), |_| {})
        .unwrap_err();
    assert!(matches!(err, SpriteKeyError::ContextUnavailable(_)));
}

// ── Classifier boundary ────────────────────────────────────────

#[test]
fn hue_boundary_for_green_classifier() {
    let hsl = rgb_to_hsl(20, 200, 83);
    assert!((hsl.h - 141.0).abs() < 1.0);
    assert!(hsl.s > 0.8);
    assert!(is_green_background(20, 200, 83, 10.0));

    // Green no longer dominates: g = r * 1.1.
    assert!(!is_green_background(20, 22, 83, 10.0));
}
