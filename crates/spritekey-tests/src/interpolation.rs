//! Integration tests for keyframe smoothing.
//!
//! Keyframes are decoded through the codec, keyed, and expanded into
//! animations the way the command-line tool does it.

use std::sync::Arc;

use spritekey_core::{codec, EasingCurve, LoopMode, PixelBuffer, Rgb, SharedPixelBuffer};
use spritekey_effects::{
    blend_encoded, create_looping_animation, generate_smooth_animation, interpolate_frames,
    remove_chroma_key, ChromaKeyParams, InterpolationOptions, SmoothAnimationOptions,
};

// ── Helpers ────────────────────────────────────────────────────

fn decoded_keyframes(colors: &[Rgb]) -> Vec<SharedPixelBuffer> {
    colors
        .iter()
        .map(|&c| {
            let png = codec::encode_png(&PixelBuffer::solid(6, 6, c, 255)).unwrap();
            codec::decode_image(&png).unwrap().into_shared()
        })
        .collect()
}

fn four_keyframes() -> Vec<SharedPixelBuffer> {
    decoded_keyframes(&[
        Rgb::new(200, 0, 0),
        Rgb::new(0, 200, 0),
        Rgb::new(0, 0, 200),
        Rgb::new(200, 200, 0),
    ])
}

// ── Sequence shape ─────────────────────────────────────────────

#[test]
fn open_and_closed_sequence_lengths() {
    let frames = decoded_keyframes(&[Rgb::BLACK, Rgb::WHITE, Rgb::new(90, 90, 90)]);
    let open = InterpolationOptions {
        insert_frames: 2,
        easing: EasingCurve::EaseInOut,
        smooth_loop: false,
    };
    assert_eq!(interpolate_frames(&frames, &open).len(), 7);

    let closed = InterpolationOptions {
        smooth_loop: true,
        ..open
    };
    let out = interpolate_frames(&frames, &closed);
    assert_eq!(out.len(), 9);
    // The wraparound segment blends the last keyframe back towards the first.
    assert!(Arc::ptr_eq(&out[6], &frames[2]));
    assert!(out[7].pixel(0, 0).unwrap()[0] < 90);
}

#[test]
fn pingpong_order() {
    let frames = four_keyframes();
    let out = create_looping_animation(&frames, LoopMode::PingPong);
    let expected = [0, 1, 2, 3, 2, 1];
    assert_eq!(out.len(), expected.len());
    for (got, &idx) in out.iter().zip(expected.iter()) {
        assert!(Arc::ptr_eq(got, &frames[idx]));
    }
}

#[test]
fn degenerate_inputs_are_returned_unchanged() {
    let single = decoded_keyframes(&[Rgb::WHITE]);
    let out = generate_smooth_animation(&single, &SmoothAnimationOptions::default());
    assert_eq!(out.len(), 1);
    assert!(Arc::ptr_eq(&out[0], &single[0]));

    let frames = four_keyframes();
    let none = InterpolationOptions {
        insert_frames: 0,
        ..Default::default()
    };
    let out = interpolate_frames(&frames, &none);
    assert_eq!(out.len(), frames.len());
    assert!(out.iter().zip(&frames).all(|(a, b)| Arc::ptr_eq(a, b)));
}

#[test]
fn target_fps_drives_in_between_count() {
    let frames = four_keyframes();
    let opts = SmoothAnimationOptions {
        target_fps: Some(24.0),
        original_fps: 12.0,
        loop_mode: LoopMode::Loop,
        ..Default::default()
    };
    // One in-between per pair, four pairs including the wraparound.
    assert_eq!(generate_smooth_animation(&frames, &opts).len(), 8);
}

// ── Blending ───────────────────────────────────────────────────

#[test]
fn encoded_blend_endpoints_match_sources() {
    let a = PixelBuffer::solid(5, 3, Rgb::new(10, 80, 160), 255);
    let b = PixelBuffer::solid(5, 3, Rgb::new(250, 120, 0), 255);
    let a_png = codec::encode_png(&a).unwrap();
    let b_png = codec::encode_png(&b).unwrap();

    for easing in EasingCurve::ALL {
        let start = blend_encoded(&a_png, &b_png, 0.0, easing).unwrap();
        let end = blend_encoded(&a_png, &b_png, 1.0, easing).unwrap();
        let start = codec::decode_image(&start).unwrap();
        let end = codec::decode_image(&end).unwrap();
        assert_eq!(start, a);
        assert_eq!(end, b);
    }
}

#[test]
fn keyed_background_stays_transparent_in_between() {
    let params = ChromaKeyParams::magenta_screen();
    let keyframes: Vec<SharedPixelBuffer> = [4u32, 10]
        .into_iter()
        .map(|offset| {
            let mut sheet = PixelBuffer::solid(24, 24, Rgb::new(250, 10, 245), 255);
            for y in 8..16 {
                for x in offset..offset + 8 {
                    sheet.set_pixel(x, y, [30, 160, 60, 255]);
                }
            }
            remove_chroma_key(sheet, &params, |_| {}).unwrap().into_shared()
        })
        .collect();

    let out = interpolate_frames(&keyframes, &InterpolationOptions::default());
    assert_eq!(out.len(), 4);
    for frame in &out {
        // Corners were background in both keyframes.
        assert_eq!(frame.pixel(0, 0).unwrap()[3], 0);
        assert_eq!(frame.pixel(23, 23).unwrap()[3], 0);
        // Overlap of both subjects keeps its color at full opacity.
        assert_eq!(frame.pixel(11, 12), Some([30, 160, 60, 255]));
    }
}
