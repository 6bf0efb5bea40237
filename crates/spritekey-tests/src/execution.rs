//! Integration tests for executor selection, fallback and request routing.

use std::sync::{Arc, Mutex};
use std::thread;

use spritekey_core::{PixelBuffer, Result, Rgb, SpriteKeyError};
use spritekey_effects::{
    ChromaKeyExecutor, ChromaKeyJob, ChromaKeyParams, CooperativeExecutor, ExecutionHost,
};

// ── Helpers ────────────────────────────────────────────────────

/// 300x300 is 90 000 pixels: two chunks.
fn large_sheet(subject: [u8; 4]) -> PixelBuffer {
    let mut buf = PixelBuffer::solid(300, 300, Rgb::new(25, 215, 70), 255);
    for y in 100..200 {
        for x in 100..200 {
            buf.set_pixel(x, y, subject);
        }
    }
    buf
}

fn cooperative_reference(buffer: PixelBuffer, params: ChromaKeyParams) -> PixelBuffer {
    CooperativeExecutor
        .execute(ChromaKeyJob::new(buffer, params), &mut |_| {})
        .unwrap()
}

fn assert_progress_contract(seen: &[u8]) {
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {seen:?}");
    assert_eq!(seen.last(), Some(&100));
}

/// Reports some progress, then behaves like a worker that died mid-job.
struct DyingWorker {
    reported: u8,
}

impl ChromaKeyExecutor for DyingWorker {
    fn name(&self) -> &'static str {
        "dying"
    }

    fn execute(&self, _job: ChromaKeyJob, progress: &mut dyn FnMut(u8)) -> Result<PixelBuffer> {
        progress(self.reported);
        Err(SpriteKeyError::WorkerUnavailable("worker thread has exited".into()))
    }
}

// ── Selection ──────────────────────────────────────────────────

#[test]
fn probe_prefers_the_worker_thread() {
    let host = ExecutionHost::probe();
    assert_eq!(host.primary_name(), "parallel");
    host.shutdown();

    assert_eq!(ExecutionHost::cooperative_only().primary_name(), "cooperative");
}

#[test]
fn both_paths_produce_identical_output_and_progress_contract() {
    let params = ChromaKeyParams::green_screen();
    let sheet = large_sheet([180, 60, 30, 255]);

    let mut parallel_seen = Vec::new();
    let host = ExecutionHost::probe();
    let parallel = host
        .remove_chroma_key(sheet.clone(), &params, |p| parallel_seen.push(p))
        .unwrap();
    host.shutdown();

    let mut cooperative_seen = Vec::new();
    let cooperative = ExecutionHost::cooperative_only()
        .remove_chroma_key(sheet, &params, |p| cooperative_seen.push(p))
        .unwrap();

    assert_eq!(parallel, cooperative);
    assert_progress_contract(&parallel_seen);
    assert_progress_contract(&cooperative_seen);
    assert_eq!(cooperative_seen, vec![56, 100, 100]);
}

// ── Fallback ───────────────────────────────────────────────────

#[test]
fn dead_worker_falls_back_to_cooperative() {
    let params = ChromaKeyParams::green_screen();
    let sheet = large_sheet([180, 60, 30, 255]);
    let expected = cooperative_reference(sheet.clone(), params);

    let host = ExecutionHost::with_primary(Box::new(DyingWorker { reported: 70 }));
    let mut seen = Vec::new();
    let keyed = host
        .remove_chroma_key(sheet, &params, |p| seen.push(p))
        .unwrap();

    assert_eq!(keyed, expected);
    assert_eq!(seen.first(), Some(&70));
    // The cooperative rerun starts over at 56; the caller never sees it drop.
    assert!(seen.iter().all(|&p| p >= 70));
    assert_progress_contract(&seen);
}

#[test]
fn job_errors_are_not_retried() {
    let host = ExecutionHost::probe();
    let err = host
        .remove_chroma_key(PixelBuffer::new(0, 0), &ChromaKeyParams::default(), |_| {})
        .unwrap_err();
    assert!(matches!(err, SpriteKeyError::ContextUnavailable(_)));
}

// ── Routing ────────────────────────────────────────────────────

#[test]
fn concurrent_callers_receive_their_own_results() {
    let host = Arc::new(ExecutionHost::probe());
    let params = ChromaKeyParams::green_screen();
    let subjects: [[u8; 4]; 4] = [
        [200, 40, 40, 255],
        [40, 40, 200, 255],
        [220, 200, 60, 255],
        [120, 60, 160, 255],
    ];
    let failures = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = subjects
        .into_iter()
        .map(|subject| {
            let host = Arc::clone(&host);
            let failures = Arc::clone(&failures);
            thread::spawn(move || {
                let sheet = large_sheet(subject);
                let expected = cooperative_reference(sheet.clone(), params);
                let mut seen = Vec::new();
                let keyed = host
                    .remove_chroma_key(sheet, &params, |p| seen.push(p))
                    .unwrap();
                if keyed != expected || keyed.pixel(150, 150) != Some(subject) {
                    failures.lock().unwrap().push(subject);
                }
                assert_progress_contract(&seen);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(failures.lock().unwrap().is_empty());
}
