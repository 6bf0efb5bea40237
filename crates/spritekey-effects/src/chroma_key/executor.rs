//! Execution paths for the chunk loop.
//!
//! [`ParallelExecutor`] runs jobs on a dedicated worker thread and streams
//! progress back over a channel. [`CooperativeExecutor`] runs the same loop
//! on the caller's thread, yielding between chunks. [`ExecutionHost`] picks
//! one by probing for the worker and falls back when the worker fails.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use spritekey_core::{PixelBuffer, Result, SpriteKeyError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::classifier::{run_chunks, ClassifierStats};
use super::{ChromaKeyJob, ChromaKeyParams};

/// Identifies one call routed through the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Runs a chroma-key job to completion, reporting progress in `[0, 100]`.
pub trait ChromaKeyExecutor: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(&self, job: ChromaKeyJob, progress: &mut dyn FnMut(u8)) -> Result<PixelBuffer>;
}

// ── Cooperative ─────────────────────────────────────────────────

/// Runs the chunk loop on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct CooperativeExecutor;

impl ChromaKeyExecutor for CooperativeExecutor {
    fn name(&self) -> &'static str {
        "cooperative"
    }

    fn execute(&self, job: ChromaKeyJob, progress: &mut dyn FnMut(u8)) -> Result<PixelBuffer> {
        let (buffer, stats) = run_chunks(job, progress, thread::yield_now)?;
        debug!(removed = stats.removed, softened = stats.softened, "cooperative job done");
        Ok(buffer)
    }
}

// ── Parallel ────────────────────────────────────────────────────

/// Messages from the worker, each tagged with the request it belongs to.
#[derive(Debug)]
pub enum WorkerEvent {
    Progress { id: RequestId, percent: u8 },
    Completed { id: RequestId, buffer: PixelBuffer },
    /// The job itself failed; the error is final.
    Failed { id: RequestId, error: SpriteKeyError },
    /// The worker panicked while running the job.
    Crashed { id: RequestId, message: String },
}

impl WorkerEvent {
    pub fn id(&self) -> RequestId {
        match self {
            Self::Progress { id, .. }
            | Self::Completed { id, .. }
            | Self::Failed { id, .. }
            | Self::Crashed { id, .. } => *id,
        }
    }
}

struct WorkerRequest {
    id: RequestId,
    job: ChromaKeyJob,
    reply: Sender<WorkerEvent>,
}

/// A long-lived worker thread that serves jobs in arrival order.
pub struct ParallelExecutor {
    requests: Option<Sender<WorkerRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl ParallelExecutor {
    /// Start the worker thread.
    pub fn spawn() -> Result<Self> {
        Self::spawn_with(run_on_worker)
    }

    fn spawn_with(runner: JobRunner) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = thread::Builder::new()
            .name("spritekey-chroma-worker".into())
            .spawn(move || worker_loop(rx, runner))
            .map_err(|e| SpriteKeyError::WorkerUnavailable(e.to_string()))?;
        debug!("chroma worker started");
        Ok(Self {
            requests: Some(tx),
            handle: Some(handle),
        })
    }

    /// Stop accepting jobs and wait for the worker to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("chroma worker exited with a panic");
            }
        }
    }
}

impl Drop for ParallelExecutor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs one job to completion on the worker thread.
type JobRunner = fn(ChromaKeyJob, &mut dyn FnMut(u8)) -> Result<(PixelBuffer, ClassifierStats)>;

fn run_on_worker(
    job: ChromaKeyJob,
    progress: &mut dyn FnMut(u8),
) -> Result<(PixelBuffer, ClassifierStats)> {
    run_chunks(job, progress, || {})
}

fn worker_loop(requests: Receiver<WorkerRequest>, runner: JobRunner) {
    for WorkerRequest { id, job, reply } in requests.iter() {
        let progress_reply = reply.clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut report = |percent: u8| {
                let _ = progress_reply.send(WorkerEvent::Progress { id, percent });
            };
            runner(job, &mut report)
        }));
        let event = match outcome {
            Ok(Ok((buffer, stats))) => {
                debug!(%id, removed = stats.removed, softened = stats.softened, "worker job done");
                WorkerEvent::Completed { id, buffer }
            }
            Ok(Err(error)) => WorkerEvent::Failed { id, error },
            Err(payload) => WorkerEvent::Crashed {
                id,
                message: panic_message(payload.as_ref()),
            },
        };
        // The caller may have given up on this request.
        let _ = reply.send(event);
    }
    debug!("chroma worker stopped");
}

impl ChromaKeyExecutor for ParallelExecutor {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn execute(&self, job: ChromaKeyJob, progress: &mut dyn FnMut(u8)) -> Result<PixelBuffer> {
        let requests = self
            .requests
            .as_ref()
            .ok_or_else(|| SpriteKeyError::WorkerUnavailable("worker shut down".into()))?;

        let id = RequestId::new();
        let (reply, events) = crossbeam_channel::unbounded();
        requests
            .send(WorkerRequest { id, job, reply })
            .map_err(|_| SpriteKeyError::WorkerUnavailable("worker thread has exited".into()))?;

        for event in events.iter() {
            if event.id() != id {
                debug!(expected = %id, got = %event.id(), "dropping event for another request");
                continue;
            }
            match event {
                WorkerEvent::Progress { percent, .. } => progress(percent),
                WorkerEvent::Completed { buffer, .. } => return Ok(buffer),
                WorkerEvent::Failed { error, .. } => return Err(error),
                WorkerEvent::Crashed { message, .. } => {
                    return Err(SpriteKeyError::Worker(message));
                }
            }
        }
        Err(SpriteKeyError::WorkerUnavailable(format!(
            "worker dropped request {id}"
        )))
    }
}

// ── Host ────────────────────────────────────────────────────────

/// Chooses between the worker and the cooperative path.
///
/// The external contract is the same either way: a progress stream that
/// never decreases and ends at 100, then the keyed buffer or an error.
pub struct ExecutionHost {
    primary: Option<Box<dyn ChromaKeyExecutor>>,
    fallback: CooperativeExecutor,
}

impl ExecutionHost {
    /// Use a worker thread when one can be started.
    pub fn probe() -> Self {
        match ParallelExecutor::spawn() {
            Ok(worker) => Self::with_primary(Box::new(worker)),
            Err(e) => {
                warn!(error = %e, "worker unavailable, keying on the calling thread");
                Self::cooperative_only()
            }
        }
    }

    /// Never start a worker.
    pub fn cooperative_only() -> Self {
        Self {
            primary: None,
            fallback: CooperativeExecutor,
        }
    }

    /// Use a custom primary executor with the cooperative fallback.
    pub fn with_primary(primary: Box<dyn ChromaKeyExecutor>) -> Self {
        Self {
            primary: Some(primary),
            fallback: CooperativeExecutor,
        }
    }

    /// Name of the executor tried first.
    pub fn primary_name(&self) -> &'static str {
        self.primary
            .as_ref()
            .map_or(self.fallback.name(), |p| p.name())
    }

    /// Key out the background of `buffer`.
    pub fn remove_chroma_key(
        &self,
        buffer: PixelBuffer,
        params: &ChromaKeyParams,
        mut on_progress: impl FnMut(u8),
    ) -> Result<PixelBuffer> {
        let (width, height) = (buffer.width(), buffer.height());
        let mut last = 0u8;
        let mut report = |percent: u8| {
            last = last.max(percent.min(100));
            on_progress(last);
        };

        let keyed = match &self.primary {
            Some(primary) => {
                let retained = buffer.clone();
                match primary.execute(ChromaKeyJob::new(buffer, *params), &mut report) {
                    Err(e @ (SpriteKeyError::Worker(_) | SpriteKeyError::WorkerUnavailable(_))) => {
                        warn!(
                            executor = primary.name(),
                            error = %e,
                            "parallel keying failed, retrying on the calling thread"
                        );
                        self.fallback
                            .execute(ChromaKeyJob::new(retained, *params), &mut report)?
                    }
                    other => other?,
                }
            }
            None => self
                .fallback
                .execute(ChromaKeyJob::new(buffer, *params), &mut report)?,
        };

        info!(width, height, key = %params.key, fuzz = params.fuzz, "background removed");
        Ok(keyed)
    }

    /// Terminate the worker, if any.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Default for ExecutionHost {
    fn default() -> Self {
        Self::probe()
    }
}
