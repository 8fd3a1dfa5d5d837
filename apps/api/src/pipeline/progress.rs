//! Progress reporting for the screening loop.
//!
//! The sink is called synchronously once per candidate and must be cheap —
//! the pipeline does not await anything beyond its return.

use tracing::info;

/// Receives one `(processed, total)` event per screened candidate,
/// `processed` strictly increasing from 1 to `total`.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, processed: usize, total: usize);
}

/// Sink that logs progress via tracing, throttled to every `every`th
/// candidate plus the final one to keep large-pool runs readable.
pub struct TracingProgress {
    every: usize,
}

impl TracingProgress {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl ProgressSink for TracingProgress {
    fn on_progress(&self, processed: usize, total: usize) {
        if processed % self.every == 0 || processed == total {
            info!("screening candidate {processed} of {total}");
        }
    }
}
