//! State shared by the producer and consumer threads of one run.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::errors::{PipelineError, Result};
use crate::progress::ProgressTracker;

use super::completion::CompletionFlag;
use super::config::PipelineConfig;
use super::pool::RecyclePool;
use super::queue::WorkQueue;
use super::stats::PipelineStats;

/// Everything the pipeline threads share, borrowed by each of them for the
/// duration of a scoped run.
pub struct PipelineState {
    /// Free record slots
    pub pool: RecyclePool,
    /// Full batches waiting for a consumer
    pub queue: WorkQueue,
    /// End-of-input signal
    pub done: CompletionFlag,
    /// Counters
    pub stats: PipelineStats,
    /// Periodic progress logging
    pub progress: ProgressTracker,
    error_flag: AtomicBool,
    error: Mutex<Option<PipelineError>>,
}

impl PipelineState {
    /// Build the pool and queue sized for `config`.
    ///
    /// # Errors
    /// Returns an error if `config` is invalid or describes a single-threaded run,
    /// which has no shared state.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let consumers = config.consumer_threads();
        if consumers == 0 {
            return Err(PipelineError::invalid_parameter(
                "threads",
                "shared pipeline state needs at least one consumer thread",
            ));
        }
        Ok(Self {
            pool: RecyclePool::new(config.total_slots()?),
            queue: WorkQueue::new(consumers, config.batch_capacity),
            done: CompletionFlag::new(),
            stats: PipelineStats::new(),
            progress: ProgressTracker::new("Processed").with_interval(config.progress_interval),
            error_flag: AtomicBool::new(false),
            error: Mutex::new(None),
        })
    }

    /// Record an error and signal every thread to stop. Only the first error is kept.
    pub fn set_error(&self, error: PipelineError) {
        self.error_flag.store(true, Ordering::SeqCst);
        let mut guard = self.error.lock();
        if guard.is_none() {
            *guard = Some(error);
        }
    }

    /// Check if the run has been aborted.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error_flag.load(Ordering::Relaxed)
    }

    /// Take the stored error.
    pub fn take_error(&self) -> Option<PipelineError> {
        self.error.lock().take()
    }
}
