//! Run configuration for the ingestion pipeline.

use clap::ValueEnum;

use crate::errors::Result;
use crate::validation::{checked_product, validate_at_least, validate_positive};

use super::spin::SpinStrategy;

/// Default number of records per batch.
pub const DEFAULT_BATCH_CAPACITY: usize = 32;
/// Default number of batches' worth of slots per consumer in the recycle pool.
pub const DEFAULT_REPLICATION: usize = 2;
/// Default number of records between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;

/// What the producer does when the source reports a malformed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DecodeErrorPolicy {
    /// Stop the run with the decode error.
    #[default]
    #[value(name = "fail")]
    Fail,

    /// Log and skip records the source can resume after; other errors still stop the run.
    #[value(name = "skip")]
    Skip,
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Total threads, including the producer (calling) thread
    pub num_threads: usize,
    /// Records per batch
    pub batch_capacity: usize,
    /// Recycle pool size as a multiple of `consumers × batch_capacity`; at least 2
    pub replication: usize,
    /// How idle threads wait
    pub spin: SpinStrategy,
    /// Reaction to decode errors
    pub decode_errors: DecodeErrorPolicy,
    /// Records between progress log lines (0 disables)
    pub progress_interval: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PipelineConfig {
    /// Create a configuration with the given total thread count and default tuning.
    #[must_use]
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            replication: DEFAULT_REPLICATION,
            spin: SpinStrategy::default(),
            decode_errors: DecodeErrorPolicy::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Set the batch capacity.
    #[must_use]
    pub fn with_batch_capacity(mut self, batch_capacity: usize) -> Self {
        self.batch_capacity = batch_capacity;
        self
    }

    /// Set the recycle pool replication factor.
    #[must_use]
    pub fn with_replication(mut self, replication: usize) -> Self {
        self.replication = replication;
        self
    }

    /// Set the spin strategy.
    #[must_use]
    pub fn with_spin(mut self, spin: SpinStrategy) -> Self {
        self.spin = spin;
        self
    }

    /// Set the decode error policy.
    #[must_use]
    pub fn with_decode_errors(mut self, policy: DecodeErrorPolicy) -> Self {
        self.decode_errors = policy;
        self
    }

    /// Set the progress logging interval.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Number of consumer threads spawned next to the producer.
    #[must_use]
    pub fn consumer_threads(&self) -> usize {
        self.num_threads.saturating_sub(1)
    }

    /// Total number of record slots the recycle pool creates; 0 when running single-threaded.
    ///
    /// # Errors
    /// Returns an error if the product overflows.
    pub fn total_slots(&self) -> Result<usize> {
        checked_product(&[self.consumer_threads(), self.batch_capacity, self.replication], "replication")
    }

    /// Check every parameter, before any thread starts.
    ///
    /// # Errors
    /// Returns [`crate::errors::PipelineError::InvalidParameter`] for the first bad value.
    pub fn validate(&self) -> Result<()> {
        validate_positive(self.num_threads, "threads")?;
        validate_positive(self.batch_capacity, "batch-size")?;
        validate_at_least(self.replication, 2, "replication")?;
        self.total_slots()?;
        Ok(())
    }
}
