//! Run counters for a pipeline.
//!
//! Every counter is a relaxed atomic; they are instrumentation only and never
//! drive control flow.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use log::info;

use crate::logging::{format_count, format_percent};

/// Live counters shared by the producer and consumers.
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// Records decoded by the producer
    pub records_decoded: AtomicU64,
    /// Records the producer processed itself while the queue was full
    pub producer_helped: AtomicU64,
    /// Records the producer processed itself from the final partial batch
    pub producer_tail: AtomicU64,
    /// Records the producer processed from batches it drained from the queue
    pub producer_drained: AtomicU64,
    /// Records processed inline by a single-threaded run
    pub producer_direct: AtomicU64,
    /// Records processed by consumer threads
    pub consumer_processed: AtomicU64,
    /// Batches accepted by the work queue
    pub batches_submitted: AtomicU64,
    /// Batches the producer drained back out of the queue
    pub batches_drained_by_producer: AtomicU64,
    /// Submit attempts rejected because the queue was full
    pub submit_failures: AtomicU64,
    /// Times the producer found the recycle pool empty
    pub pool_waits: AtomicU64,
    /// Resumable decode errors skipped under the skip policy
    pub decode_errors_skipped: AtomicU64,
}

impl PipelineStats {
    /// Fresh counters, all zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            records_decoded: load(&self.records_decoded),
            producer_helped: load(&self.producer_helped),
            producer_tail: load(&self.producer_tail),
            producer_drained: load(&self.producer_drained),
            producer_direct: load(&self.producer_direct),
            consumer_processed: load(&self.consumer_processed),
            batches_submitted: load(&self.batches_submitted),
            batches_drained_by_producer: load(&self.batches_drained_by_producer),
            submit_failures: load(&self.submit_failures),
            pool_waits: load(&self.pool_waits),
            decode_errors_skipped: load(&self.decode_errors_skipped),
        }
    }

    /// Log the summary at info level, one line per entry.
    pub fn log_summary(&self) {
        for line in self.snapshot().format_summary().lines() {
            info!("{line}");
        }
    }
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// See [`PipelineStats::records_decoded`]
    pub records_decoded: u64,
    /// See [`PipelineStats::producer_helped`]
    pub producer_helped: u64,
    /// See [`PipelineStats::producer_tail`]
    pub producer_tail: u64,
    /// See [`PipelineStats::producer_drained`]
    pub producer_drained: u64,
    /// See [`PipelineStats::producer_direct`]
    pub producer_direct: u64,
    /// See [`PipelineStats::consumer_processed`]
    pub consumer_processed: u64,
    /// See [`PipelineStats::batches_submitted`]
    pub batches_submitted: u64,
    /// See [`PipelineStats::batches_drained_by_producer`]
    pub batches_drained_by_producer: u64,
    /// See [`PipelineStats::submit_failures`]
    pub submit_failures: u64,
    /// See [`PipelineStats::pool_waits`]
    pub pool_waits: u64,
    /// See [`PipelineStats::decode_errors_skipped`]
    pub decode_errors_skipped: u64,
}

impl StatsSnapshot {
    /// Records processed on the producer thread, by any route.
    #[must_use]
    pub fn producer_processed(&self) -> u64 {
        self.producer_helped + self.producer_tail + self.producer_drained + self.producer_direct
    }

    /// Records processed on any thread.
    #[must_use]
    pub fn records_processed(&self) -> u64 {
        self.producer_processed() + self.consumer_processed
    }

    /// Multi-line human-readable summary.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn format_summary(&self) -> String {
        let share = |n: u64| {
            if self.records_processed() == 0 {
                format_percent(0.0, 1)
            } else {
                format_percent(n as f64 / self.records_processed() as f64, 1)
            }
        };

        let mut s = String::new();
        let _ = writeln!(s, "Pipeline Statistics:");
        let _ = writeln!(s, "  {:<24} {:>14}", "Records decoded", format_count(self.records_decoded));
        let _ = writeln!(
            s,
            "  {:<24} {:>14} ({})",
            "Processed by consumers",
            format_count(self.consumer_processed),
            share(self.consumer_processed)
        );
        let _ = writeln!(
            s,
            "  {:<24} {:>14} ({})",
            "Processed by producer",
            format_count(self.producer_processed()),
            share(self.producer_processed())
        );
        let _ = writeln!(s, "    {:<22} {:>14}", "helping", format_count(self.producer_helped));
        let _ = writeln!(s, "    {:<22} {:>14}", "drained batches", format_count(self.producer_drained));
        let _ = writeln!(s, "    {:<22} {:>14}", "final partial batch", format_count(self.producer_tail));
        if self.producer_direct > 0 {
            let _ = writeln!(s, "    {:<22} {:>14}", "single-threaded", format_count(self.producer_direct));
        }
        let _ = writeln!(s, "  {:<24} {:>14}", "Batches submitted", format_count(self.batches_submitted));
        let _ = writeln!(s, "  {:<24} {:>14}", "Queue-full submits", format_count(self.submit_failures));
        let _ = writeln!(s, "  {:<24} {:>14}", "Recycle pool waits", format_count(self.pool_waits));
        if self.decode_errors_skipped > 0 {
            let _ = writeln!(s, "  {:<24} {:>14}", "Decode errors skipped", format_count(self.decode_errors_skipped));
        }
        s
    }
}
