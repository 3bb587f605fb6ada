//! Periodic progress logging shared by pipeline threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::info;

use crate::logging::{format_count, format_rate};

/// Thread-safe counter that logs each time the total crosses a multiple of its interval.
///
/// Any number of threads may add to the same tracker; every boundary is logged
/// exactly once, by whichever thread's addition crossed it.
///
/// ```
/// use fqpipe_lib::progress::ProgressTracker;
///
/// let tracker = ProgressTracker::new("Processed").with_interval(100);
/// for _ in 0..250 {
///     tracker.record(1); // logs at 100 and 200
/// }
/// tracker.log_final(); // logs "Processed 250 records (complete)"
/// assert_eq!(tracker.count(), 250);
/// ```
pub struct ProgressTracker {
    interval: u64,
    message: String,
    count: AtomicU64,
    started: Instant,
}

impl ProgressTracker {
    /// Create a tracker with the default interval of 1,000,000 records.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            interval: 1_000_000,
            message: message.into(),
            count: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Set the logging interval. An interval of 0 disables periodic logging.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }

    /// Add `additional` records and log every interval boundary crossed.
    ///
    /// Returns `true` if the new total lands exactly on a boundary.
    pub fn record(&self, additional: u64) -> bool {
        if self.interval == 0 {
            self.count.fetch_add(additional, Ordering::Relaxed);
            return false;
        }
        if additional == 0 {
            let count = self.count.load(Ordering::Relaxed);
            return count > 0 && count.is_multiple_of(self.interval);
        }

        let prev = self.count.fetch_add(additional, Ordering::Relaxed);
        let new_count = prev + additional;
        for i in (prev / self.interval + 1)..=(new_count / self.interval) {
            let milestone = i * self.interval;
            info!(
                "{} {} records ({})",
                self.message,
                format_count(milestone),
                format_rate(milestone, self.started.elapsed())
            );
        }
        new_count.is_multiple_of(self.interval)
    }

    /// Log the final total unless the last [`record`](Self::record) already did.
    pub fn log_final(&self) {
        if !self.record(0) {
            let count = self.count();
            if count > 0 {
                info!("{} {} records (complete)", self.message, format_count(count));
            }
        }
    }

    /// Records counted so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
