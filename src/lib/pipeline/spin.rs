//! Waiting without blocking.
//!
//! Pipeline threads never park on a lock or condition variable. When there is
//! nothing to do they wait through a [`Spinner`], either busy-spinning or
//! backing off exponentially.

use std::time::Duration;

use clap::ValueEnum;

/// Minimum backoff duration in microseconds.
pub const MIN_BACKOFF_US: u64 = 10;
/// Maximum backoff duration in microseconds (1ms).
pub const MAX_BACKOFF_US: u64 = 1000;

/// How an idle pipeline thread waits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SpinStrategy {
    /// Busy-spin with a CPU pause hint. Lowest latency, burns a core per idle thread.
    #[value(name = "spin")]
    Spin,

    /// Yield, then sleep with exponential backoff from 10µs up to 1ms.
    #[default]
    #[value(name = "backoff")]
    Backoff,
}

/// Per-thread wait state.
#[derive(Debug, Clone)]
pub struct Spinner {
    strategy: SpinStrategy,
    backoff_us: u64,
}

impl Spinner {
    /// Create a spinner at minimum backoff.
    #[must_use]
    pub fn new(strategy: SpinStrategy) -> Self {
        Self { strategy, backoff_us: MIN_BACKOFF_US }
    }

    /// Reset backoff to minimum (after successful work).
    #[inline]
    pub fn reset(&mut self) {
        self.backoff_us = MIN_BACKOFF_US;
    }

    /// Wait once, then increase the backoff for the next call.
    #[inline]
    pub fn wait(&mut self) {
        match self.strategy {
            SpinStrategy::Spin => std::hint::spin_loop(),
            SpinStrategy::Backoff => {
                self.sleep_backoff();
                self.backoff_us = (self.backoff_us * 2).min(MAX_BACKOFF_US);
            }
        }
    }

    /// Current backoff in microseconds.
    #[must_use]
    pub fn backoff_us(&self) -> u64 {
        self.backoff_us
    }

    fn sleep_backoff(&self) {
        if self.backoff_us <= MIN_BACKOFF_US {
            std::thread::yield_now();
        } else {
            // ±25% jitter keeps idle consumers from waking in lockstep.
            let jitter_range = self.backoff_us / 4;
            let jitter_seed = u64::from(
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.subsec_nanos())
                    .unwrap_or(0),
            );
            let jitter = jitter_seed % (jitter_range * 2);
            let actual_us = (self.backoff_us + jitter).saturating_sub(jitter_range).max(MIN_BACKOFF_US);
            std::thread::sleep(Duration::from_micros(actual_us));
        }
    }
}
