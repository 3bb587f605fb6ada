//! Logging helpers for formatted run summaries.
//!
//! All output goes through the `log` facade; the binary installs `env_logger`.

use std::time::{Duration, Instant};

use fqpipe_metrics::{FastxStatsMetric, RecordValidationMetric, format_float};

pub use fqpipe_metrics::format_count;

/// Renders a fraction in `[0, 1]` as a percentage rounded to `decimals` places.
///
/// ```
/// use fqpipe_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.4217, 1), "42.2%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    let percent = fraction * 100.0;
    format!("{percent:.decimals$}%")
}

/// Renders a wall-clock duration at a coarse resolution: seconds below a
/// minute, minutes and seconds below an hour, hours and minutes beyond.
/// Zero-valued trailing units are omitted.
///
/// ```
/// use fqpipe_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(75)), "1m 15s");
/// assert_eq!(format_duration(Duration::from_secs(7200)), "2h");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (major, minor, units) = match total {
        0..=59 => return format!("{total}s"),
        60..=3599 => (total / 60, total % 60, ("m", "s")),
        _ => (total / 3600, total % 3600 / 60, ("h", "m")),
    };
    match minor {
        0 => format!("{major}{}", units.0),
        _ => format!("{major}{} {minor}{}", units.0, units.1),
    }
}

/// Formats a throughput in records per second.
///
/// ```
/// use fqpipe_lib::logging::format_rate;
/// use std::time::Duration;
///
/// assert_eq!(format_rate(2_500_000, Duration::from_secs(2)), "1,250,000 records/s");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let elapsed = duration.as_secs_f64();
    if elapsed < 0.001 {
        return format!("{} records/s", format_count(count));
    }
    let per_second = count as f64 / elapsed;
    if per_second < 1.0 {
        return format!("{:.1} records/min", per_second * 60.0);
    }
    format!("{} records/s", format_count(per_second as u64))
}

/// Logs the headline numbers of a `stats` run.
pub fn log_fastx_stats_summary(metric: &FastxStatsMetric) {
    log::info!("FASTX Statistics:");
    log::info!("  Records:            {}", format_count(metric.records));
    log::info!("  Bases:              {}", format_count(metric.bases));
    if metric.records > 0 {
        log::info!(
            "  Length (min/mean/max): {} / {:.1} / {}",
            metric.min_length,
            metric.mean_length,
            metric.max_length
        );
        log::info!("  GC content:         {}", format_percent(metric.gc_fraction, 2));
        log::info!("  N content:          {}", format_percent(metric.n_fraction, 2));
    }
    if metric.records_with_quality > 0 {
        log::info!("  Mean quality:       {}", format_float(metric.mean_quality));
    }
}

/// Logs the outcome of a `validate` run, with a line per failure category that occurred.
pub fn log_validation_summary(metric: &RecordValidationMetric) {
    log::info!("Validation Summary:");
    log::info!("  Records checked:    {}", format_count(metric.records));
    log::info!("  Valid records:      {}", format_count(metric.valid_records));
    if metric.invalid_records == 0 {
        return;
    }
    log::warn!("  Invalid records:    {}", format_count(metric.invalid_records));
    for (label, count) in [
        ("Empty name", metric.empty_name),
        ("Invalid base", metric.invalid_base),
        ("Length mismatch", metric.length_mismatch),
        ("Invalid quality", metric.invalid_quality),
    ] {
        if count > 0 {
            log::warn!("    {label:<17} {}", format_count(count));
        }
    }
}

/// Logs the start of an operation and, on request, its duration and throughput.
///
/// ```no_run
/// use fqpipe_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Computing statistics");
/// // ... run the pipeline ...
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    started: Instant,
}

impl OperationTimer {
    /// Log that `operation` is starting and start the clock.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} started");
        Self { operation: operation.to_owned(), started: Instant::now() }
    }

    /// Logs completion with the record count and rate.
    pub fn log_completion(&self, count: u64) {
        let took = self.started.elapsed();
        log::info!(
            "{} completed: {} records in {} ({})",
            self.operation,
            format_count(count),
            format_duration(took),
            format_rate(count, took)
        );
    }

    /// Time since the timer was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
