#![deny(unsafe_code)]

//! Structured metric types and TSV writer for fqpipe commands.
//!
//! This crate provides:
//! - [`Metric`] trait for serializable metric rows
//! - [`fastx`] summary statistics over a FASTA/FASTQ source
//! - [`validation`] record validation counts
//! - [`writer`] module for TSV file output

pub mod fastx;
pub mod validation;
pub mod writer;

use serde::{Deserialize, Serialize};

/// Number of decimal places used when rendering float metrics in log output.
pub const FLOAT_PRECISION: usize = 6;

/// Formats a float value with the standard metric precision.
///
/// # Example
/// ```
/// use fqpipe_metrics::format_float;
/// assert_eq!(format_float(0.5), "0.500000");
/// assert_eq!(format_float(0.0), "0.000000");
/// ```
#[must_use]
pub fn format_float(value: f64) -> String {
    format!("{value:.FLOAT_PRECISION$}")
}

/// Formats a count with thousands separators.
///
/// # Example
/// ```
/// use fqpipe_metrics::format_count;
///
/// assert_eq!(format_count(1234567), "1,234,567");
/// assert_eq!(format_count(123), "123");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A metric type that can be serialized to TSV files.
pub trait Metric: Serialize + for<'de> Deserialize<'de> + Clone + Default {
    /// Human-readable name for this metric type, used in error messages.
    fn metric_name() -> &'static str;
}

/// Ratio of two counts, or 0 when the denominator is 0.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "record and base counts never exceed 2^53")]
pub fn fraction(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

pub use fastx::FastxStatsMetric;
pub use validation::RecordValidationMetric;
pub use writer::{write_metrics, write_metrics_auto};
