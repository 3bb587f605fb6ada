//! TSV output for fqpipe metric rows.
//!
//! `fqpipe stats` writes one [`crate::FastxStatsMetric`] row and `fqpipe
//! validate` one [`crate::RecordValidationMetric`] row. Columns are the
//! struct's field names, in declaration order.

use anyhow::{Context, Result};
use fgoxide::io::DelimFile;
use serde::Serialize;
use std::path::Path;

use crate::Metric;

/// Write `rows` as a tab-separated file with a header line.
///
/// `kind` names the rows in the error message when the file cannot be written.
///
/// # Errors
/// Returns an error if the file cannot be created or written to
///
/// # Example
/// ```no_run
/// use fqpipe_metrics::writer::write_metrics;
/// use serde::Serialize;
/// use std::path::Path;
///
/// #[derive(Serialize)]
/// struct Row {
///     records: u64,
/// }
///
/// write_metrics(Path::new("metrics.txt"), &[Row { records: 10 }], "record").unwrap();
/// ```
pub fn write_metrics<P: AsRef<Path>, T: Serialize>(path: P, rows: &[T], kind: &str) -> Result<()> {
    let path = path.as_ref();
    DelimFile::default()
        .write_tsv(&path, rows)
        .with_context(|| format!("Failed to write {kind} metrics: {}", path.display()))
}

/// [`write_metrics`] for [`Metric`] rows, naming them with [`Metric::metric_name`].
///
/// # Errors
/// Returns an error if the file cannot be created or written to
pub fn write_metrics_auto<P: AsRef<Path>, T: Metric>(path: P, rows: &[T]) -> Result<()> {
    write_metrics(path, rows, T::metric_name())
}
