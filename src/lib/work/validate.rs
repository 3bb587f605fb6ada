//! Per-record structural validation.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use fqpipe_metrics::RecordValidationMetric;
use log::warn;
use parking_lot::Mutex;
use thiserror::Error;

use crate::processor::RecordProcessor;
use crate::record::RecordSlot;

/// How many invalid records are logged individually before going quiet.
pub const MAX_REPORTED_ISSUES: u64 = 10;

/// IUPAC nucleotide codes, either case.
const IUPAC: &[u8] = b"ACGTUNRYSWKMBDHVacgtunryswkmbdhv";

const VALID_BASE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0;
    while i < IUPAC.len() {
        table[IUPAC[i] as usize] = true;
        i += 1;
    }
    table
};

/// A problem found in a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordIssue {
    /// The header has no name
    #[error("empty read name")]
    EmptyName,

    /// A sequence symbol outside the IUPAC alphabet
    #[error("invalid base '{}' at position {position}", char::from(*base))]
    InvalidBase {
        /// Zero-based offset in the sequence
        position: usize,
        /// Offending byte
        base: u8,
    },

    /// Sequence and quality lengths differ
    #[error("sequence length {seq_len} differs from quality length {qual_len}")]
    LengthMismatch {
        /// Sequence length
        seq_len: usize,
        /// Quality length
        qual_len: usize,
    },

    /// A quality byte outside Phred+33 (`!`..=`~`)
    #[error("invalid quality byte {value} at position {position}")]
    InvalidQuality {
        /// Zero-based offset in the quality string
        position: usize,
        /// Offending byte
        value: u8,
    },
}

/// Check `record`, reporting at most one issue of each kind, in a fixed order.
#[must_use]
pub fn check_record(record: &RecordSlot) -> Vec<RecordIssue> {
    let mut issues = Vec::new();
    if record.name().is_empty() {
        issues.push(RecordIssue::EmptyName);
    }
    if let Some(position) = record.seq().iter().position(|&b| !VALID_BASE[usize::from(b)]) {
        issues.push(RecordIssue::InvalidBase { position, base: record.seq()[position] });
    }
    if let Some(qual) = record.qual() {
        if qual.len() != record.len() {
            issues.push(RecordIssue::LengthMismatch { seq_len: record.len(), qual_len: qual.len() });
        }
        if let Some(position) = qual.iter().position(|q| !(b'!'..=b'~').contains(q)) {
            issues.push(RecordIssue::InvalidQuality { position, value: qual[position] });
        }
    }
    issues
}

fn tally(metric: &mut RecordValidationMetric, issues: &[RecordIssue]) {
    metric.records += 1;
    if issues.is_empty() {
        metric.valid_records += 1;
        return;
    }
    metric.invalid_records += 1;
    for issue in issues {
        match issue {
            RecordIssue::EmptyName => metric.empty_name += 1,
            RecordIssue::InvalidBase { .. } => metric.invalid_base += 1,
            RecordIssue::LengthMismatch { .. } => metric.length_mismatch += 1,
            RecordIssue::InvalidQuality { .. } => metric.invalid_quality += 1,
        }
    }
}

/// Processor that validates every record.
///
/// In fail-fast mode the first invalid record is returned as a work error,
/// which stops the pipeline. Otherwise issues are counted and the first few
/// are logged.
#[derive(Debug)]
pub struct RecordValidator {
    fail_fast: bool,
    counts: Mutex<RecordValidationMetric>,
    reported: AtomicU64,
}

impl RecordValidator {
    /// Create a validator.
    #[must_use]
    pub fn new(fail_fast: bool) -> Self {
        Self { fail_fast, counts: Mutex::new(RecordValidationMetric::default()), reported: AtomicU64::new(0) }
    }

    /// The final counts.
    #[must_use]
    pub fn finish(self) -> RecordValidationMetric {
        self.counts.into_inner()
    }

    fn check(&self, record: &RecordSlot, local: &mut RecordValidationMetric) -> Result<()> {
        let issues = check_record(record);
        if let Some(first) = issues.first() {
            if self.fail_fast {
                return Err(anyhow::Error::new(*first)
                    .context(format!("invalid record '{}'", String::from_utf8_lossy(record.name()))));
            }
            if self.reported.fetch_add(1, Ordering::Relaxed) < MAX_REPORTED_ISSUES {
                let detail: Vec<String> = issues.iter().map(ToString::to_string).collect();
                warn!(
                    "Invalid record {} '{}': {}",
                    record.index(),
                    String::from_utf8_lossy(record.name()),
                    detail.join("; ")
                );
            }
        }
        tally(local, &issues);
        Ok(())
    }
}

impl RecordProcessor for RecordValidator {
    fn process(&self, record: &RecordSlot) -> Result<()> {
        let mut local = RecordValidationMetric::default();
        self.check(record, &mut local)?;
        self.counts.lock().merge(&local);
        Ok(())
    }

    fn process_batch(&self, batch: &[RecordSlot]) -> std::result::Result<(), (u64, anyhow::Error)> {
        let mut local = RecordValidationMetric::default();
        let mut outcome = Ok(());
        for record in batch {
            if let Err(e) = self.check(record, &mut local) {
                outcome = Err((record.index(), e));
                break;
            }
        }
        self.counts.lock().merge(&local);
        outcome
    }
}
