//! Counts produced by record validation.

use serde::{Deserialize, Serialize};

use crate::Metric;

/// Summary of a validation pass over a FASTA/FASTQ input.
///
/// A record failing several checks is counted once in `invalid_records`
/// and once under each failing check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordValidationMetric {
    /// Records checked
    pub records: u64,
    /// Records passing every check
    pub valid_records: u64,
    /// Records failing at least one check
    pub invalid_records: u64,
    /// Records with an empty name
    pub empty_name: u64,
    /// Records with a symbol outside the IUPAC nucleotide alphabet
    pub invalid_base: u64,
    /// Records whose quality length differs from the sequence length
    pub length_mismatch: u64,
    /// Records with a quality character outside Phred+33 (`!`..=`~`)
    pub invalid_quality: u64,
}

impl RecordValidationMetric {
    /// True when no invalid records were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.invalid_records == 0
    }

    /// Add the counts of `other` to `self`.
    pub fn merge(&mut self, other: &RecordValidationMetric) {
        self.records += other.records;
        self.valid_records += other.valid_records;
        self.invalid_records += other.invalid_records;
        self.empty_name += other.empty_name;
        self.invalid_base += other.invalid_base;
        self.length_mismatch += other.length_mismatch;
        self.invalid_quality += other.invalid_quality;
    }
}

impl Metric for RecordValidationMetric {
    fn metric_name() -> &'static str {
        "record validation"
    }
}
