//! Summary statistics over the records of a FASTA/FASTQ source.

use serde::{Deserialize, Serialize};

use crate::{Metric, fraction};

/// Raw totals accumulated while scanning records.
///
/// Totals from independent workers are combined with [`FastxTotals::merge`]
/// and converted to a [`FastxStatsMetric`] once all records have been seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastxTotals {
    /// Number of records observed
    pub records: u64,
    /// Total number of sequence bases
    pub bases: u64,
    /// Records that carried a quality string
    pub records_with_quality: u64,
    /// Number of quality values summed into `quality_sum`
    pub quality_values: u64,
    /// Sum of Phred scores (already offset-corrected)
    pub quality_sum: u64,
    /// Shortest sequence length, `u64::MAX` until a record is seen
    pub min_length: u64,
    /// Longest sequence length
    pub max_length: u64,
    /// Base counts in the order A, C, G, T, N, other
    pub composition: [u64; 6],
}

impl FastxTotals {
    /// Empty totals with `min_length` primed for [`FastxTotals::merge`].
    #[must_use]
    pub fn new() -> Self {
        Self { min_length: u64::MAX, ..Default::default() }
    }

    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: &FastxTotals) {
        self.records += other.records;
        self.bases += other.bases;
        self.records_with_quality += other.records_with_quality;
        self.quality_values += other.quality_values;
        self.quality_sum += other.quality_sum;
        self.min_length = self.min_length.min(other.min_length);
        self.max_length = self.max_length.max(other.max_length);
        for (total, count) in self.composition.iter_mut().zip(other.composition) {
            *total += count;
        }
    }
}

/// One-row summary of a FASTA/FASTQ input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FastxStatsMetric {
    /// Number of records
    pub records: u64,
    /// Total number of sequence bases
    pub bases: u64,
    /// Records that carried a quality string (0 for FASTA)
    pub records_with_quality: u64,
    /// Shortest sequence length
    pub min_length: u64,
    /// Longest sequence length
    pub max_length: u64,
    /// Mean sequence length
    pub mean_length: f64,
    /// Count of A/a bases
    pub a_bases: u64,
    /// Count of C/c bases
    pub c_bases: u64,
    /// Count of G/g bases
    pub g_bases: u64,
    /// Count of T/t bases
    pub t_bases: u64,
    /// Count of N/n bases
    pub n_bases: u64,
    /// Count of any other symbol
    pub other_bases: u64,
    /// Fraction of G+C over all A, C, G, T bases
    pub gc_fraction: f64,
    /// Fraction of N over all bases
    pub n_fraction: f64,
    /// Mean Phred quality over all quality values
    pub mean_quality: f64,
}

impl From<&FastxTotals> for FastxStatsMetric {
    fn from(totals: &FastxTotals) -> Self {
        let [a, c, g, t, n, other] = totals.composition;
        Self {
            records: totals.records,
            bases: totals.bases,
            records_with_quality: totals.records_with_quality,
            min_length: if totals.records == 0 { 0 } else { totals.min_length },
            max_length: totals.max_length,
            mean_length: fraction(totals.bases, totals.records),
            a_bases: a,
            c_bases: c,
            g_bases: g,
            t_bases: t,
            n_bases: n,
            other_bases: other,
            gc_fraction: fraction(g + c, a + c + g + t),
            n_fraction: fraction(n, totals.bases),
            mean_quality: fraction(totals.quality_sum, totals.quality_values),
        }
    }
}

impl Metric for FastxStatsMetric {
    fn metric_name() -> &'static str {
        "fastx stats"
    }
}
