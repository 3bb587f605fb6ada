//! Summary statistics over FASTA/FASTQ records.

use anyhow::Result;
use fqpipe_metrics::FastxStatsMetric;
use fqpipe_metrics::fastx::FastxTotals;
use parking_lot::Mutex;

use crate::processor::RecordProcessor;
use crate::record::RecordSlot;

/// Phred+33 offset of FASTQ quality characters.
pub const PHRED_OFFSET: u8 = 33;

const OTHER: u8 = 5;

/// Composition bucket for every byte: A, C, G, T, N (either case), anything else.
const BASE_CLASS: [u8; 256] = {
    let mut table = [OTHER; 256];
    table[b'A' as usize] = 0;
    table[b'a' as usize] = 0;
    table[b'C' as usize] = 1;
    table[b'c' as usize] = 1;
    table[b'G' as usize] = 2;
    table[b'g' as usize] = 2;
    table[b'T' as usize] = 3;
    table[b't' as usize] = 3;
    table[b'N' as usize] = 4;
    table[b'n' as usize] = 4;
    table
};

/// Add one record to `totals`.
pub fn tally(totals: &mut FastxTotals, record: &RecordSlot) {
    let len = record.len() as u64;
    totals.records += 1;
    totals.bases += len;
    totals.min_length = totals.min_length.min(len);
    totals.max_length = totals.max_length.max(len);
    for &base in record.seq() {
        totals.composition[usize::from(BASE_CLASS[usize::from(base)])] += 1;
    }
    if let Some(qual) = record.qual() {
        totals.records_with_quality += 1;
        totals.quality_values += qual.len() as u64;
        totals.quality_sum += qual.iter().map(|&q| u64::from(q.saturating_sub(PHRED_OFFSET))).sum::<u64>();
    }
}

/// Processor that accumulates [`FastxTotals`] across all pipeline threads.
#[derive(Debug)]
pub struct FastxStatsCollector {
    totals: Mutex<FastxTotals>,
}

impl Default for FastxStatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FastxStatsCollector {
    /// A collector with no records seen.
    #[must_use]
    pub fn new() -> Self {
        Self { totals: Mutex::new(FastxTotals::new()) }
    }

    /// Totals so far.
    #[must_use]
    pub fn totals(&self) -> FastxTotals {
        *self.totals.lock()
    }

    /// The final metric row.
    #[must_use]
    pub fn finish(self) -> FastxStatsMetric {
        FastxStatsMetric::from(&self.totals.into_inner())
    }
}

impl RecordProcessor for FastxStatsCollector {
    fn process(&self, record: &RecordSlot) -> Result<()> {
        let mut local = FastxTotals::new();
        tally(&mut local, record);
        self.totals.lock().merge(&local);
        Ok(())
    }

    fn process_batch(&self, batch: &[RecordSlot]) -> std::result::Result<(), (u64, anyhow::Error)> {
        let mut local = FastxTotals::new();
        for record in batch {
            tally(&mut local, record);
        }
        self.totals.lock().merge(&local);
        Ok(())
    }
}
