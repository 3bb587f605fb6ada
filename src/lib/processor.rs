//! Pluggable per-record work.
//!
//! A [`RecordProcessor`] is shared by every pipeline thread and invoked
//! concurrently on distinct records. Any `Fn(&RecordSlot) -> anyhow::Result<()>`
//! closure that is `Sync` is a processor.

use anyhow::Result;

use crate::errors::PipelineError;
use crate::record::RecordSlot;

/// Work applied to each record.
pub trait RecordProcessor: Sync {
    /// Process one record.
    ///
    /// # Errors
    /// Any error is fatal to the pipeline run.
    fn process(&self, record: &RecordSlot) -> Result<()>;

    /// Process a batch, in order. Stops at the first failing record and
    /// returns its index along with the error.
    ///
    /// # Errors
    /// Returns the index of the failing record and its error.
    fn process_batch(&self, batch: &[RecordSlot]) -> std::result::Result<(), (u64, anyhow::Error)> {
        for record in batch {
            self.process(record).map_err(|e| (record.index(), e))?;
        }
        Ok(())
    }
}

impl<F> RecordProcessor for F
where
    F: Fn(&RecordSlot) -> Result<()> + Sync,
{
    fn process(&self, record: &RecordSlot) -> Result<()> {
        self(record)
    }
}

/// Run `processor` over `batch`, converting a failure into [`PipelineError::Work`].
pub(crate) fn process_slots<P: RecordProcessor + ?Sized>(
    processor: &P,
    batch: &[RecordSlot],
) -> crate::errors::Result<()> {
    processor.process_batch(batch).map_err(|(record, source)| PipelineError::Work { record, source })
}
