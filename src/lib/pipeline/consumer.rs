//! The consumer loop.
//!
//! Each consumer drains whole batches from the work queue, runs the processor
//! over them and returns the slots to the recycle pool. Seeing the completion
//! flag is not enough to exit: the consumer then drains until the queue is
//! empty, so a batch submitted just before the flag was set is never stranded.

use crate::errors::Result;
use crate::processor::{RecordProcessor, process_slots};
use crate::record::RecordSlot;

use super::spin::{SpinStrategy, Spinner};
use super::state::PipelineState;
use super::stats::PipelineStats;

/// Run one consumer until the producer signals completion and the queue is
/// empty, or until the run is aborted.
///
/// # Errors
/// Returns the first work error; the caller is responsible for recording it
/// on `state` so the other threads stop.
pub fn run_consumer<P: RecordProcessor + ?Sized>(
    state: &PipelineState,
    processor: &P,
    spin: SpinStrategy,
) -> Result<()> {
    let mut batch = Vec::with_capacity(state.queue.batch_capacity());
    let mut spinner = Spinner::new(spin);

    loop {
        if state.has_error() {
            return Ok(());
        }
        if state.done.is_set() {
            break;
        }
        if state.queue.approximate_size() >= state.queue.batch_capacity()
            && consume_one(state, processor, &mut batch)?
        {
            spinner.reset();
        } else {
            spinner.wait();
        }
    }

    while !state.has_error() && consume_one(state, processor, &mut batch)? {}
    Ok(())
}

/// Drain and process one batch. Returns `false` if the queue was empty.
fn consume_one<P: RecordProcessor + ?Sized>(
    state: &PipelineState,
    processor: &P,
    batch: &mut Vec<RecordSlot>,
) -> Result<bool> {
    let count = state.queue.try_drain(batch);
    if count == 0 {
        return Ok(false);
    }
    let result = process_slots(processor, batch);
    state.pool.give_back(batch);
    result?;
    PipelineStats::add(&state.stats.consumer_processed, count as u64);
    state.progress.record(count as u64);
    Ok(true)
}
