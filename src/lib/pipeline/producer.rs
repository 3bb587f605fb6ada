//! The producer loop.
//!
//! The producer runs on the calling thread. It decodes records into slots
//! borrowed from the recycle pool and submits them to the work queue in full
//! batches. When the queue is full it does not wait: it decodes the next
//! record into a spare slot, processes it itself, and retries the submit
//! (HELPING). When the recycle pool runs dry it drains and processes a queued
//! batch instead of idling.
//!
//! Once the source is exhausted the producer processes its partial batch,
//! drains the queue until it is empty, and only then sets the completion flag.
//! Partial batches are never queued.

use std::slice;

use log::warn;

use crate::errors::Result;
use crate::processor::{RecordProcessor, process_slots};
use crate::progress::ProgressTracker;
use crate::record::RecordSlot;
use crate::source::RecordSource;

use super::config::{DecodeErrorPolicy, PipelineConfig};
use super::spin::Spinner;
use super::state::PipelineState;
use super::stats::PipelineStats;

/// Wraps a source, numbering records and applying the decode error policy.
pub(crate) struct Decoder<S> {
    source: S,
    next_index: u64,
    policy: DecodeErrorPolicy,
}

impl<S: RecordSource> Decoder<S> {
    pub(crate) fn new(source: S, policy: DecodeErrorPolicy) -> Self {
        Self { source, next_index: 0, policy }
    }

    /// Decode the next record into `slot`. Returns `false` at end of input.
    pub(crate) fn decode_into(&mut self, slot: &mut RecordSlot, stats: &PipelineStats) -> Result<bool> {
        loop {
            match self.source.decode_next() {
                Ok(Some(record)) => {
                    slot.copy_from(self.next_index, &record);
                    self.next_index += 1;
                    PipelineStats::add(&stats.records_decoded, 1);
                    return Ok(true);
                }
                Ok(None) => return Ok(false),
                Err(e) if e.resumable && self.policy == DecodeErrorPolicy::Skip => {
                    warn!("Skipping malformed record {}: {}", e.record, e.message);
                    PipelineStats::add(&stats.decode_errors_skipped, 1);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

enum Submit {
    Submitted,
    SourceEnded,
    Aborted,
}

struct Producer<'a, S, P: ?Sized> {
    state: &'a PipelineState,
    processor: &'a P,
    decoder: Decoder<S>,
    spinner: Spinner,
    /// Empty slots borrowed from the pool and not yet filled
    spare: Vec<RecordSlot>,
    /// The batch being filled
    filling: Vec<RecordSlot>,
    /// Scratch buffer for batches the producer drains from the queue
    drained: Vec<RecordSlot>,
}

/// Run the producer to completion on the current thread.
///
/// Returns `Ok(())` without setting the completion flag if another thread
/// aborted the run; the caller reports the stored error.
///
/// # Errors
/// Returns a fatal decode or work error raised on this thread. The error is
/// not recorded on `state`; the caller must do so to stop the consumers.
pub fn run_producer<S: RecordSource, P: RecordProcessor + ?Sized>(
    state: &PipelineState,
    config: &PipelineConfig,
    source: S,
    processor: &P,
) -> Result<()> {
    let batch_capacity = state.queue.batch_capacity();
    Producer {
        state,
        processor,
        decoder: Decoder::new(source, config.decode_errors),
        spinner: Spinner::new(config.spin),
        spare: Vec::with_capacity(batch_capacity),
        filling: Vec::with_capacity(batch_capacity),
        drained: Vec::with_capacity(batch_capacity),
    }
    .run()
}

impl<S: RecordSource, P: RecordProcessor + ?Sized> Producer<'_, S, P> {
    fn run(mut self) -> Result<()> {
        let state = self.state;
        let batch_capacity = state.queue.batch_capacity();
        loop {
            if state.has_error() {
                return Ok(());
            }
            let Some(mut slot) = self.take_slot()? else {
                return Ok(());
            };
            if !self.decoder.decode_into(&mut slot, &state.stats)? {
                self.spare.push(slot);
                break;
            }
            self.filling.push(slot);
            if self.filling.len() == batch_capacity {
                match self.submit()? {
                    Submit::Submitted => {}
                    Submit::SourceEnded => break,
                    Submit::Aborted => return Ok(()),
                }
            }
        }
        self.finish()
    }

    /// Next empty slot: a spare, then a bulk borrow from the pool. While the
    /// pool is empty, drain and process queued batches or wait. `None` on abort.
    fn take_slot(&mut self) -> Result<Option<RecordSlot>> {
        let state = self.state;
        let mut waiting = false;
        loop {
            if let Some(slot) = self.spare.pop() {
                return Ok(Some(slot));
            }
            if state.pool.borrow(state.queue.batch_capacity(), &mut self.spare) > 0 {
                continue;
            }
            if !waiting {
                PipelineStats::add(&state.stats.pool_waits, 1);
                waiting = true;
            }
            if state.has_error() {
                return Ok(None);
            }
            if self.drain_one()? {
                self.spinner.reset();
            } else {
                self.spinner.wait();
            }
        }
    }

    /// Submit the full `filling` batch, HELPING until the queue accepts it.
    ///
    /// If the source ends while helping, the batch stays in `filling`.
    fn submit(&mut self) -> Result<Submit> {
        let state = self.state;
        loop {
            if state.queue.try_submit(&mut self.filling) {
                PipelineStats::add(&state.stats.batches_submitted, 1);
                return Ok(Submit::Submitted);
            }
            PipelineStats::add(&state.stats.submit_failures, 1);

            let Some(mut slot) = self.take_slot()? else {
                return Ok(Submit::Aborted);
            };
            // The slot may have come from draining the queue, which frees room.
            if !self.decoder.decode_into(&mut slot, &state.stats)? {
                self.spare.push(slot);
                return Ok(Submit::SourceEnded);
            }
            let result = process_slots(self.processor, slice::from_ref(&slot));
            self.spare.push(slot);
            result?;
            PipelineStats::add(&state.stats.producer_helped, 1);
            state.progress.record(1);
            if state.has_error() {
                return Ok(Submit::Aborted);
            }
        }
    }

    /// Drain one queued batch and process it here. Returns `false` if the queue was empty.
    fn drain_one(&mut self) -> Result<bool> {
        let state = self.state;
        let count = state.queue.try_drain(&mut self.drained);
        if count == 0 {
            return Ok(false);
        }
        PipelineStats::add(&state.stats.batches_drained_by_producer, 1);
        let result = process_slots(self.processor, &self.drained);
        state.pool.give_back(&mut self.drained);
        result?;
        PipelineStats::add(&state.stats.producer_drained, count as u64);
        state.progress.record(count as u64);
        Ok(true)
    }

    fn finish(mut self) -> Result<()> {
        let state = self.state;
        if !self.filling.is_empty() {
            let count = self.filling.len() as u64;
            let result = process_slots(self.processor, &self.filling);
            state.pool.give_back(&mut self.filling);
            result?;
            PipelineStats::add(&state.stats.producer_tail, count);
            state.progress.record(count);
        }

        while self.drain_one()? {}
        state.done.set();

        state.pool.give_back(&mut self.spare);
        drop(self.decoder);
        Ok(())
    }
}

/// Decode and process every record on the current thread with a single slot.
///
/// Used when no consumer threads are configured; no pool or queue exists.
pub(crate) fn run_single_threaded<S: RecordSource, P: RecordProcessor + ?Sized>(
    config: &PipelineConfig,
    source: S,
    processor: &P,
    stats: &PipelineStats,
    progress: &ProgressTracker,
) -> Result<()> {
    let mut decoder = Decoder::new(source, config.decode_errors);
    let mut slot = RecordSlot::new();
    while decoder.decode_into(&mut slot, stats)? {
        process_slots(processor, slice::from_ref(&slot))?;
        PipelineStats::add(&stats.producer_direct, 1);
        progress.record(1);
    }
    Ok(())
}
