//! Bounded batch queue between the producer and the consumers.
//!
//! The queue holds whole batches rather than individual slots, so a submit is
//! all-or-nothing: either every slot of the batch becomes visible to consumers
//! or the producer keeps them all. Batch vectors are exchanged by swap and the
//! emptied vectors ("shells") are recycled, which keeps the steady state free
//! of allocation.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_queue::ArrayQueue;

use crate::record::RecordSlot;

/// A bounded, lock-free multi-producer/multi-consumer queue of record batches.
///
/// Capacity is `batches × batch_capacity` slots. Every operation is a
/// non-blocking try; waiting is left to the caller.
pub struct WorkQueue {
    batches: ArrayQueue<Vec<RecordSlot>>,
    shells: ArrayQueue<Vec<RecordSlot>>,
    batch_capacity: usize,
    queued_slots: AtomicUsize,
}

impl WorkQueue {
    /// Create a queue holding at most `batches` batches of up to `batch_capacity` slots.
    ///
    /// # Panics
    /// Panics if either argument is 0.
    #[must_use]
    pub fn new(batches: usize, batch_capacity: usize) -> Self {
        assert!(batch_capacity > 0, "batch capacity must be positive");
        Self {
            batches: ArrayQueue::new(batches),
            // Every batch cell plus one in-hand shell per thread that may touch the queue.
            shells: ArrayQueue::new(batches * 2 + 1),
            batch_capacity,
            queued_slots: AtomicUsize::new(0),
        }
    }

    /// Try to enqueue `batch` as one unit.
    ///
    /// On success `batch` is left empty (it now holds a recycled shell) and the
    /// queue owns the slots. On failure the queue is full, or the batch is
    /// empty or over capacity, and `batch` is untouched.
    pub fn try_submit(&self, batch: &mut Vec<RecordSlot>) -> bool {
        let count = batch.len();
        if count == 0 || count > self.batch_capacity || self.batches.is_full() {
            return false;
        }
        let shell = self.shells.pop().unwrap_or_else(|| Vec::with_capacity(self.batch_capacity));
        let full = std::mem::replace(batch, shell);
        // Count before publishing so the counter never underflows on a racing drain.
        self.queued_slots.fetch_add(count, Ordering::AcqRel);
        match self.batches.push(full) {
            Ok(()) => true,
            Err(full) => {
                self.queued_slots.fetch_sub(count, Ordering::AcqRel);
                let shell = std::mem::replace(batch, full);
                let _ = self.shells.push(shell);
                false
            }
        }
    }

    /// Try to dequeue the oldest batch into `into`.
    ///
    /// Returns the number of slots moved, 0 if the queue is empty. `into` is
    /// expected to be empty; its allocation is recycled as a shell. A
    /// non-empty `into` keeps its contents and the batch is appended.
    pub fn try_drain(&self, into: &mut Vec<RecordSlot>) -> usize {
        let Some(mut batch) = self.batches.pop() else {
            return 0;
        };
        let count = batch.len();
        self.queued_slots.fetch_sub(count, Ordering::AcqRel);
        if into.is_empty() {
            std::mem::swap(into, &mut batch);
        } else {
            into.append(&mut batch);
        }
        let _ = self.shells.push(batch);
        count
    }

    /// Best-effort number of queued slots, for scheduling heuristics only.
    #[must_use]
    pub fn approximate_size(&self) -> usize {
        self.queued_slots.load(Ordering::Acquire)
    }

    /// True if no batch is queued at the moment of the call.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Maximum number of slots in one batch.
    #[must_use]
    pub fn batch_capacity(&self) -> usize {
        self.batch_capacity
    }

    /// Maximum number of slots the queue holds.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.batches.capacity() * self.batch_capacity
    }
}
