//! Recycle pool of empty record slots.
//!
//! All slots are allocated up front. The producer borrows empty slots in bulk
//! and consumers give them back after processing, so the steady state performs
//! no allocation for record storage.

use crossbeam_queue::ArrayQueue;

use crate::record::RecordSlot;

/// A bounded, lock-free pool of empty [`RecordSlot`]s.
///
/// The pool's capacity equals the number of slots it creates, so returning a
/// slot that was borrowed from it can never overflow.
pub struct RecyclePool {
    free: ArrayQueue<RecordSlot>,
    total_slots: usize,
}

impl RecyclePool {
    /// Create a pool pre-populated with `total_slots` empty slots.
    ///
    /// # Panics
    /// Panics if `total_slots` is 0.
    #[must_use]
    pub fn new(total_slots: usize) -> Self {
        let free = ArrayQueue::new(total_slots);
        for _ in 0..total_slots {
            // Cannot fail: the queue was sized for exactly this many slots.
            let _ = free.push(RecordSlot::new());
        }
        Self { free, total_slots }
    }

    /// Move up to `count` free slots onto the end of `into`.
    ///
    /// Returns how many slots were moved, 0 when the pool is momentarily empty.
    pub fn borrow(&self, count: usize, into: &mut Vec<RecordSlot>) -> usize {
        let mut moved = 0;
        while moved < count {
            match self.free.pop() {
                Some(slot) => {
                    into.push(slot);
                    moved += 1;
                }
                None => break,
            }
        }
        moved
    }

    /// Reset every slot in `slots` and return it to the pool, leaving `slots` empty.
    ///
    /// # Panics
    /// Panics if the pool overflows, which only happens when slots that were
    /// never borrowed from this pool are given back.
    pub fn give_back(&self, slots: &mut Vec<RecordSlot>) {
        for mut slot in slots.drain(..) {
            slot.reset();
            assert!(self.free.push(slot).is_ok(), "recycle pool overflow: foreign slot returned");
        }
    }

    /// Number of free slots currently in the pool (best effort under contention).
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of slots created by this pool.
    #[must_use]
    pub fn total_slots(&self) -> usize {
        self.total_slots
    }

    /// Slots currently held outside the pool.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.total_slots - self.available()
    }
}
