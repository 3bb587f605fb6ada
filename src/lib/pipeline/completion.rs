//! One-shot end-of-input signal from the producer to the consumers.

use std::sync::atomic::{AtomicBool, Ordering};

/// Set once by the producer after it has retired everything it will ever
/// submit; consumers observe it and run a final drain before exiting.
///
/// The Release store pairs with the Acquire load so that a consumer seeing the
/// flag also sees every batch the producer submitted before setting it.
#[derive(Debug, Default)]
pub struct CompletionFlag {
    done: AtomicBool,
}

impl CompletionFlag {
    /// A flag in the unset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the input as finished. Setting the flag twice is a logic error.
    pub fn set(&self) {
        let was_set = self.done.swap(true, Ordering::Release);
        debug_assert!(!was_set, "completion flag set twice");
    }

    /// True once [`set`](Self::set) has been called.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}
