//! Producer/consumer ingestion pipeline.
//!
//! One producer (the calling thread) decodes records from a [`RecordSource`]
//! into reusable [`RecordSlot`]s and hands them out in fixed-size batches.
//! `num_threads - 1` consumer threads drain the batches and run a
//! [`RecordProcessor`] over them.
//!
//! ```text
//!  source ──decode──▶ producer ──try_submit──▶ WorkQueue ──try_drain──▶ consumers
//!                        ▲   │ (queue full: HELPING)                        │
//!                        │   └─ processes records itself                    │
//!                        └──────────── RecyclePool ◀──── give_back ─────────┘
//! ```
//!
//! # Moving parts
//!
//! - [`RecyclePool`]: every slot is allocated up front; the steady state
//!   allocates nothing.
//! - [`WorkQueue`]: bounded, lock-free, and moves whole batches, so a submit
//!   either hands over every slot or none.
//! - HELPING: when a submit fails the producer processes the next record
//!   itself and retries, so a full queue never stalls decoding.
//! - [`CompletionFlag`]: set by the producer only after it has processed its
//!   partial batch and drained the queue. Consumers that see it drain once
//!   more before exiting.
//!
//! Nothing in the pipeline blocks; idle threads wait according to
//! [`SpinStrategy`].
//!
//! Records are decoded in order and keep their order within a batch. There is
//! no ordering across batches.
//!
//! [`RecordSource`]: crate::source::RecordSource
//! [`RecordSlot`]: crate::record::RecordSlot
//! [`RecordProcessor`]: crate::processor::RecordProcessor

pub mod completion;
pub mod config;
pub mod consumer;
pub mod pool;
pub mod producer;
pub mod queue;
pub mod runner;
pub mod spin;
pub mod state;
pub mod stats;

pub use completion::CompletionFlag;
pub use config::{DecodeErrorPolicy, PipelineConfig};
pub use consumer::run_consumer;
pub use pool::RecyclePool;
pub use producer::run_producer;
pub use queue::WorkQueue;
pub use runner::{PipelineSummary, run_pipeline};
pub use spin::{SpinStrategy, Spinner};
pub use state::PipelineState;
pub use stats::{PipelineStats, StatsSnapshot};
