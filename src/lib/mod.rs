#![deny(unsafe_code)]
// Clippy lint configuration for CI
// - cast_*: record and base counts are converted between usize/u64/f64 freely
// - missing_*_doc: error and panic sections are documented where they are not obvious
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args
)]

//! # fqpipe - high-throughput FASTA/FASTQ ingestion
//!
//! A single producer decodes records from one sequential source and hands them,
//! in fixed-size batches, to worker threads that run a pluggable per-record
//! function. Record storage is allocated once and recycled.
//!
//! ## Modules
//!
//! - **[`pipeline`]** - the producer/consumer engine: recycle pool, work queue,
//!   completion flag and the [`run_pipeline`](pipeline::run_pipeline) entry point
//! - **[`source`]** - record sources: FASTA/FASTQ files (plain, gzip, BGZF) and in-memory
//! - **[`record`]** - the reusable [`RecordSlot`](record::RecordSlot)
//! - **[`processor`]** - the [`RecordProcessor`](processor::RecordProcessor) trait
//! - **[`work`]** - processors behind the `stats` and `validate` commands
//! - **[`errors`]**, **[`logging`]**, **[`progress`]**, **[`validation`]** - supporting utilities
//!
//! ## Quick Start
//!
//! ```
//! use fqpipe_lib::pipeline::{PipelineConfig, run_pipeline};
//! use fqpipe_lib::record::RecordSlot;
//! use fqpipe_lib::source::MemorySource;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let bases = AtomicU64::new(0);
//! let count_bases = |record: &RecordSlot| -> anyhow::Result<()> {
//!     bases.fetch_add(record.len() as u64, Ordering::Relaxed);
//!     Ok(())
//! };
//!
//! let config = PipelineConfig::new(4).with_batch_capacity(16);
//! let summary = run_pipeline(&config, MemorySource::numbered(1_000), &count_bases).unwrap();
//! assert_eq!(summary.records, 1_000);
//! assert_eq!(bases.load(Ordering::Relaxed), 8_000);
//! ```
//!
//! Files are opened with [`FastxSource::open`](source::FastxSource::open), which
//! detects compression and format from the content.

pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod record;
pub mod source;
pub mod validation;
pub mod work;
