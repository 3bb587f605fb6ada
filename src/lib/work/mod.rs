//! Concrete record processors used by the `fqpipe` subcommands.
//!
//! - [`stats::FastxStatsCollector`] accumulates length, composition and quality totals.
//! - [`validate::RecordValidator`] checks each record for structural problems.
//!
//! Both fold each batch into local totals and merge them into shared state
//! under one short lock per batch.

pub mod stats;
pub mod validate;

pub use stats::FastxStatsCollector;
pub use validate::{RecordIssue, RecordValidator, check_record};
