//! Custom error types for fqpipe operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for fqpipe operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error type for fqpipe operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// The input could not be opened; raised before any worker starts
    #[error("Failed to open input '{}': {source}", path.display())]
    SourceOpen {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A record could not be decoded
    #[error("Failed to decode record {record}: {reason}")]
    Decode {
        /// Zero-based ordinal of the record that failed
        record: u64,
        /// Decoder message
        reason: String,
    },

    /// The work function failed on a record
    #[error("Work function failed on record {record}: {source:#}")]
    Work {
        /// Zero-based index of the record being processed
        record: u64,
        /// Error returned by the work function
        #[source]
        source: anyhow::Error,
    },

    /// A consumer thread could not be started
    #[error("Failed to spawn thread '{thread}': {source}")]
    Spawn {
        /// Name of the thread
        thread: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A pipeline thread panicked
    #[error("Pipeline thread '{thread}' panicked: {message}")]
    WorkerPanicked {
        /// Name of the thread
        thread: String,
        /// Panic payload rendered as text
        message: String,
    },
}

impl PipelineError {
    /// Shorthand for [`PipelineError::InvalidParameter`].
    pub fn invalid_parameter(parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { parameter: parameter.to_string(), reason: reason.into() }
    }
}

/// Extract a human-readable message from a panic payload.
#[must_use]
pub fn extract_panic_message(panic_info: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
