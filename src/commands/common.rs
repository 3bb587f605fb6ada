//! Common CLI options shared across commands.
//!
//! Composed into command structs with `#[command(flatten)]`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use fqpipe_lib::pipeline::config::{DEFAULT_BATCH_CAPACITY, DEFAULT_PROGRESS_INTERVAL, DEFAULT_REPLICATION};
use fqpipe_lib::pipeline::{PipelineConfig, SpinStrategy};
use fqpipe_lib::source::{BUFFER_SIZE, FastxSource};
use fqpipe_lib::validation::validate_file_exists;
use log::info;

/// The FASTA/FASTQ input of a command.
#[derive(Debug, Clone, Args)]
pub struct InputOptions {
    /// Input FASTA or FASTQ file, optionally gzip or BGZF compressed
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
}

impl InputOptions {
    /// Check the input exists, then open it and log what was detected.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be opened.
    pub fn open(&self) -> Result<FastxSource> {
        validate_file_exists(&self.input, "Input file")?;
        let source = FastxSource::open(&self.input, BUFFER_SIZE)
            .with_context(|| format!("Failed to open {}", self.input.display()))?;
        info!("Input: {} ({}, {:?})", self.input.display(), source.format(), source.compression());
        Ok(source)
    }
}

/// Options controlling the producer/consumer pipeline.
#[derive(Debug, Clone, Args)]
pub struct PipelineOptions {
    /// Total number of threads, including the decoding thread.
    ///
    /// With 1 thread every record is decoded and processed on the same thread.
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    pub threads: usize,

    /// Number of records handed to a worker at a time
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_CAPACITY)]
    pub batch_size: usize,

    /// Record slots per worker, as a multiple of the batch size (at least 2)
    #[arg(long = "replication", default_value_t = DEFAULT_REPLICATION)]
    pub replication: usize,

    /// How idle threads wait for work.
    ///
    /// - `backoff` (default): yield, then sleep with exponential backoff up to 1ms.
    ///
    /// - `spin`: busy-wait. Lowest latency, but every idle thread uses a full core.
    #[arg(long = "spin", value_enum, default_value_t = SpinStrategy::default())]
    pub spin: SpinStrategy,

    /// Log progress every N records (0 disables)
    #[arg(long = "progress-interval", default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    pub progress_interval: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            batch_size: DEFAULT_BATCH_CAPACITY,
            replication: DEFAULT_REPLICATION,
            spin: SpinStrategy::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl PipelineOptions {
    /// Build and validate the pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any option is out of range.
    pub fn config(&self) -> Result<PipelineConfig> {
        let config = PipelineConfig::new(self.threads)
            .with_batch_capacity(self.batch_size)
            .with_replication(self.replication)
            .with_spin(self.spin)
            .with_progress_interval(self.progress_interval);
        config.validate()?;
        Ok(config)
    }
}
