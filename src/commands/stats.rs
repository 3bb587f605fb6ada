//! Summary statistics for a FASTA/FASTQ file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fqpipe_lib::logging::{OperationTimer, log_fastx_stats_summary};
use fqpipe_lib::pipeline::run_pipeline;
use fqpipe_lib::work::FastxStatsCollector;
use fqpipe_metrics::write_metrics_auto;
use log::info;

use crate::commands::command::Command;
use crate::commands::common::{InputOptions, PipelineOptions};

/// Compute record, length, composition and quality statistics.
#[derive(Debug, Parser)]
#[command(
    name = "stats",
    about = "\x1b[38;5;72m[STATISTICS]\x1b[0m     \x1b[36mSummarize a FASTA/FASTQ file\x1b[0m",
    long_about = r#"
Summarize a FASTA or FASTQ file (plain, gzip or BGZF).

One row is written to the output TSV with record and base counts, the
minimum, mean and maximum sequence length, per-base composition (A, C, G, T,
N and other), the GC and N fractions, and the mean Phred+33 quality.

Records are decoded on one thread and handed to the remaining threads in
batches; statistics do not depend on the thread count.

Example usage:
  fqpipe stats -i reads.fq.gz -o reads.stats.txt
  fqpipe stats -i reads.fq.gz -o reads.stats.txt --threads 8
"#
)]
pub struct Stats {
    /// Input options
    #[command(flatten)]
    pub input: InputOptions,

    /// Output metrics file (TSV)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Pipeline options
    #[command(flatten)]
    pub pipeline: PipelineOptions,
}

impl Command for Stats {
    fn execute(&self, command_line: &str) -> Result<()> {
        info!("Command: {command_line}");
        let config = self.pipeline.config()?;
        let source = self.input.open()?;

        let timer = OperationTimer::new("Computing statistics");
        let collector = FastxStatsCollector::new();
        let summary = run_pipeline(&config, source, &collector)?;
        timer.log_completion(summary.records);

        let metric = collector.finish();
        log_fastx_stats_summary(&metric);
        write_metrics_auto(&self.output, &[metric])?;
        info!("Wrote statistics to {}", self.output.display());
        Ok(())
    }
}
