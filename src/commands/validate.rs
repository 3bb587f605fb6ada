//! Structural validation of FASTA/FASTQ records.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use fqpipe_lib::logging::{OperationTimer, format_count, log_validation_summary};
use fqpipe_lib::pipeline::run_pipeline;
use fqpipe_lib::work::RecordValidator;
use fqpipe_metrics::write_metrics_auto;
use log::info;

use crate::commands::command::Command;
use crate::commands::common::{InputOptions, PipelineOptions};

/// Check every record of a FASTA/FASTQ file.
#[derive(Debug, Parser)]
#[command(
    name = "validate",
    about = "\x1b[38;5;72m[STATISTICS]\x1b[0m     \x1b[36mValidate the records of a FASTA/FASTQ file\x1b[0m",
    long_about = r#"
Validate every record of a FASTA or FASTQ file (plain, gzip or BGZF).

Each record is checked for:
  - a non-empty read name
  - sequence symbols in the IUPAC nucleotide alphabet (either case)
  - a quality string as long as the sequence (FASTQ)
  - quality characters in the Phred+33 range '!'..'~' (FASTQ)

By default every record is checked, the first few problems are logged, and
the command fails at the end if any record was invalid. With --fail-fast the
run stops at the first invalid record.

Example usage:
  fqpipe validate -i reads.fq.gz
  fqpipe validate -i reads.fq.gz -o validation.txt --threads 4
  fqpipe validate -i reads.fq.gz --fail-fast
"#
)]
pub struct Validate {
    /// Input options
    #[command(flatten)]
    pub input: InputOptions,

    /// Optional output metrics file (TSV)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Stop at the first invalid record
    #[arg(long = "fail-fast", default_value = "false")]
    pub fail_fast: bool,

    /// Pipeline options
    #[command(flatten)]
    pub pipeline: PipelineOptions,
}

impl Command for Validate {
    fn execute(&self, command_line: &str) -> Result<()> {
        info!("Command: {command_line}");
        let config = self.pipeline.config()?;
        let source = self.input.open()?;

        let timer = OperationTimer::new("Validating records");
        let validator = RecordValidator::new(self.fail_fast);
        let summary = run_pipeline(&config, source, &validator)?;
        timer.log_completion(summary.records);

        let metric = validator.finish();
        log_validation_summary(&metric);
        if let Some(output) = &self.output {
            write_metrics_auto(output, &[metric.clone()])?;
            info!("Wrote validation metrics to {}", output.display());
        }
        if !metric.is_clean() {
            bail!("{} of {} records are invalid", format_count(metric.invalid_records), format_count(metric.records));
        }
        Ok(())
    }
}
