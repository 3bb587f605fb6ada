//! Error path integration tests.
//!
//! Bad options, missing or malformed input, and failures raised inside the
//! pipeline must all end the process with a non-zero status and a useful message.

use std::process::{Command, Output};

use rstest::rstest;
use tempfile::TempDir;

use fqpipe_lib::errors::PipelineError;
use fqpipe_lib::pipeline::{DecodeErrorPolicy, PipelineConfig, run_pipeline};
use fqpipe_lib::record::RecordSlot;
use fqpipe_lib::source::{MemoryItem, MemorySource};

use crate::helpers::{generate_records, write_fastq, write_text};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fqpipe")).args(args).output().expect("Failed to run fqpipe")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_missing_input_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("nope.fq");
    let out = temp_dir.path().join("stats.txt");

    let output = run(&["stats", "-i", missing.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does not exist"), "unexpected stderr: {}", stderr(&output));
    assert!(!out.exists());
}

#[rstest]
#[case::zero_threads(&["--threads", "0"], "threads")]
#[case::zero_batch(&["--threads", "2", "--batch-size", "0"], "batch-size")]
#[case::low_replication(&["--threads", "2", "--replication", "1"], "replication")]
fn test_invalid_pipeline_options(#[case] options: &[&str], #[case] parameter: &str) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("reads.fq");
    write_fastq(&input, &generate_records(10, 5, 10, 1));

    let mut args = vec!["validate", "-i", input.to_str().unwrap()];
    args.extend_from_slice(options);
    let output = run(&args);

    assert!(!output.status.success());
    let message = stderr(&output);
    assert!(message.contains(&format!("Invalid parameter '{parameter}'")), "unexpected stderr: {message}");
}

#[test]
fn test_unknown_spin_strategy_rejected_by_parser() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("reads.fq");
    write_fastq(&input, &generate_records(1, 5, 5, 1));

    let output = run(&["validate", "-i", input.to_str().unwrap(), "--spin", "sleep"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--spin"));
}

#[rstest]
#[case(1)]
#[case(4)]
fn test_truncated_fastq_reports_decode_error(#[case] threads: usize) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("truncated.fq");
    let out = temp_dir.path().join("stats.txt");
    write_text(&input, "@r0\nACGT\n+\nIIII\n@r1\nACGT\n+\nIIII\n@r2\nACGT\n");

    let threads = threads.to_string();
    let output = run(&["stats", "-i", input.to_str().unwrap(), "-o", out.to_str().unwrap(), "-t", &threads]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to decode record 2"), "unexpected stderr: {}", stderr(&output));
    assert!(!out.exists());
}

fn with_errors(resumable: bool) -> MemorySource {
    let mut items: Vec<MemoryItem> =
        (0..100).map(|i| MemoryItem::fastq(format!("r{i}"), "ACGT", "IIII")).collect();
    items.insert(40, MemoryItem::Error { message: "corrupt record".to_string(), resumable });
    items.insert(70, MemoryItem::Error { message: "corrupt record".to_string(), resumable });
    MemorySource::new(items)
}

#[rstest]
#[case(1)]
#[case(3)]
fn test_resumable_decode_errors_skipped_when_requested(#[case] threads: usize) {
    let names = parking_lot::Mutex::new(Vec::new());
    let processor = |slot: &RecordSlot| -> anyhow::Result<()> {
        names.lock().push(String::from_utf8(slot.name().to_vec())?);
        Ok(())
    };
    let config = PipelineConfig::new(threads)
        .with_batch_capacity(4)
        .with_decode_errors(DecodeErrorPolicy::Skip)
        .with_progress_interval(0);

    let summary = run_pipeline(&config, with_errors(true), &processor).unwrap();

    assert_eq!(summary.records, 100);
    assert_eq!(summary.stats.decode_errors_skipped, 2);
    let mut names = names.into_inner();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 100);
}

#[rstest]
#[case(DecodeErrorPolicy::Fail, true)]
#[case(DecodeErrorPolicy::Fail, false)]
#[case(DecodeErrorPolicy::Skip, false)]
fn test_fatal_decode_errors_abort(#[case] policy: DecodeErrorPolicy, #[case] resumable: bool) {
    let processor = |_: &RecordSlot| -> anyhow::Result<()> { Ok(()) };
    let config =
        PipelineConfig::new(2).with_batch_capacity(4).with_decode_errors(policy).with_progress_interval(0);

    let err = run_pipeline(&config, with_errors(resumable), &processor).unwrap_err();
    match err {
        PipelineError::Decode { record, reason } => {
            assert_eq!(record, 40);
            assert_eq!(reason, "corrupt record");
        }
        other => panic!("unexpected error: {other}"),
    }
}
