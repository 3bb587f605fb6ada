//! End-to-end tests for `fqpipe stats`.

use std::path::Path;
use std::process::Command;

use rstest::rstest;
use tempfile::TempDir;

use crate::helpers::{
    TestRecord, generate_records, read_single_row_tsv, write_fasta, write_fastq, write_fastq_bgzf_like,
    write_fastq_gz,
};

/// Values every stats run over `records` must report.
struct Expected {
    records: u64,
    bases: u64,
    min_length: u64,
    max_length: u64,
    n_bases: u64,
    gc_fraction: f64,
    mean_quality: f64,
}

fn expected(records: &[TestRecord]) -> Expected {
    let count = |b: u8| records.iter().map(|r| r.seq.bytes().filter(|&c| c == b).count() as u64).sum::<u64>();
    let gc = count(b'G') + count(b'C');
    let acgt = gc + count(b'A') + count(b'T');
    let quality_sum: u64 = records.iter().flat_map(|r| r.qual.bytes()).map(|q| u64::from(q - 33)).sum();
    let bases: u64 = records.iter().map(|r| r.seq.len() as u64).sum();
    Expected {
        records: records.len() as u64,
        bases,
        min_length: records.iter().map(|r| r.seq.len() as u64).min().unwrap_or(0),
        max_length: records.iter().map(|r| r.seq.len() as u64).max().unwrap_or(0),
        n_bases: count(b'N'),
        gc_fraction: gc as f64 / acgt as f64,
        mean_quality: quality_sum as f64 / bases as f64,
    }
}

fn run_stats(input: &Path, output: &Path, threads: usize, extra: &[&str]) {
    let threads = threads.to_string();
    let status = Command::new(env!("CARGO_BIN_EXE_fqpipe"))
        .args(["stats", "-i", input.to_str().unwrap(), "-o", output.to_str().unwrap(), "--threads", &threads])
        .args(extra)
        .status()
        .expect("Failed to run stats command");
    assert!(status.success(), "stats command failed");
}

fn value<T: std::str::FromStr>(row: &std::collections::HashMap<String, String>, column: &str) -> T
where
    T::Err: std::fmt::Debug,
{
    row.get(column).unwrap_or_else(|| panic!("missing column {column}")).parse().unwrap()
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!((actual - expected).abs() < 1e-3, "{what}: {actual} != {expected}");
}

#[rstest]
#[case::plain_single_thread("reads.fq", 1)]
#[case::plain_threaded("reads.fq", 4)]
#[case::gzip_single_thread("reads.fq.gz", 1)]
#[case::gzip_threaded("reads.fq.gz", 4)]
#[case::bgzf_threaded("reads.bgzf.fq.gz", 3)]
fn test_stats_on_fastq(#[case] file_name: &str, #[case] threads: usize) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join(file_name);
    let output = temp_dir.path().join("stats.txt");
    let records = generate_records(2_500, 1, 150, 42);

    if file_name.contains("bgzf") {
        write_fastq_bgzf_like(&input, &records);
    } else if file_name.ends_with(".gz") {
        write_fastq_gz(&input, &records);
    } else {
        write_fastq(&input, &records);
    }

    run_stats(&input, &output, threads, &["--batch-size", "16"]);

    let want = expected(&records);
    let row = read_single_row_tsv(&output);
    assert_eq!(value::<u64>(&row, "records"), want.records);
    assert_eq!(value::<u64>(&row, "records_with_quality"), want.records);
    assert_eq!(value::<u64>(&row, "bases"), want.bases);
    assert_eq!(value::<u64>(&row, "min_length"), want.min_length);
    assert_eq!(value::<u64>(&row, "max_length"), want.max_length);
    assert_eq!(value::<u64>(&row, "n_bases"), want.n_bases);
    assert_eq!(value::<u64>(&row, "other_bases"), 0);
    assert_close(value(&row, "gc_fraction"), want.gc_fraction, "gc_fraction");
    assert_close(value(&row, "mean_quality"), want.mean_quality, "mean_quality");
}

#[test]
fn test_stats_identical_across_thread_counts() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("reads.fq.gz");
    write_fastq_gz(&input, &generate_records(1_000, 20, 80, 7));

    let single = temp_dir.path().join("single.txt");
    let threaded = temp_dir.path().join("threaded.txt");
    run_stats(&input, &single, 1, &[]);
    run_stats(&input, &threaded, 8, &["--batch-size", "3", "--replication", "3", "--spin", "spin"]);

    assert_eq!(read_single_row_tsv(&single), read_single_row_tsv(&threaded));
}

#[rstest]
#[case(1)]
#[case(4)]
fn test_stats_on_wrapped_fasta(#[case] threads: usize) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("ref.fa");
    let output = temp_dir.path().join("stats.txt");
    let records = generate_records(300, 50, 400, 11);
    write_fasta(&input, &records, 60);

    run_stats(&input, &output, threads, &[]);

    let want = expected(&records);
    let row = read_single_row_tsv(&output);
    assert_eq!(value::<u64>(&row, "records"), want.records);
    assert_eq!(value::<u64>(&row, "records_with_quality"), 0);
    assert_eq!(value::<u64>(&row, "bases"), want.bases);
    assert_eq!(value::<u64>(&row, "max_length"), want.max_length);
    assert_close(value(&row, "gc_fraction"), want.gc_fraction, "gc_fraction");
    assert_close(value(&row, "mean_quality"), 0.0, "mean_quality");
}

#[test]
fn test_stats_on_empty_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("empty.fq");
    let output = temp_dir.path().join("stats.txt");
    write_fastq(&input, &[]);

    run_stats(&input, &output, 2, &[]);

    let row = read_single_row_tsv(&output);
    assert_eq!(value::<u64>(&row, "records"), 0);
    assert_eq!(value::<u64>(&row, "bases"), 0);
    assert_eq!(value::<u64>(&row, "min_length"), 0);
}
