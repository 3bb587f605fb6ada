//! Deterministic FASTA/FASTQ fixtures.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::GzBuilder;
use flate2::write::GzEncoder;

/// One generated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub name: String,
    pub seq: String,
    pub qual: String,
}

/// Small linear congruential generator so fixtures are reproducible without extra dependencies.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }
}

/// Generate `count` records with lengths between `min_len` and `max_len` inclusive.
///
/// Bases are drawn from `ACGTN`; qualities from `#`..`J`.
pub fn generate_records(count: usize, min_len: usize, max_len: usize, seed: u64) -> Vec<TestRecord> {
    let mut rng = Lcg(seed);
    (0..count)
        .map(|i| {
            let span = (max_len - min_len + 1) as u64;
            let len = min_len + (rng.next() % span) as usize;
            let seq: String = (0..len).map(|_| b"ACGTN"[(rng.next() % 5) as usize] as char).collect();
            let qual: String = (0..len).map(|_| (b'#' + (rng.next() % 40) as u8) as char).collect();
            TestRecord { name: format!("read{i}"), seq, qual }
        })
        .collect()
}

fn write_fastq_to(writer: &mut impl Write, records: &[TestRecord]) {
    for r in records {
        writeln!(writer, "@{} sample=1\n{}\n+\n{}", r.name, r.seq, r.qual).unwrap();
    }
}

/// Write records as plain FASTQ.
pub fn write_fastq(path: &Path, records: &[TestRecord]) {
    let mut writer = BufWriter::new(File::create(path).unwrap());
    write_fastq_to(&mut writer, records);
    writer.flush().unwrap();
}

/// Write records as gzip-compressed FASTQ.
pub fn write_fastq_gz(path: &Path, records: &[TestRecord]) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
    write_fastq_to(&mut encoder, records);
    encoder.finish().unwrap();
}

/// Write records as FASTQ in a gzip member carrying the BGZF `BC` extra subfield.
pub fn write_fastq_bgzf_like(path: &Path, records: &[TestRecord]) {
    let mut encoder = GzBuilder::new()
        .extra(vec![b'B', b'C', 2, 0, 0, 0])
        .write(File::create(path).unwrap(), Compression::fast());
    write_fastq_to(&mut encoder, records);
    encoder.finish().unwrap();
}

/// Write records as FASTA, wrapping sequences at `line_width` bases.
pub fn write_fasta(path: &Path, records: &[TestRecord], line_width: usize) {
    let mut writer = BufWriter::new(File::create(path).unwrap());
    for r in records {
        writeln!(writer, ">{}", r.name).unwrap();
        if r.seq.is_empty() {
            writeln!(writer).unwrap();
        }
        for chunk in r.seq.as_bytes().chunks(line_width) {
            writer.write_all(chunk).unwrap();
            writeln!(writer).unwrap();
        }
    }
    writer.flush().unwrap();
}

/// Write raw text to `path`.
pub fn write_text(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}
