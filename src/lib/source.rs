//! Sequential record sources.
//!
//! The pipeline pulls records through the [`RecordSource`] trait, one at a
//! time and in order. [`FastxSource`] reads FASTA or FASTQ from a file that
//! may be plain, gzip or BGZF compressed; [`MemorySource`] serves records
//! held in memory and can inject decode failures.

use std::borrow::Cow;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;
use seq_io::fasta::Reader as FastaReader;
use seq_io::fasta::Record as FastaRecordTrait;
use seq_io::fastq::Reader as FastqReader;
use seq_io::fastq::Record as FastqRecordTrait;
use thiserror::Error;

use crate::errors::{PipelineError, Result};
use crate::record::SourceRecord;

/// Default read buffer size for file sources (1 MiB).
pub const BUFFER_SIZE: usize = 1024 * 1024;

/// A failure to decode the next record.
///
/// `resumable` tells the producer whether asking the source for the next
/// record after this error is meaningful. Only resumable errors may be skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("record {record}: {message}")]
pub struct DecodeError {
    /// Ordinal of the failing record (records yielded plus errors seen so far)
    pub record: u64,
    /// Human-readable description
    pub message: String,
    /// Whether the source can continue past this record
    pub resumable: bool,
}

impl From<DecodeError> for PipelineError {
    fn from(e: DecodeError) -> Self {
        PipelineError::Decode { record: e.record, reason: e.message }
    }
}

/// A sequential supplier of records.
///
/// Implementations hand out borrowed views that stay valid until the next call.
pub trait RecordSource {
    /// Decode the next record. `Ok(None)` marks the end of the stream.
    fn decode_next(&mut self) -> std::result::Result<Option<SourceRecord<'_>>, DecodeError>;
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn decode_next(&mut self) -> std::result::Result<Option<SourceRecord<'_>>, DecodeError> {
        (**self).decode_next()
    }
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    fn decode_next(&mut self) -> std::result::Result<Option<SourceRecord<'_>>, DecodeError> {
        (**self).decode_next()
    }
}

/// Compression format detected from file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// BGZF format (blocked gzip)
    Bgzf,
    /// Standard gzip format
    Gzip,
    /// Uncompressed file
    Plain,
}

/// Record layout detected from the first byte of the decompressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastxFormat {
    /// `@` records with qualities
    Fastq,
    /// `>` records without qualities
    Fasta,
}

impl Display for FastxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FastxFormat::Fastq => write!(f, "FASTQ"),
            FastxFormat::Fasta => write!(f, "FASTA"),
        }
    }
}

/// Detect the compression format of a file by reading its header.
///
/// BGZF files are identified by:
/// - Gzip magic number (0x1f 0x8b)
/// - Deflate compression method (0x08)
/// - FEXTRA flag set (0x04)
/// - Extra field with SI1='B' (0x42), SI2='C' (0x43)
///
/// # Errors
/// Returns an I/O error if the file cannot be opened or read.
pub fn detect_compression_format(path: &Path) -> io::Result<CompressionFormat> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 18];
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(compression_from_header(&header[..filled]))
}

fn compression_from_header(header: &[u8]) -> CompressionFormat {
    if header.len() < 2 || header[0] != 0x1f || header[1] != 0x8b {
        return CompressionFormat::Plain;
    }
    if header.len() >= 18 && header[2] == 0x08 && (header[3] & 0x04) != 0 {
        let xlen = u16::from_le_bytes([header[10], header[11]]) as usize;
        if xlen >= 6 && header[12] == b'B' && header[13] == b'C' {
            return CompressionFormat::Bgzf;
        }
    }
    CompressionFormat::Gzip
}

/// Peek at the stream to decide between FASTA and FASTQ without consuming it.
///
/// Leading blank lines are skipped. An empty stream is treated as FASTQ.
fn detect_fastx_format(reader: &mut dyn BufRead) -> io::Result<FastxFormat> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(FastxFormat::Fastq);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                let format =
                    if buf[pos] == b'>' { FastxFormat::Fasta } else { FastxFormat::Fastq };
                reader.consume(pos);
                return Ok(format);
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Boxed, already-decompressed input stream.
pub type BoxedRead = Box<dyn BufRead + Send>;

enum FastxReader {
    Fastq(FastqReader<BoxedRead>),
    Fasta(FastaReader<BoxedRead>),
}

/// Owned copy of the most recent record.
///
/// seq_io records borrow the reader's internal buffer only as long as the
/// record value lives, so each record is copied here before it is handed out.
#[derive(Default)]
struct CurrentRecord {
    head: Vec<u8>,
    seq: Vec<u8>,
    qual: Vec<u8>,
    has_qual: bool,
}

impl CurrentRecord {
    fn set_fastq(&mut self, head: &[u8], seq: &[u8], qual: &[u8]) {
        self.head.clear();
        self.head.extend_from_slice(head);
        self.seq.clear();
        self.seq.extend_from_slice(seq);
        self.qual.clear();
        self.qual.extend_from_slice(qual);
        self.has_qual = true;
    }

    fn set_fasta<'a>(&mut self, head: &[u8], lines: impl Iterator<Item = &'a [u8]>) {
        self.head.clear();
        self.head.extend_from_slice(head);
        self.seq.clear();
        for line in lines {
            self.seq.extend_from_slice(line);
        }
        self.qual.clear();
        self.has_qual = false;
    }

    fn view(&self) -> SourceRecord<'_> {
        SourceRecord {
            head: &self.head,
            seq: Cow::Borrowed(&self.seq),
            qual: self.has_qual.then_some(self.qual.as_slice()),
        }
    }
}

/// A FASTA/FASTQ file source with automatic compression and format detection.
pub struct FastxSource {
    reader: FastxReader,
    current: CurrentRecord,
    format: FastxFormat,
    compression: CompressionFormat,
    ordinal: u64,
}

impl FastxSource {
    /// Open `path`, detecting gzip/BGZF compression and FASTA/FASTQ layout.
    ///
    /// # Errors
    /// Returns [`PipelineError::SourceOpen`] if the file cannot be opened or its
    /// first bytes cannot be read.
    pub fn open(path: &Path, buffer_size: usize) -> Result<Self> {
        let open_error =
            |source: io::Error| PipelineError::SourceOpen { path: path.to_path_buf(), source };

        let compression = detect_compression_format(path).map_err(open_error)?;
        let file = File::open(path).map_err(open_error)?;
        let inner: BoxedRead = match compression {
            CompressionFormat::Bgzf | CompressionFormat::Gzip => {
                debug!("Detected {compression:?}-compressed input {}", path.display());
                Box::new(BufReader::with_capacity(buffer_size, MultiGzDecoder::new(file)))
            }
            CompressionFormat::Plain => {
                debug!("Detected uncompressed input {}", path.display());
                Box::new(BufReader::with_capacity(buffer_size, file))
            }
        };
        Self::from_reader(inner, compression, buffer_size).map_err(open_error)
    }

    /// Wrap an already-decompressed stream.
    ///
    /// # Errors
    /// Returns an I/O error if the stream cannot be peeked.
    pub fn from_reader(
        mut inner: BoxedRead,
        compression: CompressionFormat,
        buffer_size: usize,
    ) -> io::Result<Self> {
        let format = detect_fastx_format(inner.as_mut())?;
        debug!("Detected {format} records");
        let reader = match format {
            FastxFormat::Fastq => FastxReader::Fastq(FastqReader::with_capacity(inner, buffer_size)),
            FastxFormat::Fasta => FastxReader::Fasta(FastaReader::with_capacity(inner, buffer_size)),
        };
        Ok(Self { reader, current: CurrentRecord::default(), format, compression, ordinal: 0 })
    }

    /// Record layout of this source.
    #[must_use]
    pub fn format(&self) -> FastxFormat {
        self.format
    }

    /// Compression of the underlying file.
    #[must_use]
    pub fn compression(&self) -> CompressionFormat {
        self.compression
    }
}

impl RecordSource for FastxSource {
    // seq_io leaves the reader position unspecified after a parse error, so no
    // error read from a file is resumable.
    fn decode_next(&mut self) -> std::result::Result<Option<SourceRecord<'_>>, DecodeError> {
        let ordinal = self.ordinal;
        let decode_error =
            |message: String| DecodeError { record: ordinal, message, resumable: false };
        let current = &mut self.current;
        let found = match &mut self.reader {
            FastxReader::Fastq(reader) => match reader.next() {
                None => false,
                Some(Err(e)) => return Err(decode_error(e.to_string())),
                Some(Ok(rec)) => {
                    current.set_fastq(rec.head(), rec.seq(), rec.qual());
                    true
                }
            },
            FastxReader::Fasta(reader) => match reader.next() {
                None => false,
                Some(Err(e)) => return Err(decode_error(e.to_string())),
                Some(Ok(rec)) => {
                    current.set_fasta(rec.head(), rec.seq_lines());
                    true
                }
            },
        };
        if !found {
            return Ok(None);
        }
        self.ordinal += 1;
        Ok(Some(self.current.view()))
    }
}

/// One entry served by a [`MemorySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryItem {
    /// A record with header, sequence and optional quality
    Record {
        /// Header line without the marker
        head: Vec<u8>,
        /// Sequence bases
        seq: Vec<u8>,
        /// Quality string
        qual: Option<Vec<u8>>,
    },
    /// A decode failure reported in place of a record
    Error {
        /// Message reported to the producer
        message: String,
        /// Whether the source continues after this entry
        resumable: bool,
    },
}

impl MemoryItem {
    /// A FASTQ-style record.
    pub fn fastq(head: impl Into<Vec<u8>>, seq: impl Into<Vec<u8>>, qual: impl Into<Vec<u8>>) -> Self {
        MemoryItem::Record { head: head.into(), seq: seq.into(), qual: Some(qual.into()) }
    }

    /// A FASTA-style record.
    pub fn fasta(head: impl Into<Vec<u8>>, seq: impl Into<Vec<u8>>) -> Self {
        MemoryItem::Record { head: head.into(), seq: seq.into(), qual: None }
    }
}

/// An in-memory source, useful for tests, benchmarks and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: Vec<MemoryItem>,
    next: usize,
}

impl MemorySource {
    /// Serve `items` in order.
    #[must_use]
    pub fn new(items: Vec<MemoryItem>) -> Self {
        Self { items, next: 0 }
    }

    /// `count` FASTQ records named `r{i}` with a fixed 8 bp sequence.
    #[must_use]
    pub fn numbered(count: usize) -> Self {
        let items =
            (0..count).map(|i| MemoryItem::fastq(format!("r{i}"), "ACGTACGT", "IIIIIIII")).collect();
        Self::new(items)
    }

    /// Entries not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.items.len() - self.next
    }
}

impl RecordSource for MemorySource {
    fn decode_next(&mut self) -> std::result::Result<Option<SourceRecord<'_>>, DecodeError> {
        let Some(item) = self.items.get(self.next) else {
            return Ok(None);
        };
        let ordinal = self.next as u64;
        self.next += 1;
        match item {
            MemoryItem::Record { head, seq, qual } => Ok(Some(SourceRecord {
                head: head.as_slice(),
                seq: Cow::Borrowed(seq.as_slice()),
                qual: qual.as_deref(),
            })),
            MemoryItem::Error { message, resumable } => {
                if !*resumable {
                    self.next = self.items.len();
                }
                Err(DecodeError { record: ordinal, message: message.clone(), resumable: *resumable })
            }
        }
    }
}
