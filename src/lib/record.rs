//! Reusable record storage.
//!
//! A [`RecordSlot`] owns the buffers for one decoded record. Slots are created
//! once, filled by the producer with [`RecordSlot::copy_from`], and cleared
//! with [`RecordSlot::reset`] when they go back to the recycle pool. Buffer
//! capacity is kept across resets, so a slot that has held a long read never
//! reallocates for a shorter one.

use std::borrow::Cow;

/// Initial capacity reserved for the sequence and quality buffers of a fresh slot.
pub const DEFAULT_SEQ_CAPACITY: usize = 256;

/// Initial capacity reserved for the name and comment buffers of a fresh slot.
pub const DEFAULT_NAME_CAPACITY: usize = 64;

/// A borrowed view of one record as produced by a [`crate::source::RecordSource`].
///
/// `head` is the full header line without the leading `@`/`>`. `seq` is
/// borrowed when the source can hand out a contiguous slice and owned when it
/// had to join wrapped lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord<'a> {
    /// Header line without the record marker
    pub head: &'a [u8],
    /// Sequence bases
    pub seq: Cow<'a, [u8]>,
    /// Quality string, `None` for FASTA
    pub qual: Option<&'a [u8]>,
}

impl<'a> SourceRecord<'a> {
    /// Build a view from borrowed FASTQ-style fields.
    #[must_use]
    pub fn new(head: &'a [u8], seq: &'a [u8], qual: Option<&'a [u8]>) -> Self {
        Self { head, seq: Cow::Borrowed(seq), qual }
    }
}

/// Storage for one record, reused across batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSlot {
    index: u64,
    name: Vec<u8>,
    comment: Vec<u8>,
    seq: Vec<u8>,
    qual: Vec<u8>,
    has_qual: bool,
}

impl RecordSlot {
    /// Create an empty slot with default buffer capacities.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: 0,
            name: Vec::with_capacity(DEFAULT_NAME_CAPACITY),
            comment: Vec::with_capacity(DEFAULT_NAME_CAPACITY),
            seq: Vec::with_capacity(DEFAULT_SEQ_CAPACITY),
            qual: Vec::with_capacity(DEFAULT_SEQ_CAPACITY),
            has_qual: false,
        }
    }

    /// Deep-copy `record` into this slot.
    ///
    /// The header is split at the first space or tab: everything before is the
    /// name, everything after (leading whitespace trimmed) is the comment.
    /// Previous contents are discarded; buffers grow only when needed.
    pub fn copy_from(&mut self, index: u64, record: &SourceRecord<'_>) {
        self.index = index;
        let (name, comment) = split_header(record.head);
        overwrite(&mut self.name, name);
        overwrite(&mut self.comment, comment);
        overwrite(&mut self.seq, &record.seq);
        match record.qual {
            Some(qual) => {
                overwrite(&mut self.qual, qual);
                self.has_qual = true;
            }
            None => {
                self.qual.clear();
                self.has_qual = false;
            }
        }
    }

    /// Empty the slot, keeping buffer capacity.
    pub fn reset(&mut self) {
        self.index = 0;
        self.name.clear();
        self.comment.clear();
        self.seq.clear();
        self.qual.clear();
        self.has_qual = false;
    }

    /// Zero-based position of the record in the source.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Read name (header up to the first whitespace).
    #[must_use]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Header text after the name, empty if absent.
    #[must_use]
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    /// Sequence bases.
    #[must_use]
    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    /// Quality string, `None` for records decoded without qualities.
    #[must_use]
    pub fn qual(&self) -> Option<&[u8]> {
        self.has_qual.then_some(self.qual.as_slice())
    }

    /// Number of bases in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// True when the slot holds no sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Bytes reserved by the slot's buffers.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.name.capacity() + self.comment.capacity() + self.seq.capacity() + self.qual.capacity()
    }
}

fn overwrite(dst: &mut Vec<u8>, src: &[u8]) {
    dst.clear();
    dst.extend_from_slice(src);
}

fn split_header(head: &[u8]) -> (&[u8], &[u8]) {
    match head.iter().position(|&b| b == b' ' || b == b'\t') {
        Some(pos) => {
            let rest = &head[pos + 1..];
            let start = rest.iter().position(|&b| b != b' ' && b != b'\t').unwrap_or(rest.len());
            (&head[..pos], &rest[start..])
        }
        None => (head, &[]),
    }
}
