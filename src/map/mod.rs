//! Packed `(position, samples)` container.
//!
//! A map is one contiguous buffer of 32-bit words holding zero or more
//! entries head-to-tail, each a [`Header`] followed by that entry's raw
//! sample words. The layout lets whole maps from different time windows be
//! concatenated without touching individual samples, and it is what the
//! storage tier persists verbatim.
//!
//! Entries are never reordered or coalesced: positions are caller-supplied
//! and may repeat or go backwards, although well-behaved writers append in
//! ascending position order.

mod aggregate;
pub mod header;

pub use header::Header;

use crate::array::Array;

/// Words reserved by [`Map::new`] before the first growth.
pub const INITIAL_CAPACITY: usize = 32;

/// A packed sequence of `(position, samples)` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Map {
    words: Vec<u32>,
}

impl Map {
    /// Empty map with a small initial reservation.
    pub fn new() -> Self {
        Map {
            words: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Decode a packed little-endian buffer previously produced by
    /// [`Map::to_bytes`]. A trailing partial word is ignored.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let words = bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect();
        Map { words }
    }

    /// The buffer packed little-endian, four bytes per word.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len_bytes());
        for w in &self.words {
            out.extend_from_slice(&w.to_le_bytes());
        }
        out
    }

    /// Borrowed view of the raw word buffer.
    pub fn as_words(&self) -> &[u32] {
        &self.words
    }

    /// Length of the packed representation in bytes.
    pub fn len_bytes(&self) -> usize {
        self.words.len() * core::mem::size_of::<u32>()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Drop every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Append `samples` as one entry at `position`. Appending an empty
    /// array is a no-op.
    pub fn append(&mut self, position: u32, samples: &Array) {
        self.append_entry(
            position,
            samples.len(),
            samples.as_slice().iter().map(|v| v.to_bits()),
        );
    }

    /// Append the entries of `src` whose position falls in `start..end`,
    /// shifting each appended position by `offset`.
    ///
    /// `end == 0` means "no upper bound" — a sentinel, so position 0 cannot
    /// serve as an exclusive upper bound. Entries before `start` are
    /// skipped; iteration stops at the first entry at or past `end`.
    pub fn concat(&mut self, src: &Map, start: u32, end: u32, offset: u32) {
        for entry in src.entries() {
            if entry.position < start {
                continue;
            }
            if end != 0 && entry.position >= end {
                break;
            }
            self.append_entry(
                entry.position.wrapping_add(offset),
                entry.len(),
                entry.raw().iter().copied(),
            );
        }
    }

    fn append_entry(&mut self, position: u32, len: usize, values: impl Iterator<Item = u32>) {
        if len == 0 {
            return;
        }
        let header = Header::for_entry(position, len);
        self.words.reserve(header.words() + len);
        header.encode(&mut self.words);
        self.words.extend(values);
    }

    /// Iterate entries in buffer order.
    pub fn entries(&self) -> Entries<'_> {
        Entries { words: &self.words }
    }

    /// Every sample in buffer order, ignoring positions.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.entries().flat_map(|e| e.values())
    }
}

/// One decoded entry: a position and the samples behind it.
#[derive(Debug, Clone, Copy)]
pub struct MapEntry<'a> {
    /// Caller-supplied position, usually a time bucket.
    pub position: u32,
    values: &'a [u32],
}

impl<'a> MapEntry<'a> {
    /// Sample count.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Samples in emission order, bit-exact.
    pub fn values(&self) -> impl Iterator<Item = f32> + 'a {
        self.values.iter().map(|&w| f32::from_bits(w))
    }

    /// The raw sample words.
    pub fn raw(&self) -> &'a [u32] {
        self.values
    }
}

/// Iterator over a map's entries; decodes one header at a time.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    words: &'a [u32],
}

impl<'a> Iterator for Entries<'a> {
    type Item = MapEntry<'a>;

    fn next(&mut self) -> Option<MapEntry<'a>> {
        if self.words.is_empty() {
            return None;
        }
        let header = Header::decode(self.words);
        let start = header.words();
        let end = start + header.len();
        let entry = MapEntry {
            position: header.position(),
            values: &self.words[start..end],
        };
        self.words = &self.words[end..];
        Some(entry)
    }
}

/// Words an entry of `len` samples at `position` occupies, header included.
pub fn entry_words(position: u32, len: usize) -> usize {
    Header::for_entry(position, len).words() + len
}
