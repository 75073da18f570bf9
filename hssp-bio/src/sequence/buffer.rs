use crate::alphabet::{is_gap, BLANK, DELETION_MARKER};
use std::fmt;
use std::ops::Index;

/// Initial growth step of a [`SequenceBuffer`]
pub const BLOCK_SIZE: usize = 512;

/// Growable buffer holding one aligned sequence, gap characters included.
///
/// The buffer is exclusively owned; it is filled by appending alignment
/// fragments and then moved into its record. Capacity grows by doubling,
/// starting from [`BLOCK_SIZE`], or to the exact size of an oversized append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceBuffer {
    data: Vec<u8>,
}

impl SequenceBuffer {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buffer = Self::new();
        buffer.append(bytes);
        buffer
    }

    pub fn append(&mut self, text: &[u8]) {
        let needed = self.data.len() + text.len();
        if needed > self.data.capacity() {
            let current = match self.data.capacity() {
                0 => BLOCK_SIZE,
                n => n,
            };
            let target = (current * 2).max(needed);
            self.data.reserve_exact(target - self.data.len());
        }
        self.data.extend_from_slice(text);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, column: usize) -> Option<u8> {
        self.data.get(column).copied()
    }

    /// Number of non-gap characters
    pub fn residue_count(&self) -> usize {
        self.data.iter().filter(|&&c| !is_gap(c)).count()
    }

    /// Lower-case the character at `column` and return it
    pub fn lower_case_at(&mut self, column: usize) -> u8 {
        let c = &mut self.data[column];
        c.make_ascii_lowercase();
        *c
    }

    /// Blank every column outside `[begin, end)` and turn gaps inside it
    /// into deletion markers.
    pub fn trim_to(&mut self, begin: usize, end: usize) {
        debug_assert!(begin <= end && end <= self.data.len());

        for (column, c) in self.data.iter_mut().enumerate() {
            if column < begin || column >= end {
                *c = BLANK;
            } else if is_gap(*c) {
                *c = DELETION_MARKER;
            }
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Index<usize> for SequenceBuffer {
    type Output = u8;

    fn index(&self, column: usize) -> &u8 {
        &self.data[column]
    }
}

impl fmt::Display for SequenceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.data))
    }
}
