//! crates/luminary_core/src/span.rs
//!
//! Half-open `[start, end)` byte ranges over a text buffer, and the one overlap
//! predicate every insertion path uses.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A half-open byte range `[start, end)` into a UTF-8 text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Builds the span covering `needle` if it were found at `start`.
    pub fn at(start: usize, needle: &str) -> Self {
        Self::new(start, start + needle.len())
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True interval intersection. Touching spans (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the span is non-empty and fits in a buffer of `len` bytes.
    pub fn fits(&self, len: usize) -> bool {
        self.start < self.end && self.end <= len
    }

    /// Slices `text`, or `None` when the span is out of range or splits a char.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

/// Ascending by `start`, ties broken by `end`.
pub fn compare_by_start(a: &Span, b: &Span) -> Ordering {
    a.start.cmp(&b.start).then(a.end.cmp(&b.end))
}

/// Largest char boundary in `text` that is `<= index`, clamped to `text.len()`.
pub(crate) fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}
