//! Character-offset view over a UTF-8 document.
//!
//! Spans are expressed in characters while Rust strings index by byte.
//! `CharText` records the byte offset of every character boundary once per
//! call so both directions of the mapping are cheap.

use crate::domain::Span;
use crate::error::{AnchorError, Result};

/// A document with a char-to-byte boundary table
#[derive(Debug)]
pub(crate) struct CharText<'a> {
    text: &'a str,
    /// Byte offset of each char, plus `text.len()` as the final entry
    boundaries: Vec<usize>,
}

impl<'a> CharText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Substring between two char offsets, clamped to the document
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let len = self.char_len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }

    /// Substring denoted by a span, rejecting out-of-range or inverted spans
    pub fn span_text(&self, span: Span) -> Result<&'a str> {
        self.check_span(span)?;
        Ok(self.slice(span.start, span.end))
    }

    pub fn check_span(&self, span: Span) -> Result<()> {
        let len = self.char_len();
        if span.is_inverted() || span.end > len {
            return Err(AnchorError::InvalidSpan {
                start: span.start,
                end: span.end,
                len,
            });
        }
        Ok(())
    }

    /// Char offset of a byte offset that falls on a char boundary
    pub fn char_offset(&self, byte_offset: usize) -> usize {
        match self.boundaries.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }
}
