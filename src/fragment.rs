//! Text fragment identifiers.
//!
//! A fragment names a character range of a document, optionally with
//! integrity metadata (the document length and its MD5). Extraction
//! refuses to return text when that metadata no longer matches, which is
//! the signal to relocate the range with [`crate::anchor`].

use std::fmt;

use thiserror::Error;

use crate::anchor::ChecksumAlgorithm;
use crate::domain::Span;

/// Errors when extracting a fragment from a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    #[error("Range {span} is outside a document of {len} characters")]
    OutOfBounds { span: Span, len: usize },

    #[error("Document length changed: expected {expected}, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Document MD5 changed: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// A character range plus optional integrity metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    span: Span,
    length: Option<usize>,
    md5_hex: Option<String>,
}

impl TextFragment {
    pub fn new(span: Span) -> Self {
        Self {
            span,
            length: None,
            md5_hex: None,
        }
    }

    /// Fragment with length and MD5 taken from the document it points into
    pub fn for_document(content: &str, span: Span) -> Self {
        Self::new(span)
            .with_length(content.chars().count())
            .with_md5_hex(hex::encode(ChecksumAlgorithm::Md5.digest(content)))
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_md5_hex(mut self, md5_hex: impl Into<String>) -> Self {
        self.md5_hex = Some(md5_hex.into().to_ascii_lowercase());
        self
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn length(&self) -> Option<usize> {
        self.length
    }

    pub fn md5_hex(&self) -> Option<&str> {
        self.md5_hex.as_deref()
    }

    /// The text the fragment denotes in `content`
    pub fn extract<'a>(&self, content: &'a str) -> Result<&'a str, FragmentError> {
        let len = content.chars().count();

        if let Some(expected) = self.length {
            if expected != len {
                return Err(FragmentError::LengthMismatch {
                    expected,
                    actual: len,
                });
            }
        }

        if let Some(expected) = &self.md5_hex {
            let actual = hex::encode(ChecksumAlgorithm::Md5.digest(content));
            if &actual != expected {
                return Err(FragmentError::ChecksumMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        if self.span.is_inverted() || self.span.end > len {
            return Err(FragmentError::OutOfBounds {
                span: self.span,
                len,
            });
        }

        let mut indices = content
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(content.len()));
        let start = indices.nth(self.span.start).unwrap_or(content.len());
        let end = if self.span.is_empty() {
            start
        } else {
            indices.nth(self.span.len() - 1).unwrap_or(content.len())
        };

        Ok(&content[start..end])
    }
}

impl fmt::Display for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RANGE[{},{}]", self.span.start, self.span.end)?;
        if let Some(length) = self.length {
            write!(f, " LENGTH[{}]", length)?;
        }
        if let Some(md5) = &self.md5_hex {
            write!(f, " MD5[{}]", md5)?;
        }
        Ok(())
    }
}
