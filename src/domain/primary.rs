//! Primaries: the documents being annotated.
//!
//! The anchoring core only needs to read a primary's full text. Each
//! implementation declares which [`PrimaryKind`] it is so that evidence
//! captured against one kind is never silently applied to another.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Closed set of primary kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryKind {
    /// Already-decoded text
    Text,
    /// Raw UTF-8 bytes, decoded on access
    Bytes,
}

impl PrimaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryKind::Text => "text",
            PrimaryKind::Bytes => "bytes",
        }
    }
}

impl fmt::Display for PrimaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability shared by every primary: expose the full text content
pub trait Primary {
    /// Kind tag recorded into captured evidence
    fn kind(&self) -> PrimaryKind;

    /// Full document text at the time of the call
    fn content(&self) -> Result<Cow<'_, str>>;
}

/// A primary holding decoded text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrimary {
    content: String,
}

impl TextPrimary {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl From<String> for TextPrimary {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

impl From<&str> for TextPrimary {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl Primary for TextPrimary {
    fn kind(&self) -> PrimaryKind {
        PrimaryKind::Text
    }

    fn content(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(&self.content))
    }
}

/// A primary holding raw bytes as read from disk
///
/// Decoding happens on every `content()` call and fails with
/// [`AnchorError::Encoding`](crate::AnchorError::Encoding) for invalid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytePrimary {
    bytes: Vec<u8>,
}

impl BytePrimary {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Primary for BytePrimary {
    fn kind(&self) -> PrimaryKind {
        PrimaryKind::Bytes
    }

    fn content(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(std::str::from_utf8(&self.bytes)?))
    }
}

impl Primary for str {
    fn kind(&self) -> PrimaryKind {
        PrimaryKind::Text
    }

    fn content(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self))
    }
}

impl Primary for String {
    fn kind(&self) -> PrimaryKind {
        PrimaryKind::Text
    }

    fn content(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnchorError;

    #[test]
    fn test_text_primary_content() {
        let primary = TextPrimary::new("hello");
        assert_eq!(primary.kind(), PrimaryKind::Text);
        assert_eq!(primary.content().unwrap(), "hello");
        assert_eq!("hello".kind(), PrimaryKind::Text);
    }

    #[test]
    fn test_byte_primary_decodes_utf8() {
        let primary = BytePrimary::new("grüße".as_bytes());
        assert_eq!(primary.kind(), PrimaryKind::Bytes);
        assert_eq!(primary.content().unwrap(), "grüße");
    }

    #[test]
    fn test_byte_primary_invalid_utf8() {
        let primary = BytePrimary::new(vec![0x66, 0x6f, 0xff, 0x6f]);
        let err = primary.content().unwrap_err();
        assert!(matches!(err, AnchorError::Encoding(_)));
    }
}
