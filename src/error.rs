//! Error types for anchor capture, verification and relocation.

use std::fmt;
use std::str::Utf8Error;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PrimaryKind;

/// Result alias used throughout the anchoring core
pub type Result<T> = std::result::Result<T, AnchorError>;

/// Errors that can occur while capturing or resolving an anchor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    #[error("Unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Document content is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),

    #[error("No match found: {0}")]
    NoMatchFound(NoMatchReason),

    #[error("Invalid primary: evidence was captured against {expected}, got {actual}")]
    InvalidPrimary {
        expected: PrimaryKind,
        actual: PrimaryKind,
    },

    #[error("Span [{start}, {end}) is invalid for a document of {len} characters")]
    InvalidSpan { start: usize, end: usize, len: usize },
}

impl AnchorError {
    /// True if this is a relocation miss (recoverable: the anchor is orphaned)
    pub fn is_no_match(&self) -> bool {
        matches!(self, AnchorError::NoMatchFound(_))
    }
}

/// Why a relocation could not produce a confident span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoMatchReason {
    /// Before or after context has no occurrence in the document
    ContextNotFound,
    /// An inner sample (or the full span text) has no occurrence
    SampleNotFound,
    /// Samples were found but too far from where they were expected
    OutOfTolerance { drift: usize, tolerance: usize },
    /// The located end precedes the located start
    InvertedSpan { start: usize, end: usize },
    /// The evidence carries nothing to fall back on
    NoEvidence,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatchReason::ContextNotFound => write!(f, "context not found"),
            NoMatchReason::SampleNotFound => write!(f, "inner sample not found"),
            NoMatchReason::OutOfTolerance { drift, tolerance } => {
                write!(f, "samples drifted {} chars (tolerance {})", drift, tolerance)
            }
            NoMatchReason::InvertedSpan { start, end } => {
                write!(f, "inverted span [{}, {})", start, end)
            }
            NoMatchReason::NoEvidence => write!(f, "no fallback evidence stored"),
        }
    }
}
