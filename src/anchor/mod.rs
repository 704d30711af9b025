//! Anchor capture and relocation.
//!
//! This module contains:
//! - capture: Build [`AnchorEvidence`] from a document and span
//! - checksum: Whole-document digests and verification
//! - exact: Exact context search with inner-sample fallback (default)
//! - fuzzy: Shingle-based approximate search (alternate strategy)
//!
//! All operations are pure functions of their inputs. Scratch structures
//! (the char index, the shingle cloud) are built and dropped per call, so
//! the same evidence can be resolved from many threads at once.
//!
//! # Example
//!
//! ```
//! use textanchor::anchor::{self, AnchorSettings, ChecksumAlgorithm, Strategy};
//! use textanchor::Span;
//!
//! let settings = AnchorSettings::with_window(4);
//! let original = "The quick brown fox jumps over the lazy dog";
//! let evidence = anchor::capture(original, Span::new(10, 15), ChecksumAlgorithm::Sha256, &settings)?;
//!
//! let edited = "Look: the quick brown fox jumps over the lazy dog";
//! assert!(!evidence.verify(edited)?);
//!
//! let span = Strategy::Exact.resolve(&evidence, edited, Span::new(10, 15), &settings)?;
//! assert_eq!(&edited[span.start..span.end], "brown");
//! # Ok::<(), textanchor::AnchorError>(())
//! ```

pub mod capture;
pub mod checksum;
pub mod exact;
pub mod fuzzy;
pub mod search;
pub mod settings;
mod text;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{AnchorEvidence, Primary, Span};
use crate::error::{AnchorError, NoMatchReason, Result};

// Re-export commonly used items
pub use capture::capture;
pub use checksum::{checksum, verify, ChecksumAlgorithm};
pub use exact::ExactMatcher;
pub use fuzzy::{FuzzyMatcher, ShingleCloud, ShingleMatch};
pub use settings::AnchorSettings;

/// A relocation strategy
pub trait Resolver {
    /// Short strategy name for logs and stored events
    fn name(&self) -> &'static str;

    /// Relocate the span described by `evidence` within `content`
    fn relocate(&self, evidence: &AnchorEvidence, content: &str, original: Span) -> Result<Span>;
}

/// Selectable relocation strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Exact context search with inner-sample fallback
    #[default]
    Exact,
    /// Approximate n-gram search
    Fuzzy,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Fuzzy => "fuzzy",
        }
    }

    /// Build the resolver for this strategy
    pub fn resolver(self, settings: &AnchorSettings) -> Box<dyn Resolver + Send + Sync> {
        match self {
            Strategy::Exact => Box::new(ExactMatcher::new(*settings)),
            Strategy::Fuzzy => Box::new(FuzzyMatcher::new(*settings)),
        }
    }

    /// Relocate `original` in the primary's current content with this strategy
    pub fn resolve<P: Primary + ?Sized>(
        self,
        evidence: &AnchorEvidence,
        primary: &P,
        original: Span,
        settings: &AnchorSettings,
    ) -> Result<Span> {
        resolve_with(self.resolver(settings).as_ref(), evidence, primary, original)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Strategy::Exact),
            "fuzzy" => Ok(Strategy::Fuzzy),
            other => Err(format!("Unknown strategy: {}", other)),
        }
    }
}

/// Relocate with the default exact strategy
pub fn resolve<P: Primary + ?Sized>(
    evidence: &AnchorEvidence,
    primary: &P,
    original: Span,
    settings: &AnchorSettings,
) -> Result<Span> {
    Strategy::Exact.resolve(evidence, primary, original, settings)
}

/// Relocate with any resolver.
///
/// Checks the primary kind against the evidence, then rejects inverted
/// results whatever the resolver returned.
#[instrument(skip(resolver, evidence, primary), fields(strategy = resolver.name()))]
pub fn resolve_with<R: Resolver + ?Sized, P: Primary + ?Sized>(
    resolver: &R,
    evidence: &AnchorEvidence,
    primary: &P,
    original: Span,
) -> Result<Span> {
    if primary.kind() != evidence.primary_kind() {
        return Err(AnchorError::InvalidPrimary {
            expected: evidence.primary_kind(),
            actual: primary.kind(),
        });
    }

    let content = primary.content()?;
    let span = resolver.relocate(evidence, &content, original)?;

    if span.is_inverted() {
        return Err(AnchorError::NoMatchFound(NoMatchReason::InvertedSpan {
            start: span.start,
            end: span.end,
        }));
    }

    debug!(%span, "Relocated span");
    Ok(span)
}
