//! Anchor evidence: the record captured once per span.
//!
//! Evidence is immutable. It is either computed from a document with
//! [`AnchorEvidence::capture`] or rebuilt from stored values with
//! [`AnchorEvidence::restore`]; there is no way to mutate it afterwards.

use serde::{Deserialize, Serialize};

use crate::anchor::{capture, AnchorSettings, ChecksumAlgorithm};
use crate::domain::{Primary, PrimaryKind, Span};
use crate::error::Result;

/// Samples taken from just inside the two edges of a long span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerSamples {
    pub start: String,
    pub end: String,
}

/// Evidence used to relocate one span in a later document version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorEvidence {
    /// Kind of primary the evidence was captured against
    primary_kind: PrimaryKind,
    /// Algorithm used for `checksum`
    algorithm: ChecksumAlgorithm,
    /// Digest of the whole document at capture time
    #[serde(with = "hex_bytes")]
    checksum: Vec<u8>,
    /// Up to `window_size` characters preceding the span
    before_context: String,
    /// Up to `window_size` characters following the span
    after_context: String,
    /// Sample from just inside the span start (empty for short spans)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    inner_sample_start: String,
    /// Sample from just inside the span end (empty for short spans)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    inner_sample_end: String,
    /// Both samples concatenated, or the full span text for short spans
    #[serde(default, skip_serializing_if = "String::is_empty")]
    inner_sample_combined: String,
}

impl AnchorEvidence {
    /// Capture evidence for `span` from the primary's current content
    pub fn capture<P: Primary + ?Sized>(
        primary: &P,
        span: Span,
        algorithm: ChecksumAlgorithm,
        settings: &AnchorSettings,
    ) -> Result<Self> {
        capture::capture(primary, span, algorithm, settings)
    }

    /// Rebuild evidence from stored values without re-reading the document
    ///
    /// The result carries no inner samples; add them with
    /// [`with_samples`](Self::with_samples) or
    /// [`with_span_text`](Self::with_span_text) if they were stored.
    pub fn restore(
        primary_kind: PrimaryKind,
        algorithm: ChecksumAlgorithm,
        checksum: Vec<u8>,
        before_context: impl Into<String>,
        after_context: impl Into<String>,
    ) -> Self {
        Self {
            primary_kind,
            algorithm,
            checksum,
            before_context: before_context.into(),
            after_context: after_context.into(),
            inner_sample_start: String::new(),
            inner_sample_end: String::new(),
            inner_sample_combined: String::new(),
        }
    }

    /// Attach stored inner samples (long-span form)
    pub fn with_samples(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.inner_sample_start = start.into();
        self.inner_sample_end = end.into();
        self.inner_sample_combined = format!("{}{}", self.inner_sample_start, self.inner_sample_end);
        self
    }

    /// Attach the stored span text (short-span form)
    pub fn with_span_text(mut self, text: impl Into<String>) -> Self {
        self.inner_sample_start.clear();
        self.inner_sample_end.clear();
        self.inner_sample_combined = text.into();
        self
    }

    pub(crate) fn from_parts(
        primary_kind: PrimaryKind,
        algorithm: ChecksumAlgorithm,
        checksum: Vec<u8>,
        before_context: String,
        after_context: String,
        samples: Option<InnerSamples>,
        span_text: String,
    ) -> Self {
        let evidence = Self::restore(primary_kind, algorithm, checksum, before_context, after_context);
        match samples {
            Some(samples) => evidence.with_samples(samples.start, samples.end),
            None => evidence.with_span_text(span_text),
        }
    }

    pub fn primary_kind(&self) -> PrimaryKind {
        self.primary_kind
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    pub fn checksum(&self) -> &[u8] {
        &self.checksum
    }

    /// Checksum as lowercase hex
    pub fn checksum_hex(&self) -> String {
        hex::encode(&self.checksum)
    }

    pub fn before_context(&self) -> &str {
        &self.before_context
    }

    pub fn after_context(&self) -> &str {
        &self.after_context
    }

    pub fn inner_sample_start(&self) -> &str {
        &self.inner_sample_start
    }

    pub fn inner_sample_end(&self) -> &str {
        &self.inner_sample_end
    }

    pub fn inner_sample_combined(&self) -> &str {
        &self.inner_sample_combined
    }

    /// Inner samples, if both were captured
    pub fn samples(&self) -> Option<InnerSamples> {
        if self.has_samples() {
            Some(InnerSamples {
                start: self.inner_sample_start.clone(),
                end: self.inner_sample_end.clone(),
            })
        } else {
            None
        }
    }

    /// True for the long-span form (both edge samples present)
    pub fn has_samples(&self) -> bool {
        !self.inner_sample_start.is_empty() && !self.inner_sample_end.is_empty()
    }

    /// Check the checksum against a primary's current content
    pub fn verify<P: Primary + ?Sized>(&self, primary: &P) -> Result<bool> {
        crate::anchor::verify(self, primary)
    }
}

/// Serialize digest bytes as a hex string
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
