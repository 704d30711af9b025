//! Exact-match relocation with inner-sample fallback.
//!
//! The span is first bounded by literal occurrences of the stored before
//! and after context, each chosen closest to where it used to be. The
//! result must agree with the stored inner samples. If a boundary cannot
//! be found, or the samples disagree, the span is re-derived from the
//! inner samples alone.

use tracing::debug;

use super::search::find_closest;
use super::text::CharText;
use super::{AnchorSettings, Resolver};
use crate::domain::{AnchorEvidence, Span};
use crate::error::{AnchorError, NoMatchReason, Result};

/// Exact substring relocation (the default strategy)
#[derive(Debug, Clone, Default)]
pub struct ExactMatcher {
    settings: AnchorSettings,
}

impl ExactMatcher {
    pub fn new(settings: AnchorSettings) -> Self {
        Self { settings }
    }
}

impl Resolver for ExactMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn relocate(&self, evidence: &AnchorEvidence, content: &str, original: Span) -> Result<Span> {
        let text = CharText::new(content);

        let start = locate_start(&text, evidence, original);
        let end = locate_end(&text, evidence, original);
        debug!(?start, ?end, "Located context boundaries");

        match (start, end) {
            (Some(start), Some(end)) if end < start => Err(AnchorError::NoMatchFound(
                NoMatchReason::InvertedSpan { start, end },
            )),
            (Some(start), Some(end)) if samples_agree(&text, evidence, start, end) => {
                Ok(Span::new(start, end))
            }
            (Some(_), Some(_)) => {
                debug!("Span text disagrees with inner samples, falling back");
                self.fallback(&text, evidence, original)
            }
            _ => {
                debug!("Context not found, falling back to inner samples");
                self.fallback(&text, evidence, original)
            }
        }
    }
}

impl ExactMatcher {
    /// Recover both boundaries from the inner samples
    fn fallback(&self, text: &CharText<'_>, evidence: &AnchorEvidence, original: Span) -> Result<Span> {
        if evidence.has_samples() {
            let end_sample = evidence.inner_sample_end();
            let end_sample_len = end_sample.chars().count();
            let expected_end_sample = original.end.saturating_sub(end_sample_len);

            let begin = find_closest(text, evidence.inner_sample_start(), original.start)
                .ok_or(AnchorError::NoMatchFound(NoMatchReason::SampleNotFound))?;
            let end_sample_pos = find_closest(text, end_sample, expected_end_sample)
                .ok_or(AnchorError::NoMatchFound(NoMatchReason::SampleNotFound))?;

            let expected_total = original.start + expected_end_sample;
            let drift = (begin + end_sample_pos).abs_diff(expected_total);
            let tolerance = self.settings.fallback_tolerance;
            if drift > tolerance {
                return Err(AnchorError::NoMatchFound(NoMatchReason::OutOfTolerance {
                    drift,
                    tolerance,
                }));
            }

            let end = end_sample_pos + end_sample_len;
            if end < begin {
                return Err(AnchorError::NoMatchFound(NoMatchReason::InvertedSpan {
                    start: begin,
                    end,
                }));
            }
            return Ok(Span::new(begin, end));
        }

        let span_text = evidence.inner_sample_combined();
        if span_text.is_empty() {
            return Err(AnchorError::NoMatchFound(NoMatchReason::NoEvidence));
        }

        let start = find_closest(text, span_text, original.start)
            .ok_or(AnchorError::NoMatchFound(NoMatchReason::SampleNotFound))?;
        Ok(Span::new(start, start + span_text.chars().count()))
    }
}

/// New start offset: just past the before context closest to its old place
fn locate_start(text: &CharText<'_>, evidence: &AnchorEvidence, original: Span) -> Option<usize> {
    let before = evidence.before_context();
    if before.is_empty() {
        // Span started the document
        return Some(0);
    }

    let before_len = before.chars().count();
    find_closest(text, before, original.start.saturating_sub(before_len))
        .map(|offset| offset + before_len)
}

/// New end offset: the start of the after context closest to its old place
fn locate_end(text: &CharText<'_>, evidence: &AnchorEvidence, original: Span) -> Option<usize> {
    let after = evidence.after_context();
    if after.is_empty() {
        // Span ended the document
        return Some(text.char_len());
    }

    find_closest(text, after, original.end)
}

/// Check a context-bounded span against the stored inner evidence
fn samples_agree(text: &CharText<'_>, evidence: &AnchorEvidence, start: usize, end: usize) -> bool {
    let located = text.slice(start, end);

    if evidence.has_samples() {
        let head = evidence.inner_sample_start();
        let tail = evidence.inner_sample_end();
        return located.len() >= head.len() + tail.len()
            && located.starts_with(head)
            && located.ends_with(tail);
    }

    let span_text = evidence.inner_sample_combined();
    span_text.is_empty() || located == span_text
}
