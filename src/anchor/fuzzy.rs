//! Approximate relocation using character n-gram ("shingle") matching.
//!
//! A [`ShingleCloud`] indexes every n-gram of the document. A needle is cut
//! into n-grams of the same size and each document position whose n-gram
//! also occurs in the needle is a hit. Nearby hits merge into match windows
//! scored by hit count, so a context string survives small edits that would
//! defeat exact search.
//!
//! The n-gram size is `min(needle length, max_shingle_size)`. A context no
//! longer than `max_shingle_size` is therefore a single shingle and must
//! occur verbatim; with the default window of 20 and shingle cap of 20 this
//! is always the case. Edits are only tolerated when the window is wider
//! than the shingle cap.

use std::cmp::Reverse;
use std::collections::HashSet;

use tracing::debug;

use super::{AnchorSettings, Resolver};
use crate::domain::{AnchorEvidence, Span};
use crate::error::{AnchorError, NoMatchReason, Result};

/// A window of the document that overlaps the needle's shingles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShingleMatch {
    /// Char offset of the first hit
    pub start: usize,
    /// Chars from the first hit to the end of the last hit's n-gram
    pub length: usize,
    /// Number of n-grams shared with the needle
    pub hits: usize,
}

impl ShingleMatch {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// N-gram index over one document
#[derive(Debug, Clone)]
pub struct ShingleCloud {
    haystack: Vec<char>,
    ngram_size: usize,
    min_hits: usize,
}

impl ShingleCloud {
    pub fn new(haystack: &str, ngram_size: usize) -> Self {
        Self {
            haystack: haystack.chars().collect(),
            ngram_size: ngram_size.max(1),
            min_hits: 1,
        }
    }

    /// Require at least `min_hits` shared n-grams per match window
    pub fn with_min_hits(mut self, min_hits: usize) -> Self {
        self.min_hits = min_hits.max(1);
        self
    }

    pub fn ngram_size(&self) -> usize {
        self.ngram_size
    }

    /// Match windows for `needle`, in document order
    ///
    /// Hits no more than `n + 1` positions apart share a window, which
    /// bridges the gap left by a single edited character.
    pub fn matches(&self, needle: &str) -> Vec<ShingleMatch> {
        let n = self.ngram_size;
        let needle: Vec<char> = needle.chars().collect();
        if needle.len() < n || self.haystack.len() < n {
            return Vec::new();
        }

        let shingles: HashSet<&[char]> = needle.windows(n).collect();
        let mut windows = Vec::new();
        let mut current: Option<(usize, usize, usize)> = None;

        for (pos, gram) in self.haystack.windows(n).enumerate() {
            if !shingles.contains(gram) {
                continue;
            }
            current = match current {
                Some((first, last, hits)) if pos <= last + n + 1 => Some((first, pos, hits + 1)),
                Some(done) => {
                    self.push_window(&mut windows, done);
                    Some((pos, pos, 1))
                }
                None => Some((pos, pos, 1)),
            };
        }
        if let Some(done) = current {
            self.push_window(&mut windows, done);
        }

        windows
    }

    fn push_window(&self, windows: &mut Vec<ShingleMatch>, (first, last, hits): (usize, usize, usize)) {
        if hits >= self.min_hits {
            windows.push(ShingleMatch {
                start: first,
                length: last + self.ngram_size - first,
                hits,
            });
        }
    }
}

/// Order windows best first: most hits, then nearest `expected`, then earliest
pub fn rank_matches(matches: &mut [ShingleMatch], expected: usize) {
    matches.sort_by_key(|m| (Reverse(m.hits), m.start.abs_diff(expected), m.start));
}

/// Shingle-based relocation (alternate strategy, no sample fallback)
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    settings: AnchorSettings,
}

impl FuzzyMatcher {
    pub fn new(settings: AnchorSettings) -> Self {
        Self { settings }
    }

    /// Best window for `needle`, with the n-gram size derived from its length
    fn best_match(&self, content: &str, needle: &str, expected: usize) -> Option<ShingleMatch> {
        let needle_len = needle.chars().count();
        let ngram_size = needle_len.min(self.settings.max_shingle_size);
        let cloud = ShingleCloud::new(content, ngram_size).with_min_hits(self.settings.min_shingle_hits);

        let mut matches = cloud.matches(needle);
        rank_matches(&mut matches, expected);
        debug!(
            ngram_size = cloud.ngram_size(),
            windows = matches.len(),
            best = ?matches.first(),
            "Shingle match"
        );
        matches.first().copied()
    }
}

impl Resolver for FuzzyMatcher {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn relocate(&self, evidence: &AnchorEvidence, content: &str, original: Span) -> Result<Span> {
        let before = evidence.before_context();
        let start = if before.is_empty() {
            0
        } else {
            let expected = original.start.saturating_sub(before.chars().count());
            self.best_match(content, before, expected)
                .ok_or(AnchorError::NoMatchFound(NoMatchReason::ContextNotFound))?
                .end()
        };

        let after = evidence.after_context();
        let end = if after.is_empty() {
            content.chars().count()
        } else {
            self.best_match(content, after, original.end)
                .ok_or(AnchorError::NoMatchFound(NoMatchReason::ContextNotFound))?
                .start
        };

        Ok(Span::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_occurrence_is_one_window() {
        let cloud = ShingleCloud::new("the cat sat on the mat", 3);
        let matches = cloud.matches("sat");
        assert_eq!(
            matches,
            vec![ShingleMatch {
                start: 8,
                length: 3,
                hits: 1
            }]
        );
    }

    #[test]
    fn test_single_edit_keeps_one_window() {
        // "quick brown" with the 'b' replaced
        let cloud = ShingleCloud::new("a quick crown fox", 3);
        let matches = cloud.matches("quick brown");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 2);
        assert_eq!(matches[0].end(), 13);
    }

    #[test]
    fn test_distant_hits_form_separate_windows() {
        let cloud = ShingleCloud::new("abc xxxxxxxx abc", 3);
        let matches = cloud.matches("abc");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].start, 0);
        assert_eq!(matches[1].start, 13);
    }

    #[test]
    fn test_min_hits_filters_windows() {
        let cloud = ShingleCloud::new("the cat sat", 3).with_min_hits(2);
        assert!(cloud.matches("sat").is_empty());
        assert_eq!(cloud.matches("cat sat").len(), 1);
    }

    #[test]
    fn test_needle_shorter_than_ngram() {
        let cloud = ShingleCloud::new("abcdef", 4);
        assert!(cloud.matches("abc").is_empty());
    }

    #[test]
    fn test_rank_prefers_hits_then_distance() {
        let mut matches = vec![
            ShingleMatch { start: 0, length: 4, hits: 2 },
            ShingleMatch { start: 30, length: 6, hits: 4 },
            ShingleMatch { start: 10, length: 6, hits: 4 },
        ];
        rank_matches(&mut matches, 12);
        assert_eq!(matches[0].start, 10);
        assert_eq!(matches[1].start, 30);
        assert_eq!(matches[2].start, 0);
    }
}
