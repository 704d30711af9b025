//! Literal occurrence search with closest-to-expected selection.
//!
//! Every lookup in the exact strategy goes through [`find_closest`]: all
//! literal occurrences are collected and the one nearest the offset where
//! the needle used to be wins. Ties go to the earliest occurrence.

use super::text::CharText;

/// Find all exact matches of needle bytes in haystack bytes
///
/// Returns every start offset, overlapping occurrences included.
/// Sliding window search, O(n*m) worst case.
pub fn find_exact_matches(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }

    let needle_len = needle.len();
    (0..=(haystack.len() - needle_len))
        .filter(|&i| &haystack[i..i + needle_len] == needle)
        .collect()
}

/// Char offsets of every occurrence of `needle` in the document
pub(crate) fn find_occurrences(text: &CharText<'_>, needle: &str) -> Vec<usize> {
    // A valid UTF-8 needle can only match at char boundaries
    find_exact_matches(text.as_str().as_bytes(), needle.as_bytes())
        .into_iter()
        .map(|byte_offset| text.char_offset(byte_offset))
        .collect()
}

/// Pick the occurrence minimising `|expected - occurrence|`
///
/// `occurrences` must be in document order; the earliest wins a tie.
pub fn closest_to(occurrences: &[usize], expected: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &offset in occurrences {
        match best {
            Some(current) if offset.abs_diff(expected) >= current.abs_diff(expected) => {}
            _ => best = Some(offset),
        }
    }
    best
}

/// Char offset of the occurrence of `needle` closest to `expected`
pub(crate) fn find_closest(text: &CharText<'_>, needle: &str, expected: usize) -> Option<usize> {
    let occurrences = find_occurrences(text, needle);
    let chosen = closest_to(&occurrences, expected);
    tracing::debug!(
        needle_len = needle.chars().count(),
        occurrences = occurrences.len(),
        expected,
        ?chosen,
        "Searched for needle"
    );
    chosen
}
