//! Character spans within a single document version.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A half-open range `[start, end)` of character offsets.
///
/// Offsets count Unicode scalar values and are only meaningful against
/// the document version they were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered (0 for inverted spans)
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `end < start`
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// Shift both offsets by a signed delta, clamping at zero
    pub fn shifted(&self, delta: isize) -> Self {
        let shift = |offset: usize| offset.saturating_add_signed(delta);
        Self {
            start: shift(self.start),
            end: shift(self.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len() {
        assert_eq!(Span::new(10, 15).len(), 5);
        assert!(Span::new(3, 3).is_empty());
        assert_eq!(Span::new(8, 2).len(), 0);
        assert!(Span::new(8, 2).is_inverted());
    }

    #[test]
    fn test_span_shifted() {
        assert_eq!(Span::new(10, 15).shifted(7), Span::new(17, 22));
        assert_eq!(Span::new(10, 15).shifted(-12), Span::new(0, 3));
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(10, 15).to_string(), "[10, 15)");
    }
}
