//! Evidence capture at annotation time.

use tracing::debug;

use super::text::CharText;
use super::{AnchorSettings, ChecksumAlgorithm};
use crate::domain::{AnchorEvidence, InnerSamples, Primary, Span};
use crate::error::Result;

/// Capture relocation evidence for `span` in the primary's current content.
///
/// Records the whole-document checksum, up to `window_size` characters of
/// context on each side of the span, and either two edge samples (spans
/// longer than the window) or the full span text (short spans).
pub fn capture<P: Primary + ?Sized>(
    primary: &P,
    span: Span,
    algorithm: ChecksumAlgorithm,
    settings: &AnchorSettings,
) -> Result<AnchorEvidence> {
    let content = primary.content()?;
    let text = CharText::new(&content);
    let span_text = text.span_text(span)?;

    let checksum = algorithm.digest(&content);

    let window = settings.window_size;
    let before_context = text.slice(span.start.saturating_sub(window), span.start);
    let after_context = text.slice(span.end, span.end.saturating_add(window));

    let sample_len = settings.sample_length(span.len());
    let samples = (sample_len > 0).then(|| InnerSamples {
        start: text.slice(span.start, span.start + sample_len).to_string(),
        end: text.slice(span.end - sample_len, span.end).to_string(),
    });

    debug!(
        %span,
        %algorithm,
        before = before_context.chars().count(),
        after = after_context.chars().count(),
        sample_len,
        "Captured anchor evidence"
    );

    Ok(AnchorEvidence::from_parts(
        primary.kind(),
        algorithm,
        checksum,
        before_context.to_string(),
        after_context.to_string(),
        samples,
        span_text.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnchorError;

    const FOX: &str = "The quick brown fox jumps over the lazy dog";

    #[test]
    fn test_capture_contexts() {
        let settings = AnchorSettings::with_window(4);
        let evidence = capture(FOX, Span::new(10, 15), ChecksumAlgorithm::Sha256, &settings).unwrap();

        assert_eq!(evidence.before_context(), "ick ");
        assert_eq!(evidence.after_context(), " fox");
        assert!(!evidence.has_samples());
        assert_eq!(evidence.inner_sample_combined(), "brown");
    }

    #[test]
    fn test_capture_clamps_at_document_edges() {
        let settings = AnchorSettings::default();
        let evidence = capture(FOX, Span::new(0, 3), ChecksumAlgorithm::Length, &settings).unwrap();
        assert_eq!(evidence.before_context(), "");
        assert_eq!(evidence.after_context(), " quick brown fox jum");

        let evidence = capture(FOX, Span::new(40, 43), ChecksumAlgorithm::Length, &settings).unwrap();
        assert_eq!(evidence.before_context(), "jumps over the lazy ");
        assert_eq!(evidence.after_context(), "");
    }

    #[test]
    fn test_capture_long_span_samples() {
        let settings = AnchorSettings::default();
        // 43 / 2 = 21 -> floor(3.15) = 3
        let evidence = capture(FOX, Span::new(0, 43), ChecksumAlgorithm::Md5, &settings).unwrap();
        assert!(evidence.has_samples());
        assert_eq!(evidence.inner_sample_start(), "The");
        assert_eq!(evidence.inner_sample_end(), "dog");
        assert_eq!(evidence.inner_sample_combined(), "Thedog");
    }

    #[test]
    fn test_capture_with_oversized_percent_storage() {
        let settings = AnchorSettings {
            percent_storage: 3.0,
            ..Default::default()
        };
        let evidence = capture(FOX, Span::new(0, 30), ChecksumAlgorithm::Sha256, &settings).unwrap();
        assert_eq!(evidence.inner_sample_start(), "The quick brown");
        assert_eq!(evidence.inner_sample_end(), " fox jumps over");
    }

    #[test]
    fn test_capture_rejects_span_outside_document() {
        let settings = AnchorSettings::default();
        let err = capture(FOX, Span::new(40, 50), ChecksumAlgorithm::Sha256, &settings).unwrap_err();
        assert_eq!(err, AnchorError::InvalidSpan { start: 40, end: 50, len: 43 });
    }

    #[test]
    fn test_capture_records_primary_kind() {
        let settings = AnchorSettings::default();
        let primary = crate::domain::BytePrimary::new(FOX.as_bytes());
        let evidence = capture(&primary, Span::new(4, 9), ChecksumAlgorithm::Sha256, &settings).unwrap();
        assert_eq!(evidence.primary_kind(), crate::domain::PrimaryKind::Bytes);
    }
}
