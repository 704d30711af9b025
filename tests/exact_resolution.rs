//! Exact Resolution Integration Tests
//!
//! Tests for context relocation, closest-occurrence tie-breaking and the
//! inner-sample fallback with its drift tolerance.

use textanchor::anchor::{self, AnchorSettings, ChecksumAlgorithm, Strategy};
use textanchor::{AnchorError, AnchorEvidence, BytePrimary, NoMatchReason, PrimaryKind, Span};

const FOX: &str = "The quick brown fox jumps over the lazy dog";

const LONG: &str = "Preamble text here. The span begins ALPHA and it carries on \
                    for quite a while before it ends at OMEGA. Trailing words follow.";

fn long_span() -> Span {
    let start = LONG.find("ALPHA").unwrap();
    let end = LONG.find("OMEGA").unwrap() + "OMEGA".len();
    Span::new(start, end)
}

fn long_evidence() -> AnchorEvidence {
    anchor::capture(LONG, long_span(), ChecksumAlgorithm::Sha256, &AnchorSettings::default()).unwrap()
}

fn text_at(doc: &str, span: Span) -> &str {
    &doc[span.start..span.end]
}

#[test]
fn test_identity_after_capture() {
    let settings = AnchorSettings::default();
    let spans = [Span::new(0, 3), Span::new(10, 15), Span::new(16, 43), Span::new(4, 40)];

    for span in spans {
        let evidence = anchor::capture(FOX, span, ChecksumAlgorithm::Sha256, &settings).unwrap();
        assert_eq!(anchor::resolve(&evidence, FOX, span, &settings).unwrap(), span);
    }

    let span = long_span();
    assert_eq!(
        anchor::resolve(&long_evidence(), LONG, span, &AnchorSettings::default()).unwrap(),
        span
    );
}

#[test]
fn test_distant_insertion_shifts_span() {
    let settings = AnchorSettings::with_window(4);
    let evidence = anchor::capture(FOX, Span::new(10, 15), ChecksumAlgorithm::Sha256, &settings).unwrap();

    let edited = format!("Preface paragraph.\n\n{}", FOX);
    let span = anchor::resolve(&evidence, edited.as_str(), Span::new(10, 15), &settings).unwrap();

    assert_eq!(span, Span::new(10, 15).shifted(20));
    assert_eq!(text_at(&edited, span), "brown");
}

#[test]
fn test_context_edit_inside_window_still_resolves() {
    let settings = AnchorSettings::with_window(4);
    let evidence = anchor::capture(FOX, Span::new(10, 15), ChecksumAlgorithm::Sha256, &settings).unwrap();

    // "ick " is gone, so the span text itself is searched
    let edited = "The quack brown fox jumps over the lazy dog";
    let span = anchor::resolve(&evidence, edited, Span::new(10, 15), &settings).unwrap();
    assert_eq!(span, Span::new(10, 15));
}

#[test]
fn test_replaced_span_is_no_match() {
    let settings = AnchorSettings::with_window(4);
    let evidence = anchor::capture(FOX, Span::new(10, 15), ChecksumAlgorithm::Sha256, &settings).unwrap();

    let edited = "The quick orange fox jumps over the lazy dog";
    let err = anchor::resolve(&evidence, edited, Span::new(10, 15), &settings).unwrap_err();
    assert!(err.is_no_match());
}

#[test]
fn test_equidistant_occurrences_pick_earliest() {
    let evidence = AnchorEvidence::restore(PrimaryKind::Text, ChecksumAlgorithm::Length, Vec::new(), "[", "]")
        .with_span_text("k");
    let settings = AnchorSettings::default();

    // Occurrences of "[" at 0 and 4 are both two chars from 2
    for _ in 0..5 {
        let span = anchor::resolve(&evidence, "[k] [k]", Span::new(3, 4), &settings).unwrap();
        assert_eq!(span, Span::new(1, 2));
    }
}

#[test]
fn test_repeated_text_resolves_to_own_occurrence() {
    let doc = "note: alpha. note: alpha. note: alpha.";
    let settings = AnchorSettings::with_window(6);

    for span in [Span::new(6, 11), Span::new(19, 24), Span::new(32, 37)] {
        let evidence = anchor::capture(doc, span, ChecksumAlgorithm::Sha256, &settings).unwrap();
        assert_eq!(evidence.before_context(), "note: ");
        assert_eq!(anchor::resolve(&evidence, doc, span, &settings).unwrap(), span);
    }
}

#[test]
fn test_fallback_recovers_original_span() {
    let settings = AnchorSettings::default();
    let edited = LONG.replace("begins ", "starts ");

    let span = anchor::resolve(&long_evidence(), edited.as_str(), long_span(), &settings).unwrap();
    assert_eq!(span, long_span());
    assert!(text_at(&edited, span).starts_with("ALPHA"));
    assert!(text_at(&edited, span).ends_with("OMEGA"));
}

#[test]
fn test_fallback_within_tolerance_shifts() {
    let settings = AnchorSettings::default();
    let edited = LONG.replace("begins ", "begins!! ");

    let span = anchor::resolve(&long_evidence(), edited.as_str(), long_span(), &settings).unwrap();
    assert_eq!(span, long_span().shifted(2));
    assert!(text_at(&edited, span).starts_with("ALPHA"));
}

#[test]
fn test_fallback_beyond_tolerance_fails() {
    let settings = AnchorSettings::default();
    let edited = LONG.replace("begins ", "commences right ");

    let err = anchor::resolve(&long_evidence(), edited.as_str(), long_span(), &settings).unwrap_err();
    assert_eq!(
        err,
        AnchorError::NoMatchFound(NoMatchReason::OutOfTolerance {
            drift: 18,
            tolerance: 5,
        })
    );

    // A wider tolerance accepts the same drift
    let relaxed = AnchorSettings {
        fallback_tolerance: 20,
        ..settings
    };
    let span = anchor::resolve(&long_evidence(), edited.as_str(), long_span(), &relaxed).unwrap();
    assert_eq!(span, long_span().shifted(9));
}

#[test]
fn test_edited_sample_fails_fallback() {
    let settings = AnchorSettings::default();
    let edited = LONG.replace("ALPHA", "ALPINE");

    let err = anchor::resolve(&long_evidence(), edited.as_str(), long_span(), &settings).unwrap_err();
    assert_eq!(err, AnchorError::NoMatchFound(NoMatchReason::SampleNotFound));
}

#[test]
fn test_growth_inside_span_keeps_boundaries() {
    let settings = AnchorSettings::default();
    let edited = LONG.replace("ALPHA and", "ALPHA, and");

    let span = anchor::resolve(&long_evidence(), edited.as_str(), long_span(), &settings).unwrap();
    assert_eq!(span, Span::new(long_span().start, long_span().end + 1));
}

#[test]
fn test_bytes_primary_resolves_bytes_evidence() {
    let settings = AnchorSettings::with_window(4);
    let original = BytePrimary::new(FOX.as_bytes());
    let evidence = anchor::capture(&original, Span::new(10, 15), ChecksumAlgorithm::Md5, &settings).unwrap();

    let edited = BytePrimary::new(format!(">> {}", FOX).into_bytes());
    let span = Strategy::Exact
        .resolve(&evidence, &edited, Span::new(10, 15), &settings)
        .unwrap();
    assert_eq!(span, Span::new(13, 18));

    // Text primaries do not satisfy bytes evidence
    let err = anchor::resolve(&evidence, FOX, Span::new(10, 15), &settings).unwrap_err();
    assert_eq!(
        err,
        AnchorError::InvalidPrimary {
            expected: PrimaryKind::Bytes,
            actual: PrimaryKind::Text,
        }
    );
}

#[test]
fn test_multibyte_offsets_are_chars() {
    let doc = "Grüße aus Köln, schöne Grüße!";
    let settings = AnchorSettings::with_window(5);
    let evidence = anchor::capture(doc, Span::new(10, 14), ChecksumAlgorithm::Sha256, &settings).unwrap();

    let edited = format!("Ä {}", doc);
    let span = anchor::resolve(&evidence, edited.as_str(), Span::new(10, 14), &settings).unwrap();
    assert_eq!(span, Span::new(12, 16));

    let text: String = edited.chars().skip(span.start).take(span.len()).collect();
    assert_eq!(text, "Köln");
}
