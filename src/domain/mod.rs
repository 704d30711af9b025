//! Domain types for text anchoring.
//!
//! This module contains the core data structures:
//! - Span: A half-open character range in one document version
//! - Primary: The annotated document and its content capability
//! - AnchorEvidence: The immutable record used to relocate a span

pub mod evidence;
pub mod primary;
pub mod span;

// Re-export commonly used types
pub use evidence::{AnchorEvidence, InnerSamples};
pub use primary::{BytePrimary, Primary, PrimaryKind, TextPrimary};
pub use span::Span;
