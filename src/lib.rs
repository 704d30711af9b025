//! textanchor - Robust text anchoring
//!
//! Captures enough evidence about a selected span of text to find that
//! same span again after the document has been edited, without trusting
//! the original offsets.
//!
//! # Architecture
//!
//! Anchoring is split into capture and resolution:
//! - Capture runs once, at annotation time, and produces immutable
//!   [`AnchorEvidence`]: a whole-document checksum, the text just before and
//!   after the span, and samples from just inside its edges
//! - Verification compares the checksum with the current document; an
//!   unchanged document needs no relocation
//! - Resolution searches the current document for the evidence, with an
//!   exact strategy (default) or a fuzzy n-gram strategy
//!
//! # Modules
//!
//! - `anchor`: Capture, checksums and the two relocation strategies
//! - `domain`: Data structures (Span, Primary, AnchorEvidence)
//! - `fragment`: Fragment identifiers with integrity checks
//! - `store`: Append-only JSONL persistence of anchors
//! - `revalidate`: Bulk relocation of stored anchors
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Anchor characters 120..164 of a document
//! textanchor capture notes.md --start 120 --end 164
//!
//! # After editing, find the span again
//! textanchor resolve <anchor-id>
//!
//! # Re-check every stored anchor
//! textanchor revalidate --strategy fuzzy
//! ```

pub mod anchor;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fragment;
pub mod revalidate;
pub mod store;

// Re-export main types at crate root for convenience
pub use anchor::{AnchorSettings, ChecksumAlgorithm, Resolver, Strategy};
pub use domain::{AnchorEvidence, BytePrimary, Primary, PrimaryKind, Span, TextPrimary};
pub use error::{AnchorError, NoMatchReason, Result};
pub use fragment::{FragmentError, TextFragment};
pub use revalidate::Outcome;
pub use store::{AnchorRecord, AnchorState, AnchorStatus, AnchorStore};
