//! Revalidation of stored anchors against current document content.
//!
//! Each anchor is checked independently: a matching checksum keeps the
//! span as it is, anything else goes through the selected strategy.
//! Anchors of one document are resolved in parallel on the blocking pool;
//! they share the document read-only and nothing else.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::anchor::{AnchorSettings, Strategy};
use crate::domain::{Primary, Span};
use crate::error::AnchorError;
use crate::store::{AnchorState, AnchorStatus, AnchorStore};

/// What revalidation concluded for one anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Document unchanged since capture, or span found where it was
    Unchanged,
    /// Span found at a new location
    Relocated { from: Span, to: Span },
    /// No confident location; the anchor needs manual re-anchoring
    Orphaned(crate::error::NoMatchReason),
}

/// Revalidate one anchor against a primary.
///
/// `NoMatchFound` becomes [`Outcome::Orphaned`]; every other error is
/// returned, since it means the inputs themselves are wrong.
pub fn revalidate_anchor<P: Primary + ?Sized>(
    state: &AnchorState,
    primary: &P,
    strategy: Strategy,
    settings: &AnchorSettings,
) -> crate::Result<Outcome> {
    let evidence = &state.record.evidence;

    if evidence.verify(primary)? {
        debug!(id = %state.record.id, "Checksum unchanged");
        if state.current == state.record.span {
            return Ok(Outcome::Unchanged);
        }
        // Document was edited and then reverted to the captured version
        return Ok(Outcome::Relocated {
            from: state.current,
            to: state.record.span,
        });
    }

    match strategy.resolve(evidence, primary, state.current, settings) {
        Ok(span) if span == state.current => Ok(Outcome::Unchanged),
        Ok(span) => Ok(Outcome::Relocated {
            from: state.current,
            to: span,
        }),
        Err(AnchorError::NoMatchFound(reason)) => Ok(Outcome::Orphaned(reason)),
        Err(e) => Err(e),
    }
}

/// Revalidate many anchors of one document in parallel
///
/// Results come back in the order of `states`.
pub async fn revalidate_all<P>(
    states: Vec<AnchorState>,
    primary: Arc<P>,
    strategy: Strategy,
    settings: AnchorSettings,
) -> Result<Vec<(AnchorState, crate::Result<Outcome>)>>
where
    P: Primary + Send + Sync + 'static,
{
    let mut tasks = JoinSet::new();

    for (idx, state) in states.into_iter().enumerate() {
        let primary = Arc::clone(&primary);
        tasks.spawn_blocking(move || {
            let outcome = revalidate_anchor(&state, primary.as_ref(), strategy, &settings);
            (idx, state, outcome)
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.context("Revalidation task failed")?);
    }

    results.sort_by_key(|(idx, _, _)| *idx);
    Ok(results
        .into_iter()
        .map(|(_, state, outcome)| (state, outcome))
        .collect())
}

/// Record an outcome in the store
///
/// An orphaned anchor found again where it was last known gets a
/// relocation onto the same span, which returns it to active on replay.
pub fn record_outcome(
    store: &AnchorStore,
    state: &AnchorState,
    outcome: Outcome,
    strategy: Strategy,
) -> Result<()> {
    match outcome {
        Outcome::Unchanged if state.status == AnchorStatus::Orphaned => {
            debug!(id = %state.record.id, "Orphaned anchor found again");
            store.record_relocation(&state.record.id, state.current, state.current, strategy)
        }
        Outcome::Unchanged => Ok(()),
        Outcome::Relocated { from, to } => store.record_relocation(&state.record.id, from, to, strategy),
        Outcome::Orphaned(reason) => {
            warn!(id = %state.record.id, %reason, "Anchor orphaned");
            store.record_orphan(&state.record.id, strategy, reason)
        }
    }
}
