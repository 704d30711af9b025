//! Anchor CLI subcommands.
//!
//! Provides commands to:
//! - `capture`: Anchor a span of a document
//! - `verify` / `resolve`: Check and relocate one anchor
//! - `revalidate`: Relocate every live anchor, one document at a time
//! - `show` / `list` / `remove`: Inspect and manage the store

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::anchor::{AnchorSettings, ChecksumAlgorithm, Strategy};
use crate::config::{config, ResolvedConfig};
use crate::domain::{AnchorEvidence, BytePrimary, Primary, Span};
use crate::fragment::TextFragment;
use crate::revalidate::{record_outcome, revalidate_all, revalidate_anchor, Outcome};
use crate::store::{AnchorState, AnchorStore};

/// Read a document as raw bytes
async fn read_document(path: &Path) -> Result<BytePrimary> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    Ok(BytePrimary::new(bytes))
}

/// Look up an anchor by ID prefix or fail
fn find_anchor(store: &AnchorStore, id: &str) -> Result<AnchorState> {
    store
        .find(id)?
        .ok_or_else(|| anyhow::anyhow!("Anchor not found: {}", id))
}

/// Text at `span`, or a placeholder when the span no longer fits
fn snippet(content: &str, span: Span) -> String {
    TextFragment::new(span)
        .extract(content)
        .map(str::to_string)
        .unwrap_or_else(|e| format!("({})", e))
}

/// Execute the `capture` command
pub async fn execute_capture(
    document: &Path,
    start: usize,
    end: usize,
    algorithm: Option<&str>,
    window: Option<usize>,
) -> Result<()> {
    let config = config()?;
    let document = tokio::fs::canonicalize(document)
        .await
        .with_context(|| format!("Document not found: {}", document.display()))?;

    let algorithm = match algorithm {
        Some(name) => name.parse::<ChecksumAlgorithm>()?,
        None => config.checksum,
    };
    let settings = AnchorSettings {
        window_size: window.unwrap_or(config.anchoring.window_size),
        ..config.anchoring
    };

    let primary = read_document(&document).await?;
    let span = Span::new(start, end);
    let evidence = AnchorEvidence::capture(&primary, span, algorithm, &settings)?;
    let content = primary.content()?;
    let quote = TextFragment::new(span).extract(&content)?;

    let store = AnchorStore::open(&config.home)?;
    let record = store.capture(&document, span, quote, evidence, None)?;

    println!("Anchor ID: {}", record.id);
    println!("Document:  {}", record.document.display());
    println!("Span:      {}", record.span);
    println!("Quote:     \"{}\"", record.quote);
    Ok(())
}

/// Execute the `verify` command
pub async fn execute_verify(id: &str) -> Result<()> {
    let store = AnchorStore::open_default()?;
    let state = find_anchor(&store, id)?;
    let primary = read_document(&state.record.document).await?;

    if state.record.evidence.verify(&primary)? {
        println!("{}: unchanged since capture", state.record.id);
    } else {
        println!("{}: document changed since capture", state.record.id);
    }
    Ok(())
}

/// Execute the `resolve` command
pub async fn execute_resolve(id: &str, strategy: Option<Strategy>, reanchor: bool) -> Result<()> {
    let config = config()?;
    let strategy = strategy.unwrap_or(config.strategy);
    let store = AnchorStore::open(&config.home)?;
    let state = find_anchor(&store, id)?;
    let primary = read_document(&state.record.document).await?;

    let outcome = revalidate_anchor(&state, &primary, strategy, &config.anchoring)?;
    record_outcome(&store, &state, outcome, strategy)?;

    let content = primary.content()?;
    let span = match outcome {
        Outcome::Unchanged => {
            println!("{}: unchanged at {}", state.record.id, state.current);
            state.current
        }
        Outcome::Relocated { from, to } => {
            println!("{}: relocated {} -> {} ({})", state.record.id, from, to, strategy);
            to
        }
        Outcome::Orphaned(reason) => {
            println!("{}: ORPHANED ({})", state.record.id, reason);
            println!("Re-anchor manually with `textanchor capture`.");
            return Ok(());
        }
    };
    println!("Text: \"{}\"", snippet(&content, span));

    if reanchor {
        if outcome == Outcome::Unchanged {
            println!("Evidence still matches, nothing to re-anchor");
        } else {
            reanchor_at(&store, config, &state, &primary, span)?;
        }
    }
    Ok(())
}

/// Capture fresh evidence at `span`, superseding the old anchor
fn reanchor_at(
    store: &AnchorStore,
    config: &ResolvedConfig,
    state: &AnchorState,
    primary: &BytePrimary,
    span: Span,
) -> Result<()> {
    let evidence = AnchorEvidence::capture(
        primary,
        span,
        state.record.evidence.algorithm(),
        &config.anchoring,
    )?;
    let content = primary.content()?;
    let quote = TextFragment::new(span).extract(&content)?;

    let record = store.capture(
        &state.record.document,
        span,
        quote,
        evidence,
        Some(&state.record.id),
    )?;
    println!("Re-anchored as {} (supersedes {})", record.id, state.record.id);
    Ok(())
}

/// Execute the `revalidate` command
pub async fn execute_revalidate(strategy: Option<Strategy>) -> Result<()> {
    let config = config()?;
    let strategy = strategy.unwrap_or(config.strategy);
    let store = AnchorStore::open(&config.home)?;
    let live = store.live()?;

    if live.is_empty() {
        println!("No anchors to revalidate");
        return Ok(());
    }

    // Group anchors by document so each file is read once
    let mut by_document: HashMap<PathBuf, Vec<AnchorState>> = HashMap::new();
    for state in live {
        by_document
            .entry(state.record.document.clone())
            .or_default()
            .push(state);
    }

    let mut unchanged = 0;
    let mut relocated = 0;
    let mut orphaned = 0;
    let mut failed = 0;
    let mut missing = 0;

    for (document, states) in by_document {
        println!("Document: {}", document.display());

        if !document.exists() {
            println!("  Status: MISSING ({} anchors)", states.len());
            missing += states.len();
            continue;
        }

        let primary = Arc::new(read_document(&document).await?);
        let results = revalidate_all(states, primary, strategy, config.anchoring).await?;

        for (state, outcome) in results {
            match outcome {
                Ok(outcome) => {
                    match outcome {
                        Outcome::Unchanged => unchanged += 1,
                        Outcome::Relocated { from, to } => {
                            relocated += 1;
                            println!("    RELOCATED: {} {} -> {}", state.record.id, from, to);
                        }
                        Outcome::Orphaned(reason) => {
                            orphaned += 1;
                            println!("    ORPHANED: {} ({})", state.record.id, reason);
                        }
                    }
                    record_outcome(&store, &state, outcome, strategy)?;
                }
                Err(e) => {
                    failed += 1;
                    println!("    ERROR: {} ({})", state.record.id, e);
                }
            }
        }
    }

    info!(unchanged, relocated, orphaned, failed, missing, "Revalidation complete");

    println!();
    println!("Summary ({}):", strategy);
    println!("  Unchanged: {}", unchanged);
    println!("  Relocated: {}", relocated);
    println!("  Orphaned:  {}", orphaned);
    if failed > 0 {
        println!("  Errors:    {}", failed);
    }
    if missing > 0 {
        println!("  Document missing: {}", missing);
    }
    Ok(())
}

/// Execute the `show` command
pub async fn execute_show(id: &str) -> Result<()> {
    let store = AnchorStore::open_default()?;
    let state = find_anchor(&store, id)?;
    let record = &state.record;
    let evidence = &record.evidence;

    println!("Anchor ID:  {}", record.id);
    println!("Status:     {}", state.status.as_str());
    println!("Document:   {}", record.document.display());
    println!("Captured:   {} at {}", record.span, record.created_at.to_rfc3339());
    println!("Current:    {}", state.current);
    if let Some(old) = &record.supersedes {
        println!("Supersedes: {}", old);
    }
    if let Some(reason) = &state.orphan_reason {
        println!("Orphaned:   {}", reason);
    }
    println!();
    println!("Quote:");
    println!("  \"{}\"", record.quote);
    println!();
    println!("Evidence:");
    println!("  Checksum: {}:{}", evidence.algorithm(), evidence.checksum_hex());
    println!("  Before:   {:?}", evidence.before_context());
    println!("  After:    {:?}", evidence.after_context());
    if let Some(samples) = evidence.samples() {
        println!("  Samples:  {:?} .. {:?}", samples.start, samples.end);
    }

    if record.document.exists() {
        let primary = read_document(&record.document).await?;
        let content = primary.content()?;
        println!();
        println!("Current text:");
        println!("  \"{}\"", snippet(&content, state.current));
    } else {
        println!();
        println!("(document not found)");
    }
    Ok(())
}

/// Execute the `list` command
pub fn execute_list(all: bool) -> Result<()> {
    let store = AnchorStore::open_default()?;
    let states = if all { store.states()? } else { store.live()? };

    if states.is_empty() {
        println!("No anchors found");
        return Ok(());
    }

    println!("{:<18} {:<11} {:<14} DOCUMENT", "ID", "STATUS", "SPAN");
    for state in states {
        println!(
            "{:<18} {:<11} {:<14} {}",
            state.record.id,
            state.status.as_str(),
            state.current.to_string(),
            state.record.document.display()
        );
    }
    Ok(())
}

/// Execute the `remove` command
pub fn execute_remove(id: &str) -> Result<()> {
    let store = AnchorStore::open_default()?;
    let state = find_anchor(&store, id)?;
    store.remove(&state.record.id)?;
    println!("Removed {}", state.record.id);
    Ok(())
}
