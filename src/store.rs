//! Append-only anchor store with file-based persistence.
//!
//! Anchors and everything that happens to them are stored as
//! newline-delimited JSON in `anchors.jsonl`. The current state of each
//! anchor is derived by replaying the log; nothing is rewritten in place.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::anchor::Strategy;
use crate::domain::{AnchorEvidence, Span};
use crate::error::NoMatchReason;

/// An anchored span as captured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    /// Deterministic anchor ID
    pub id: String,
    /// Document the span was captured from
    pub document: PathBuf,
    /// Span at capture time
    pub span: Span,
    /// Text of the span at capture time
    pub quote: String,
    /// Relocation evidence
    pub evidence: AnchorEvidence,
    /// Anchor this one replaces, after re-anchoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entries in anchors.jsonl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEntry {
    /// New evidence was captured
    Captured { record: AnchorRecord },
    /// The span was found at a new location
    Relocated {
        id: String,
        from: Span,
        to: Span,
        strategy: Strategy,
    },
    /// Relocation failed; the anchor needs manual attention
    Orphaned {
        id: String,
        strategy: Strategy,
        reason: NoMatchReason,
    },
    /// A newer anchor replaces this one
    Superseded { id: String, by: String },
    /// The anchor was deleted
    Removed { id: String },
}

impl StoreEntry {
    /// The anchor this entry is about
    pub fn anchor_id(&self) -> &str {
        match self {
            StoreEntry::Captured { record } => &record.id,
            StoreEntry::Relocated { id, .. }
            | StoreEntry::Orphaned { id, .. }
            | StoreEntry::Superseded { id, .. }
            | StoreEntry::Removed { id } => id,
        }
    }
}

/// A timestamped line of the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEvent {
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: StoreEntry,
}

/// Lifecycle status of an anchor, derived by replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStatus {
    /// Span is known in the latest checked document version
    Active,
    /// Last relocation attempt failed
    Orphaned,
    /// Replaced by a newer anchor
    Superseded,
    /// Deleted
    Removed,
}

impl AnchorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorStatus::Active => "active",
            AnchorStatus::Orphaned => "orphaned",
            AnchorStatus::Superseded => "superseded",
            AnchorStatus::Removed => "removed",
        }
    }

    /// Whether the anchor should still be revalidated
    pub fn is_live(&self) -> bool {
        matches!(self, AnchorStatus::Active | AnchorStatus::Orphaned)
    }
}

/// Current state of one anchor
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorState {
    pub record: AnchorRecord,
    /// Last known span (the capture span until a relocation is recorded)
    pub current: Span,
    pub status: AnchorStatus,
    /// Reason for the last failed relocation
    pub orphan_reason: Option<NoMatchReason>,
    pub updated_at: DateTime<Utc>,
}

/// Compute a deterministic anchor ID
///
/// sha256(document + start + end + checksum)[0:16]
pub fn compute_anchor_id(document: &Path, span: Span, checksum_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.to_string_lossy().as_bytes());
    hasher.update(span.start.to_string().as_bytes());
    hasher.update(span.end.to_string().as_bytes());
    hasher.update(checksum_hex.as_bytes());

    let result = hasher.finalize();
    hex::encode(&result[..8]) // 16 hex chars = 8 bytes
}

/// File-based anchor store using JSONL format
pub struct AnchorStore {
    /// Path to the anchors.jsonl file
    path: PathBuf,
}

impl AnchorStore {
    /// Open (creating the directory if needed) the store under `home`
    pub fn open(home: &Path) -> Result<Self> {
        fs::create_dir_all(home)
            .with_context(|| format!("Failed to create store directory: {}", home.display()))?;

        Ok(Self {
            path: home.join("anchors.jsonl"),
        })
    }

    /// Open the store in the configured home directory
    pub fn open_default() -> Result<Self> {
        Self::open(&crate::config::config()?.home)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record newly captured evidence, optionally superseding an older anchor
    pub fn capture(
        &self,
        document: &Path,
        span: Span,
        quote: &str,
        evidence: AnchorEvidence,
        supersedes: Option<&str>,
    ) -> Result<AnchorRecord> {
        let id = compute_anchor_id(document, span, &evidence.checksum_hex());
        // Re-anchoring onto identical evidence yields the same ID
        let supersedes = supersedes.filter(|old| *old != id).map(str::to_string);

        let record = AnchorRecord {
            id,
            document: document.to_path_buf(),
            span,
            quote: quote.to_string(),
            evidence,
            supersedes,
            created_at: Utc::now(),
        };

        self.append(&StoreEntry::Captured {
            record: record.clone(),
        })?;

        if let Some(old_id) = &record.supersedes {
            self.append(&StoreEntry::Superseded {
                id: old_id.clone(),
                by: record.id.clone(),
            })?;
        }

        info!(id = %record.id, span = %record.span, "Anchor captured");
        Ok(record)
    }

    pub fn record_relocation(&self, id: &str, from: Span, to: Span, strategy: Strategy) -> Result<()> {
        self.append(&StoreEntry::Relocated {
            id: id.to_string(),
            from,
            to,
            strategy,
        })
    }

    pub fn record_orphan(&self, id: &str, strategy: Strategy, reason: NoMatchReason) -> Result<()> {
        self.append(&StoreEntry::Orphaned {
            id: id.to_string(),
            strategy,
            reason,
        })
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        self.append(&StoreEntry::Removed { id: id.to_string() })
    }

    /// Append an entry with file locking
    pub fn append(&self, entry: &StoreEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open anchor store: {}", self.path.display()))?;

        // Acquire exclusive lock
        file.lock_exclusive()
            .context("Failed to acquire file lock on anchors.jsonl")?;

        let event = StoreEvent {
            ts: Utc::now(),
            entry: entry.clone(),
        };
        let json = serde_json::to_string(&event).context("Failed to serialize store entry")?;

        writeln!(file, "{}", json).context("Failed to write store entry")?;
        file.flush().context("Failed to flush store entry")?;

        // Lock is released when file is dropped
        Ok(())
    }

    /// Replay all entries in order
    pub fn replay(&self) -> Result<Vec<StoreEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open anchor store: {}", self.path.display()))?;

        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event: StoreEvent = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse store entry: {}", line))?;
            events.push(event);
        }

        Ok(events)
    }

    /// Current state of every anchor, in capture order
    pub fn states(&self) -> Result<Vec<AnchorState>> {
        let mut states: Vec<AnchorState> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for event in self.replay()? {
            if let StoreEntry::Captured { record } = event.entry {
                let state = AnchorState {
                    current: record.span,
                    status: AnchorStatus::Active,
                    orphan_reason: None,
                    updated_at: event.ts,
                    record,
                };
                // Capturing identical evidence again resets the anchor
                if let Some(&idx) = index.get(&state.record.id) {
                    states[idx] = state;
                } else {
                    index.insert(state.record.id.clone(), states.len());
                    states.push(state);
                }
                continue;
            }

            let Some(&idx) = index.get(event.entry.anchor_id()) else {
                continue;
            };
            let state = &mut states[idx];
            state.updated_at = event.ts;

            match event.entry {
                StoreEntry::Relocated { to, .. } => {
                    state.current = to;
                    state.status = AnchorStatus::Active;
                    state.orphan_reason = None;
                }
                StoreEntry::Orphaned { reason, .. } => {
                    state.status = AnchorStatus::Orphaned;
                    state.orphan_reason = Some(reason);
                }
                StoreEntry::Superseded { .. } => state.status = AnchorStatus::Superseded,
                StoreEntry::Removed { .. } => state.status = AnchorStatus::Removed,
                StoreEntry::Captured { .. } => {}
            }
        }

        Ok(states)
    }

    /// Anchors that are neither superseded nor removed
    pub fn live(&self) -> Result<Vec<AnchorState>> {
        Ok(self
            .states()?
            .into_iter()
            .filter(|s| s.status.is_live())
            .collect())
    }

    /// Find an anchor by ID or unique ID prefix
    pub fn find(&self, id_prefix: &str) -> Result<Option<AnchorState>> {
        let mut found: Vec<AnchorState> = self
            .states()?
            .into_iter()
            .filter(|s| s.record.id.starts_with(id_prefix))
            .collect();

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            n => anyhow::bail!("Anchor ID prefix '{}' is ambiguous ({} matches)", id_prefix, n),
        }
    }
}
