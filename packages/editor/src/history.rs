//! # Undo/Redo History
//!
//! Snapshot-based history over immutable document versions.
//!
//! ## Design
//!
//! - Each commit pushes the current version onto `past` and makes the new
//!   version current; any redo branch is discarded
//! - Undo moves the current version onto `future` and restores the top of
//!   `past`; redo is the mirror image
//! - Consecutive edits of the same block property are coalesced into one
//!   entry until a [`CommitBoundary`] arrives, the coalescing window expires,
//!   or a different kind of edit is committed
//! - `past` is bounded; the oldest entries are discarded first
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new(doc.clone(), HistoryConfig::default());
//!
//! history.commit(next, CommitKind::Structural);
//! history.undo();   // back to `doc`
//! history.redo();   // forward to `next`
//! ```

use crate::document::{BlockId, Document};
use campaign_common::HistorySettings;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// History limits and coalescing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of undo levels (at least 1)
    pub max_entries: usize,

    /// Edits further apart than this start a new entry; `None` coalesces
    /// until an explicit boundary
    pub coalesce_window: Option<Duration>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::from(&HistorySettings::default())
    }
}

impl From<&HistorySettings> for HistoryConfig {
    fn from(settings: &HistorySettings) -> Self {
        Self {
            max_entries: settings.max_entries.max(1),
            coalesce_window: settings.coalesce_window_ms.map(Duration::from_millis),
        }
    }
}

/// Which property of a block an edit touched
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditKey {
    Prop(String),
    Style(String),
}

/// How a commit should be recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitKind {
    /// Add/move/delete/duplicate: always its own entry
    Structural,

    /// High-frequency edit of one block property; eligible for coalescing
    PropEdit { block_id: BlockId, key: EditKey },
}

/// Explicit end of an editing session (e.g. a text field lost focus)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitBoundary;

/// A recorded document version
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub document: Arc<Document>,

    /// Logical timestamp (monotonic commit sequence number)
    pub timestamp: u64,
}

#[derive(Debug, Clone)]
struct OpenEdit {
    block_id: BlockId,
    key: EditKey,
    last_at: Instant,
}

/// Undo/redo controller over document snapshots
#[derive(Debug)]
pub struct History {
    past: VecDeque<HistoryEntry>,
    present: HistoryEntry,
    future: Vec<HistoryEntry>,
    config: HistoryConfig,
    clock: u64,
    open_edit: Option<OpenEdit>,
}

impl History {
    pub fn new(document: Arc<Document>, config: HistoryConfig) -> Self {
        Self {
            past: VecDeque::new(),
            present: HistoryEntry {
                document,
                timestamp: 0,
            },
            future: Vec::new(),
            config: HistoryConfig {
                max_entries: config.max_entries.max(1),
                ..config
            },
            clock: 0,
            open_edit: None,
        }
    }

    /// Record a new version produced by the builder store
    pub fn commit(&mut self, next: Arc<Document>, kind: CommitKind) {
        self.commit_at(next, kind, Instant::now());
    }

    /// Record a new version, using `at` as the wall-clock time of the edit
    pub fn commit_at(&mut self, next: Arc<Document>, kind: CommitKind, at: Instant) {
        self.clock += 1;
        let entry = HistoryEntry {
            document: next,
            timestamp: self.clock,
        };

        if self.extends_open_edit(&kind, at) {
            // Same property still being edited: the pre-edit snapshot is
            // already in `past`, only the current version moves forward.
            if let Some(open) = &mut self.open_edit {
                open.last_at = at;
            }
            self.present = entry;
            self.future.clear();
            return;
        }

        let previous = std::mem::replace(&mut self.present, entry);
        self.push_past(previous);
        self.future.clear();

        self.open_edit = match kind {
            CommitKind::PropEdit { block_id, key } => Some(OpenEdit {
                block_id,
                key,
                last_at: at,
            }),
            CommitKind::Structural => None,
        };
    }

    fn extends_open_edit(&self, kind: &CommitKind, at: Instant) -> bool {
        let (Some(open), CommitKind::PropEdit { block_id, key }) = (&self.open_edit, kind) else {
            return false;
        };

        if open.block_id != *block_id || open.key != *key {
            return false;
        }

        match self.config.coalesce_window {
            Some(window) => at.saturating_duration_since(open.last_at) <= window,
            None => true,
        }
    }

    fn push_past(&mut self, entry: HistoryEntry) {
        self.past.push_back(entry);

        // Trim if exceeded max levels
        while self.past.len() > self.config.max_entries {
            self.past.pop_front();
        }
    }

    /// End the current coalescing session
    pub fn boundary(&mut self, _signal: CommitBoundary) {
        self.open_edit = None;
    }

    /// Step back one entry; returns the restored version, or `None` if there
    /// is nothing to undo
    pub fn undo(&mut self) -> Option<Arc<Document>> {
        let previous = self.past.pop_back()?;
        self.open_edit = None;

        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Some(self.present.document.clone())
    }

    /// Step forward one entry; returns the restored version, or `None` if
    /// there is nothing to redo
    pub fn redo(&mut self) -> Option<Arc<Document>> {
        let next = self.future.pop()?;
        self.open_edit = None;

        let current = std::mem::replace(&mut self.present, next);
        self.push_past(current);
        Some(self.present.document.clone())
    }

    /// Clear both stacks and start over from `document`
    pub fn reset(&mut self, document: Arc<Document>) {
        self.past.clear();
        self.future.clear();
        self.open_edit = None;
        self.present = HistoryEntry {
            document,
            timestamp: self.clock,
        };
        tracing::info!("History reset");
    }

    pub fn present(&self) -> &Arc<Document> {
        &self.present.document
    }

    pub fn present_entry(&self) -> &HistoryEntry {
        &self.present
    }

    /// Past entries, oldest first
    pub fn past(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.past.iter()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}
