//! # Editor Session
//!
//! One open campaign: the builder store, its undo history and the drag
//! controller, owned together and passed around explicitly by the host.
//!
//! ```text
//! sensor / UI event ──▶ DragController ──▶ Intent ─┐
//!                                                   ├─▶ BuilderStore ──▶ History
//! direct UI action ─────────────────────▶ Intent ─┘
//! ```

use crate::document::{BlockId, Document};
use crate::drag::{CancelReason, DragController, DragEvent, DragItem, DragOutcome};
use crate::errors::EditorError;
use crate::history::{CommitBoundary, CommitKind, EditKey, History, HistoryConfig};
use crate::mutations::{Intent, Outcome};
use crate::persist::Persist;
use crate::registry::BlockRegistry;
use crate::sensors::{DragConfig, SensorSignal};
use crate::store::BuilderStore;
use campaign_common::BuilderConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Session-level settings derived from [`BuilderConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionConfig {
    pub history: HistoryConfig,
    pub drag: DragConfig,
}

impl From<&BuilderConfig> for SessionConfig {
    fn from(config: &BuilderConfig) -> Self {
        Self {
            history: HistoryConfig::from(&config.history),
            drag: DragConfig::from(&config.drag),
        }
    }
}

/// Last successful save
#[derive(Debug, Clone)]
pub struct SavedSnapshot {
    pub document: Arc<Document>,
    pub saved_at: DateTime<Utc>,
}

/// Editing state for one open campaign document
#[derive(Debug)]
pub struct EditorSession {
    store: BuilderStore,
    history: History,
    drag: DragController,
    config: SessionConfig,
    /// Version `is_dirty` compares against: the loaded or last saved one
    baseline: Arc<Document>,
    last_saved: Option<SavedSnapshot>,
}

impl EditorSession {
    pub fn new(document: Document, config: SessionConfig) -> Result<Self, EditorError> {
        Self::with_registry(document, BlockRegistry::standard(), config)
    }

    pub fn with_registry(
        document: Document,
        registry: BlockRegistry,
        config: SessionConfig,
    ) -> Result<Self, EditorError> {
        let store = BuilderStore::with_registry(document, registry)?;
        let history = History::new(store.document().clone(), config.history);
        let baseline = store.document().clone();

        Ok(Self {
            store,
            history,
            drag: DragController::new(),
            config,
            baseline,
            last_saved: None,
        })
    }

    /// Open a different document, discarding history and drag state
    pub fn load(&mut self, document: Document) -> Result<(), EditorError> {
        self.store.load(document)?;
        self.history.reset(self.store.document().clone());
        self.drag = DragController::new();
        self.baseline = self.store.document().clone();
        self.last_saved = None;
        Ok(())
    }

    pub fn document(&self) -> &Arc<Document> {
        self.store.document()
    }

    pub fn store(&self) -> &BuilderStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selected_block_id(&self) -> Option<&str> {
        self.store.selected_block_id()
    }

    /// Apply an intent and record the new version in history
    pub fn dispatch(&mut self, intent: Intent) -> Outcome {
        self.dispatch_at(intent, Instant::now())
    }

    /// Like [`dispatch`](Self::dispatch), with an explicit edit time for the
    /// coalescing window
    pub fn dispatch_at(&mut self, intent: Intent, at: Instant) -> Outcome {
        let kind = commit_kind(&intent);
        let outcome = self.store.apply(intent);

        if outcome.is_applied() {
            self.history
                .commit_at(self.store.document().clone(), kind, at);
        }
        outcome
    }

    /// End the current keystroke-coalescing session (e.g. field blur)
    pub fn commit_boundary(&mut self) {
        self.history.boundary(CommitBoundary);
    }

    /// Returns `true` if a version was restored
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(document) => {
                self.store.restore(document);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if a version was restored
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(document) => {
                self.store.restore(document);
                true
            }
            None => false,
        }
    }

    /// Feed one drag event; a drop dispatches the resulting intent
    ///
    /// A drop the store ignores (already in place, stale id) is reported as
    /// `Cancelled(NoChange)`.
    pub fn handle_drag(&mut self, event: DragEvent) -> DragOutcome {
        let outcome = self.drag.handle(event, self.store.document());

        let DragOutcome::Dropped(intent) = &outcome else {
            return outcome;
        };
        self.history.boundary(CommitBoundary);
        match self.dispatch(intent.clone()) {
            Outcome::Ignored(reason) => {
                tracing::debug!(%reason, "Drop left the document unchanged");
                DragOutcome::Cancelled(CancelReason::NoChange)
            }
            _ => outcome,
        }
    }

    /// Feed one sensor signal; clicks on canvas blocks select them
    pub fn handle_sensor(&mut self, signal: SensorSignal) -> Option<DragOutcome> {
        match signal {
            SensorSignal::Drag(event) => Some(self.handle_drag(event)),
            SensorSignal::Click(DragItem::Block { id }) => {
                self.select(Some(id));
                None
            }
            SensorSignal::Click(DragItem::Template { .. }) => None,
        }
    }

    /// Change selection; not recorded in history
    pub fn select(&mut self, block_id: Option<BlockId>) -> Outcome {
        self.store.set_selected_block_id(block_id)
    }

    /// Save the current version through `persist`
    ///
    /// A failed save leaves the local document and history untouched.
    pub async fn save<P: Persist>(&mut self, persist: &P) -> Result<Arc<Document>, EditorError> {
        let document = self.store.document().clone();

        match persist.persist(&document).await {
            Ok(stored) => {
                let stored = Arc::new(stored);
                tracing::info!(document_id = %stored.id, blocks = stored.len(), "Document saved");
                self.baseline = document.clone();
                self.last_saved = Some(SavedSnapshot {
                    document: document.clone(),
                    saved_at: Utc::now(),
                });
                Ok(stored)
            }
            Err(err) => {
                tracing::warn!(document_id = %document.id, error = %err, "Save failed");
                Err(err.into())
            }
        }
    }

    pub fn last_saved(&self) -> Option<&SavedSnapshot> {
        self.last_saved.as_ref()
    }

    /// Whether the current version differs from the loaded or last saved one
    pub fn is_dirty(&self) -> bool {
        !Arc::ptr_eq(&self.baseline, self.store.document())
            && *self.baseline != **self.store.document()
    }
}

fn commit_kind(intent: &Intent) -> CommitKind {
    match intent {
        Intent::UpdateBlockProp { block_id, name, .. } => CommitKind::PropEdit {
            block_id: block_id.clone(),
            key: EditKey::Prop(name.clone()),
        },
        Intent::UpdateBlockStyle { block_id, key, .. } => CommitKind::PropEdit {
            block_id: block_id.clone(),
            key: EditKey::Style(key.clone()),
        },
        _ => CommitKind::Structural,
    }
}
