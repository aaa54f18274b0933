//! # Campaign Editor
//!
//! Document-editing engine for the campaign builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ sensors: pointer / keyboard input           │
//! │  → DragStart / DragOver / DragEnd           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ drag: gesture state machine → Intent        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: BuilderStore                         │
//! │  - add / move / delete / duplicate / update │
//! │  - selection                                │
//! │  - new Document version per edit            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ history: snapshots, coalescing, undo/redo   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Documents are values**: each edit yields a new version; untouched
//!    blocks are shared between versions
//! 2. **Total operations**: stale ids are ignored, never errors
//! 3. **One owner**: the session owns the document; everything else submits
//!    intents
//! 4. **Persistence is external**: saving goes through the [`Persist`] trait
//!
//! ## Usage
//!
//! ```rust,ignore
//! use campaign_editor::{BlockType, Document, EditorSession, Intent, SessionConfig};
//!
//! let mut session = EditorSession::new(Document::new("spring-launch"), SessionConfig::default())?;
//!
//! session.dispatch(Intent::AddBlock { block_type: BlockType::Hero, at_index: None });
//! session.undo();
//!
//! session.save(&JsonFilePersist::new("spring-launch.json")).await?;
//! ```

mod document;
mod drag;
mod errors;
mod history;
mod mutations;
mod persist;
mod registry;
mod sensors;
mod session;
mod store;

pub use document::{
    count, find_index, Block, BlockId, BlockType, Document, InvariantViolation, PropKind,
    PropMap, PropValue, StyleMap, StyleValue, UnknownBlockType,
};
pub use drag::{
    insertion_index, resolve_drop, CancelReason, DragController, DragEvent, DragItem,
    DragOutcome, DragSource, DragState, DropTarget, IgnoredDragEvent, Placement, ZoneRect,
};
pub use errors::EditorError;
pub use history::{CommitBoundary, CommitKind, EditKey, History, HistoryConfig, HistoryEntry};
pub use mutations::{IgnoredReason, Intent, Outcome};
pub use persist::{JsonFilePersist, Persist, PersistError};
pub use registry::{BlockRegistry, BlockTemplate, RegistryError};
pub use sensors::{DragConfig, KeyCommand, KeyboardSensor, Point, PointerSensor, SensorSignal};
pub use session::{EditorSession, SavedSnapshot, SessionConfig};
pub use store::BuilderStore;
