//! # Builder Intents
//!
//! Serialisable descriptions of the operations the builder store accepts.
//! UI events, drag gestures and scripted edits all end up as an [`Intent`]
//! handed to [`BuilderStore::apply`](crate::BuilderStore::apply).
//!
//! ## Semantics
//!
//! - Intents are total: one that references a missing block is ignored and
//!   reported as [`Outcome::Ignored`], never as an error.
//! - `MoveBlock` follows array-move semantics: the moved block takes the
//!   original index of `over_id`, so it lands before `over_id` when moving up
//!   and after it when moving down.
//! - `UpdateBlockProp` / `UpdateBlockStyle` replace a single map entry.

use crate::document::{BlockId, BlockType, PropValue, StyleValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation requested from the builder store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Intent {
    /// Insert a new block from the registry template (append when no index)
    #[serde(rename_all = "camelCase")]
    AddBlock {
        block_type: BlockType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at_index: Option<usize>,
    },

    /// Move a block to the position of another block
    #[serde(rename_all = "camelCase")]
    MoveBlock { block_id: BlockId, over_id: BlockId },

    /// Move a block to an absolute index
    #[serde(rename_all = "camelCase")]
    MoveBlockTo { block_id: BlockId, index: usize },

    #[serde(rename_all = "camelCase")]
    DeleteBlock { block_id: BlockId },

    /// Insert a deep copy right after the original
    #[serde(rename_all = "camelCase")]
    DuplicateBlock { block_id: BlockId },

    #[serde(rename_all = "camelCase")]
    UpdateBlockProp {
        block_id: BlockId,
        name: String,
        value: PropValue,
    },

    #[serde(rename_all = "camelCase")]
    UpdateBlockStyle {
        block_id: BlockId,
        key: String,
        value: StyleValue,
    },

    /// Change selection only; never touches the blocks
    #[serde(rename_all = "camelCase")]
    SetSelectedBlock { block_id: Option<BlockId> },
}

impl Intent {
    /// Whether this intent can change the block sequence
    pub fn is_document_edit(&self) -> bool {
        !matches!(self, Intent::SetSelectedBlock { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::AddBlock { .. } => "addBlock",
            Intent::MoveBlock { .. } => "moveBlock",
            Intent::MoveBlockTo { .. } => "moveBlockTo",
            Intent::DeleteBlock { .. } => "deleteBlock",
            Intent::DuplicateBlock { .. } => "duplicateBlock",
            Intent::UpdateBlockProp { .. } => "updateBlockProp",
            Intent::UpdateBlockStyle { .. } => "updateBlockStyle",
            Intent::SetSelectedBlock { .. } => "setSelectedBlock",
        }
    }
}

/// Why an intent left the document untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoredReason {
    BlockNotFound(BlockId),
    SameBlock,
    AlreadyInPlace,
    Unchanged,
}

impl fmt::Display for IgnoredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoredReason::BlockNotFound(id) => write!(f, "block {id} not found"),
            IgnoredReason::SameBlock => f.write_str("block dropped onto itself"),
            IgnoredReason::AlreadyInPlace => f.write_str("block already at target position"),
            IgnoredReason::Unchanged => f.write_str("value unchanged"),
        }
    }
}

/// Result of applying an intent
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A new document version was produced; `block_id` is the block that was
    /// created, moved, removed or edited
    Applied { block_id: BlockId },

    /// Only the selection changed
    SelectionChanged,

    /// Nothing changed
    Ignored(IgnoredReason),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }

    /// Id of the affected block when a new version was produced
    pub fn block_id(&self) -> Option<&str> {
        match self {
            Outcome::Applied { block_id } => Some(block_id),
            _ => None,
        }
    }
}
