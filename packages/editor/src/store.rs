//! # Builder Store
//!
//! The single authority over the current campaign document. Every edit goes
//! through one of the operations below, each of which builds a new
//! [`Document`] version and swaps it in; the previous version stays intact
//! for whoever holds it (history snapshots, renderers).
//!
//! The store is an ordinary owned value. Hosts create one per open document
//! and pass it (or the [`EditorSession`](crate::EditorSession) wrapping it)
//! to whatever needs it.

use crate::document::{find_index, Block, BlockId, BlockType, Document, PropValue, StyleValue};
use crate::errors::EditorError;
use crate::mutations::{IgnoredReason, Intent, Outcome};
use crate::registry::BlockRegistry;
use campaign_common::IdGenerator;
use std::sync::Arc;
use tracing::debug;

/// Owns the current document version and the selection
#[derive(Debug, Clone)]
pub struct BuilderStore {
    document: Arc<Document>,
    selected_block_id: Option<BlockId>,
    ids: IdGenerator,
    registry: BlockRegistry,
}

impl BuilderStore {
    /// Create a store with the built-in block templates
    pub fn new(document: Document) -> Result<Self, EditorError> {
        Self::with_registry(document, BlockRegistry::standard())
    }

    pub fn with_registry(document: Document, registry: BlockRegistry) -> Result<Self, EditorError> {
        document.check_invariants()?;

        let ids = Self::id_generator_for(&document);
        Ok(Self {
            document: Arc::new(document),
            selected_block_id: None,
            ids,
            registry,
        })
    }

    fn id_generator_for(document: &Document) -> IdGenerator {
        let mut ids = IdGenerator::for_document(&document.id);
        for block in &document.blocks {
            ids.observe(&block.id);
        }
        ids
    }

    /// Replace the document wholesale (new document opened)
    pub fn load(&mut self, document: Document) -> Result<(), EditorError> {
        document.check_invariants()?;

        tracing::info!(document_id = %document.id, blocks = document.len(), "Document loaded");
        self.ids = Self::id_generator_for(&document);
        self.document = Arc::new(document);
        self.selected_block_id = None;
        Ok(())
    }

    /// Current document version
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn selected_block_id(&self) -> Option<&str> {
        self.selected_block_id.as_deref()
    }

    /// The selected block, if the selection still resolves
    pub fn selected_block(&self) -> Option<&Block> {
        self.selected_block_id
            .as_deref()
            .and_then(|id| self.document.block(id))
    }

    /// Swap in a previously produced version (undo/redo)
    ///
    /// Ids seen in the restored version are observed so the generator never
    /// hands them out again. A selection that no longer resolves is cleared.
    pub(crate) fn restore(&mut self, document: Arc<Document>) {
        for block in &document.blocks {
            self.ids.observe(&block.id);
        }
        self.document = document;

        if let Some(id) = &self.selected_block_id {
            if !self.document.contains(id) {
                debug!(block_id = %id, "Selection no longer resolves, clearing");
                self.selected_block_id = None;
            }
        }
    }

    /// Dispatch an intent to the matching operation
    pub fn apply(&mut self, intent: Intent) -> Outcome {
        let name = intent.name();
        let outcome = match intent {
            Intent::AddBlock { block_type, at_index } => self.add_block(block_type, at_index),
            Intent::MoveBlock { block_id, over_id } => self.move_block(&block_id, &over_id),
            Intent::MoveBlockTo { block_id, index } => self.move_block_to(&block_id, index),
            Intent::DeleteBlock { block_id } => self.delete_block(&block_id),
            Intent::DuplicateBlock { block_id } => self.duplicate_block(&block_id),
            Intent::UpdateBlockProp { block_id, name, value } => {
                self.update_block_prop(&block_id, &name, value)
            }
            Intent::UpdateBlockStyle { block_id, key, value } => {
                self.update_block_style(&block_id, &key, value)
            }
            Intent::SetSelectedBlock { block_id } => self.set_selected_block_id(block_id),
        };

        if let Outcome::Ignored(reason) = &outcome {
            debug!(intent = name, %reason, "Intent ignored");
        }
        outcome
    }

    /// Insert a new block of `block_type`, appending when no index is given
    pub fn add_block(&mut self, block_type: BlockType, at_index: Option<usize>) -> Outcome {
        let id = self.fresh_id();
        let block = self.registry.create_block(block_type, id.clone());

        let mut blocks = self.document.blocks.clone();
        let index = at_index.unwrap_or(blocks.len()).min(blocks.len());
        blocks.insert(index, Arc::new(block));

        debug!(block_id = %id, %block_type, index, "Block added");
        self.commit_blocks(blocks);
        Outcome::Applied { block_id: id }
    }

    /// Move `block_id` to the original position of `over_id`
    pub fn move_block(&mut self, block_id: &str, over_id: &str) -> Outcome {
        if block_id == over_id {
            return Outcome::Ignored(IgnoredReason::SameBlock);
        }

        let Some(from) = find_index(&self.document.blocks, block_id) else {
            return Outcome::Ignored(IgnoredReason::BlockNotFound(block_id.to_string()));
        };
        let Some(to) = find_index(&self.document.blocks, over_id) else {
            return Outcome::Ignored(IgnoredReason::BlockNotFound(over_id.to_string()));
        };

        self.relocate(from, to)
    }

    /// Move `block_id` to an absolute index, clamped to the last position
    pub fn move_block_to(&mut self, block_id: &str, index: usize) -> Outcome {
        let Some(from) = find_index(&self.document.blocks, block_id) else {
            return Outcome::Ignored(IgnoredReason::BlockNotFound(block_id.to_string()));
        };

        let to = index.min(self.document.blocks.len() - 1);
        if from == to {
            return Outcome::Ignored(IgnoredReason::AlreadyInPlace);
        }

        self.relocate(from, to)
    }

    fn relocate(&mut self, from: usize, to: usize) -> Outcome {
        let mut blocks = self.document.blocks.clone();
        let moved = blocks.remove(from);
        let block_id = moved.id.clone();
        blocks.insert(to, moved);

        debug!(block_id = %block_id, from, to, "Block moved");
        self.commit_blocks(blocks);
        Outcome::Applied { block_id }
    }

    /// Remove a block, clearing the selection if it pointed at it
    pub fn delete_block(&mut self, block_id: &str) -> Outcome {
        let Some(index) = find_index(&self.document.blocks, block_id) else {
            return Outcome::Ignored(IgnoredReason::BlockNotFound(block_id.to_string()));
        };

        let mut blocks = self.document.blocks.clone();
        blocks.remove(index);

        if self.selected_block_id.as_deref() == Some(block_id) {
            self.selected_block_id = None;
        }

        debug!(block_id, index, "Block deleted");
        self.commit_blocks(blocks);
        Outcome::Applied {
            block_id: block_id.to_string(),
        }
    }

    /// Insert a deep copy with a fresh id right after the original
    pub fn duplicate_block(&mut self, block_id: &str) -> Outcome {
        let Some(index) = find_index(&self.document.blocks, block_id) else {
            return Outcome::Ignored(IgnoredReason::BlockNotFound(block_id.to_string()));
        };

        let id = self.fresh_id();
        // Cloning the block (not the Arc) copies every nested list, so the copy
        // shares no prop data with the original.
        let mut copy = Block::clone(&self.document.blocks[index]);
        copy.id = id.clone();

        let mut blocks = self.document.blocks.clone();
        blocks.insert(index + 1, Arc::new(copy));

        debug!(source = block_id, block_id = %id, "Block duplicated");
        self.commit_blocks(blocks);
        Outcome::Applied { block_id: id }
    }

    /// Replace a single entry in a block's props
    pub fn update_block_prop(&mut self, block_id: &str, name: &str, value: PropValue) -> Outcome {
        self.edit_block(block_id, |block| {
            if block.props.get(name) == Some(&value) {
                return false;
            }
            block.props.insert(name.to_string(), value);
            true
        })
    }

    /// Replace a single entry in a block's styles
    pub fn update_block_style(&mut self, block_id: &str, key: &str, value: StyleValue) -> Outcome {
        self.edit_block(block_id, |block| {
            if block.styles.get(key) == Some(&value) {
                return false;
            }
            block.styles.insert(key.to_string(), value);
            true
        })
    }

    /// Update selection only
    pub fn set_selected_block_id(&mut self, block_id: Option<BlockId>) -> Outcome {
        if self.selected_block_id == block_id {
            return Outcome::Ignored(IgnoredReason::Unchanged);
        }
        self.selected_block_id = block_id;
        Outcome::SelectionChanged
    }

    fn edit_block(&mut self, block_id: &str, edit: impl FnOnce(&mut Block) -> bool) -> Outcome {
        let Some(index) = find_index(&self.document.blocks, block_id) else {
            return Outcome::Ignored(IgnoredReason::BlockNotFound(block_id.to_string()));
        };

        let mut block = Block::clone(&self.document.blocks[index]);
        if !edit(&mut block) {
            return Outcome::Ignored(IgnoredReason::Unchanged);
        }

        let mut blocks = self.document.blocks.clone();
        blocks[index] = Arc::new(block);

        debug!(block_id, "Block updated");
        self.commit_blocks(blocks);
        Outcome::Applied {
            block_id: block_id.to_string(),
        }
    }

    fn commit_blocks(&mut self, blocks: Vec<Arc<Block>>) {
        self.document = Arc::new(Document {
            id: self.document.id.clone(),
            blocks,
            metadata: self.document.metadata.clone(),
        });
    }

    fn fresh_id(&mut self) -> BlockId {
        loop {
            let id = self.ids.new_id();
            if !self.document.contains(&id) {
                return id;
            }
        }
    }
}
