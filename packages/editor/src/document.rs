//! # Document Model
//!
//! A campaign is an ordered sequence of content blocks plus a free-form
//! metadata bag. Documents are values: the engine never edits one in place,
//! it builds the next version and shares every untouched block through `Arc`.
//!
//! ```text
//! Document v1: [A, B, C]
//!                  │
//!        update_block_prop(B, ...)
//!                  ↓
//! Document v2: [A, B', C]     (A and C are the same allocations as in v1)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Block identifier, unique within a document
pub type BlockId = String;

/// Map of block properties (also used for repeating sub-objects)
pub type PropMap = BTreeMap<String, PropValue>;

/// Map of block style entries
pub type StyleMap = BTreeMap<String, StyleValue>;

/// Closed set of block templates the builder can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockType {
    Hero,
    Features1,
    Features2,
    Testimonials,
    Pricing,
    Cta,
    Faq,
    Footer,
}

impl BlockType {
    pub const ALL: [BlockType; 8] = [
        BlockType::Hero,
        BlockType::Features1,
        BlockType::Features2,
        BlockType::Testimonials,
        BlockType::Pricing,
        BlockType::Cta,
        BlockType::Faq,
        BlockType::Footer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Hero => "Hero",
            BlockType::Features1 => "Features1",
            BlockType::Features2 => "Features2",
            BlockType::Testimonials => "Testimonials",
            BlockType::Pricing => "Pricing",
            BlockType::Cta => "Cta",
            BlockType::Faq => "Faq",
            BlockType::Footer => "Footer",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown block type: {0}")]
pub struct UnknownBlockType(pub String);

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownBlockType(s.to_string()))
    }
}

/// Value of a single block property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Repeating content such as feature items or FAQ entries
    List(Vec<PropMap>),
}

impl PropValue {
    pub fn kind(&self) -> PropKind {
        match self {
            PropValue::Bool(_) => PropKind::Bool,
            PropValue::Number(_) => PropKind::Number,
            PropValue::Text(_) => PropKind::Text,
            PropValue::List(_) => PropKind::List,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropMap]> {
        match self {
            PropValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Text(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Text(s)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

/// Shape tag of a [`PropValue`], used by template schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropKind {
    Bool,
    Number,
    Text,
    List,
}

/// Value of a single style entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Text(s.to_string())
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

/// A single content unit within a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,

    #[serde(rename = "type")]
    pub block_type: BlockType,

    #[serde(default)]
    pub props: PropMap,

    #[serde(default)]
    pub styles: StyleMap,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            props: PropMap::new(),
            styles: StyleMap::new(),
        }
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }
}

/// A campaign document (aka campaign config)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,

    #[serde(default)]
    pub blocks: Vec<Arc<Block>>,

    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A structural invariant that the engine should never break
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("Duplicate block id: {0}")]
    DuplicateBlockId(BlockId),

    #[error("Empty block id at position {0}")]
    EmptyBlockId(usize),
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            blocks: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Build a document from owned blocks
    pub fn with_blocks(id: impl Into<String>, blocks: impl IntoIterator<Item = Block>) -> Self {
        Self {
            id: id.into(),
            blocks: blocks.into_iter().map(Arc::new).collect(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id).map(|b| b.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        find_index(&self.blocks, id).is_some()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        find_index(&self.blocks, id)
    }

    pub fn len(&self) -> usize {
        count(&self.blocks)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block ids in render order
    pub fn block_ids(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.id.as_str()).collect()
    }

    /// Verify ids are non-empty and pairwise distinct
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::with_capacity(self.blocks.len());

        for (position, block) in self.blocks.iter().enumerate() {
            if block.id.is_empty() {
                return Err(InvariantViolation::EmptyBlockId(position));
            }
            if !seen.insert(block.id.as_str()) {
                return Err(InvariantViolation::DuplicateBlockId(block.id.clone()));
            }
        }

        Ok(())
    }
}

/// Position of a block within a block sequence
pub fn find_index(blocks: &[Arc<Block>], id: &str) -> Option<usize> {
    blocks.iter().position(|b| b.id == id)
}

/// Number of blocks in a block sequence
pub fn count(blocks: &[Arc<Block>]) -> usize {
    blocks.len()
}
