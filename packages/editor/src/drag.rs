//! # Drag-and-Drop Controller
//!
//! Translates the abstract drag protocol into builder intents. The controller
//! never touches the document; on drop it hands back the [`Intent`] the
//! session should dispatch.
//!
//! ```text
//!          Start                Over*                 End
//! Idle ──────────▶ Dragging ──────────▶ Dragging ──────────▶ Dropped ─▶ Idle
//!                    │  (over = target)                 └──▶ Cancelled ─▶ Idle
//!                    └────────────── Cancel ──────────────▶ Cancelled ─▶ Idle
//! ```
//!
//! `Over` only updates the hovered target for visual feedback. What gets
//! committed is decided by the target carried on `End`.

use crate::document::{find_index, BlockId, BlockType, Document};
use crate::mutations::Intent;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a drag gesture started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragSource {
    Palette,
    Canvas,
}

/// The thing being dragged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragItem {
    /// A palette template; `block_type` is read from the item's metadata
    Template { template_id: String, block_type: BlockType },

    /// An existing block on the canvas
    Block { id: BlockId },
}

impl DragItem {
    pub fn source(&self) -> DragSource {
        match self {
            DragItem::Template { .. } => DragSource::Palette,
            DragItem::Block { .. } => DragSource::Canvas,
        }
    }

    /// Id of the dragged template or block
    pub fn active_id(&self) -> &str {
        match self {
            DragItem::Template { template_id, .. } => template_id,
            DragItem::Block { id } => id,
        }
    }
}

/// Which half of a block the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Before,
    After,
}

/// Vertical extent of a drop zone in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneRect {
    pub top: f64,
    pub height: f64,
}

impl ZoneRect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

impl Placement {
    /// Strictly above the vertical midpoint inserts before, anything else
    /// (including exactly on it) inserts after
    pub fn from_midpoint(pointer_y: f64, zone: ZoneRect) -> Self {
        if pointer_y < zone.midpoint() {
            Placement::Before
        } else {
            Placement::After
        }
    }
}

/// Candidate drop position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTarget {
    /// Over an existing block, on one of its halves
    ///
    /// `placement` positions new blocks from the palette. A canvas block
    /// dropped here takes the target's index (array move) whatever the half,
    /// so it lands before the target when moving up and after it when moving
    /// down. Hosts that want half-precise reorders send [`DropTarget::Index`].
    Block { id: BlockId, placement: Placement },

    /// An explicit insertion slot between blocks (`0..=len`)
    Index(usize),

    /// Empty canvas area; resolves to the end of the document
    Canvas,
}

impl DropTarget {
    pub fn block(id: impl Into<BlockId>, placement: Placement) -> Self {
        DropTarget::Block {
            id: id.into(),
            placement,
        }
    }
}

/// Abstract drag protocol emitted by sensors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragEvent {
    Start { item: DragItem },
    Over { target: Option<DropTarget> },
    End { target: Option<DropTarget> },
    Cancel,
}

/// Controller state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        item: DragItem,
        /// Hovered target, for visual feedback only
        over: Option<DropTarget>,
    },
}

/// Why a gesture ended without an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Explicit cancel (escape key, lost pointer)
    Aborted,
    /// Released outside any drop target
    NoTarget,
    /// Block dropped onto itself
    SameBlock,
    /// Target block is not in the document
    UnknownTarget,
    /// The drop resolved to an intent the builder store ignored
    NoChange,
}

/// Why an event did not change state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredDragEvent {
    IdleWithoutActiveDrag,
    DragAlreadyInProgress,
}

/// Result of handling one drag event
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Started,
    Hovering,
    Dropped(Intent),
    Cancelled(CancelReason),
    Ignored(IgnoredDragEvent),
}

/// State machine translating drag events into builder intents
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Current hovered target, if dragging
    pub fn over(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Dragging { over, .. } => over.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Handle one event; `document` is read to resolve drop positions
    pub fn handle(&mut self, event: DragEvent, document: &Document) -> DragOutcome {
        if !self.is_dragging() {
            return match event {
                DragEvent::Start { item } => {
                    debug!(source = ?item.source(), active_id = item.active_id(), "Drag started");
                    self.state = DragState::Dragging { item, over: None };
                    DragOutcome::Started
                }
                _ => DragOutcome::Ignored(IgnoredDragEvent::IdleWithoutActiveDrag),
            };
        }

        match event {
            DragEvent::Start { .. } => DragOutcome::Ignored(IgnoredDragEvent::DragAlreadyInProgress),
            DragEvent::Over { target } => {
                if let DragState::Dragging { over, .. } = &mut self.state {
                    *over = target;
                }
                DragOutcome::Hovering
            }
            DragEvent::Cancel => {
                self.state = DragState::Idle;
                debug!("Drag cancelled");
                DragOutcome::Cancelled(CancelReason::Aborted)
            }
            DragEvent::End { target } => {
                let DragState::Dragging { item, .. } = std::mem::take(&mut self.state) else {
                    return DragOutcome::Ignored(IgnoredDragEvent::IdleWithoutActiveDrag);
                };

                match resolve_drop(&item, target, document) {
                    Ok(intent) => {
                        debug!(intent = intent.name(), "Drag dropped");
                        DragOutcome::Dropped(intent)
                    }
                    Err(reason) => {
                        debug!(?reason, "Drop produced no mutation");
                        DragOutcome::Cancelled(reason)
                    }
                }
            }
        }
    }
}

/// Work out the intent for dropping `item` on `target`
pub fn resolve_drop(
    item: &DragItem,
    target: Option<DropTarget>,
    document: &Document,
) -> Result<Intent, CancelReason> {
    let target = target.ok_or(CancelReason::NoTarget)?;

    match item {
        DragItem::Template { block_type, .. } => {
            let at_index = insertion_index(&target, document)?;
            Ok(Intent::AddBlock {
                block_type: *block_type,
                at_index: Some(at_index),
            })
        }
        DragItem::Block { id } => match target {
            DropTarget::Block { id: over_id, .. } => {
                if *id == over_id {
                    return Err(CancelReason::SameBlock);
                }
                if !document.contains(&over_id) {
                    return Err(CancelReason::UnknownTarget);
                }
                Ok(Intent::MoveBlock {
                    block_id: id.clone(),
                    over_id,
                })
            }
            DropTarget::Index(slot) => Ok(Intent::MoveBlockTo {
                block_id: id.clone(),
                index: slot_to_position(id, slot, document),
            }),
            DropTarget::Canvas => Ok(Intent::MoveBlockTo {
                block_id: id.clone(),
                index: slot_to_position(id, document.len(), document),
            }),
        },
    }
}

/// Final position of an existing block moved into insertion slot `slot`
fn slot_to_position(block_id: &str, slot: usize, document: &Document) -> usize {
    let slot = slot.min(document.len());
    match document.index_of(block_id) {
        // Taking the block out first shifts every later slot up by one
        Some(from) if from < slot => slot - 1,
        _ => slot,
    }
}

/// Insertion slot for a new block dropped on `target`
pub fn insertion_index(target: &DropTarget, document: &Document) -> Result<usize, CancelReason> {
    match target {
        DropTarget::Block { id, placement } => {
            let index = find_index(&document.blocks, id).ok_or(CancelReason::UnknownTarget)?;
            Ok(match placement {
                Placement::Before => index,
                Placement::After => index + 1,
            })
        }
        DropTarget::Index(index) => Ok((*index).min(document.len())),
        DropTarget::Canvas => Ok(document.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;

    fn doc() -> Document {
        Document::with_blocks(
            "campaign-1",
            vec![Block::new("a", BlockType::Hero), Block::new("b", BlockType::Cta)],
        )
    }

    fn template(block_type: BlockType) -> DragItem {
        DragItem::Template {
            template_id: format!("palette-{block_type}"),
            block_type,
        }
    }

    fn block(id: &str) -> DragItem {
        DragItem::Block { id: id.to_string() }
    }

    #[test]
    fn test_midpoint_rule() {
        let zone = ZoneRect::new(100.0, 50.0);
        assert_eq!(Placement::from_midpoint(110.0, zone), Placement::Before);
        assert_eq!(Placement::from_midpoint(125.0, zone), Placement::After);
        assert_eq!(Placement::from_midpoint(140.0, zone), Placement::After);
    }

    #[test]
    fn test_palette_drop_resolves_insertion_index() {
        let doc = doc();
        let item = template(BlockType::Faq);

        let cases = [
            (DropTarget::block("a", Placement::Before), 0),
            (DropTarget::block("a", Placement::After), 1),
            (DropTarget::block("b", Placement::After), 2),
            (DropTarget::Index(1), 1),
            (DropTarget::Index(42), 2),
            (DropTarget::Canvas, 2),
        ];

        for (target, expected) in cases {
            let intent = resolve_drop(&item, Some(target.clone()), &doc).unwrap();
            assert_eq!(
                intent,
                Intent::AddBlock {
                    block_type: BlockType::Faq,
                    at_index: Some(expected)
                },
                "target {target:?}"
            );
        }
    }

    #[test]
    fn test_canvas_drop_moves_block() {
        let doc = doc();
        let mut controller = DragController::new();

        assert_eq!(controller.handle(DragEvent::Start { item: block("b") }, &doc), DragOutcome::Started);
        let outcome = controller.handle(
            DragEvent::End {
                target: Some(DropTarget::block("a", Placement::Before)),
            },
            &doc,
        );

        assert_eq!(
            outcome,
            DragOutcome::Dropped(Intent::MoveBlock {
                block_id: "b".to_string(),
                over_id: "a".to_string()
            })
        );
        assert_eq!(controller.state(), &DragState::Idle);
    }

    #[test]
    fn test_block_dropped_on_slot_lands_in_that_slot() {
        let doc = Document::with_blocks(
            "campaign-1",
            ["a", "b", "c"].map(|id| Block::new(id, BlockType::Hero)),
        );

        // Slot 2 sits between b and c; a lands there as position 1
        let cases = [
            ("a", DropTarget::Index(2), 1),
            ("a", DropTarget::Index(3), 2),
            ("a", DropTarget::Canvas, 2),
            ("c", DropTarget::Index(0), 0),
            ("c", DropTarget::Index(1), 1),
            ("b", DropTarget::Index(42), 2),
        ];

        for (id, target, expected) in cases {
            let intent = resolve_drop(&block(id), Some(target.clone()), &doc).unwrap();
            assert_eq!(
                intent,
                Intent::MoveBlockTo {
                    block_id: id.to_string(),
                    index: expected
                },
                "{id} on {target:?}"
            );
        }
    }

    #[test]
    fn test_block_drop_ignores_target_half() {
        let doc = Document::with_blocks(
            "campaign-1",
            ["a", "b", "c"].map(|id| Block::new(id, BlockType::Hero)),
        );

        for placement in [Placement::Before, Placement::After] {
            let intent = resolve_drop(&block("b"), Some(DropTarget::block("a", placement)), &doc);
            assert_eq!(
                intent,
                Ok(Intent::MoveBlock {
                    block_id: "b".to_string(),
                    over_id: "a".to_string()
                })
            );
        }
    }

    #[test]
    fn test_drop_on_self_is_cancelled() {
        let doc = doc();
        let mut controller = DragController::new();
        controller.handle(DragEvent::Start { item: block("a") }, &doc);

        let outcome = controller.handle(
            DragEvent::End {
                target: Some(DropTarget::block("a", Placement::After)),
            },
            &doc,
        );
        assert_eq!(outcome, DragOutcome::Cancelled(CancelReason::SameBlock));
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_drop_without_target_is_cancelled() {
        let doc = doc();
        let mut controller = DragController::new();
        controller.handle(DragEvent::Start { item: template(BlockType::Hero) }, &doc);

        let outcome = controller.handle(DragEvent::End { target: None }, &doc);
        assert_eq!(outcome, DragOutcome::Cancelled(CancelReason::NoTarget));
    }

    #[test]
    fn test_over_tracks_target_without_committing() {
        let doc = doc();
        let mut controller = DragController::new();
        controller.handle(DragEvent::Start { item: block("a") }, &doc);

        let target = DropTarget::block("b", Placement::After);
        assert_eq!(
            controller.handle(DragEvent::Over { target: Some(target.clone()) }, &doc),
            DragOutcome::Hovering
        );
        assert_eq!(controller.over(), Some(&target));

        assert_eq!(
            controller.handle(DragEvent::Cancel, &doc),
            DragOutcome::Cancelled(CancelReason::Aborted)
        );
        assert_eq!(controller.over(), None);
    }

    #[test]
    fn test_second_start_is_ignored() {
        let doc = doc();
        let mut controller = DragController::new();
        controller.handle(DragEvent::Start { item: block("a") }, &doc);

        let outcome = controller.handle(DragEvent::Start { item: block("b") }, &doc);
        assert_eq!(outcome, DragOutcome::Ignored(IgnoredDragEvent::DragAlreadyInProgress));
        assert_eq!(
            controller.state(),
            &DragState::Dragging {
                item: block("a"),
                over: None
            }
        );
    }

    #[test]
    fn test_events_while_idle_are_ignored() {
        let doc = doc();
        let mut controller = DragController::new();

        let outcome = controller.handle(DragEvent::End { target: Some(DropTarget::Canvas) }, &doc);
        assert_eq!(outcome, DragOutcome::Ignored(IgnoredDragEvent::IdleWithoutActiveDrag));
    }
}
