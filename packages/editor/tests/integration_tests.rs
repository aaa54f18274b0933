//! Integration tests for editor crate

use campaign_editor::{
    Block, BlockType, DragEvent, DragItem, DragOutcome, DropTarget, EditorSession, Intent,
    JsonFilePersist, KeyCommand, KeyboardSensor, Placement, Point, PointerSensor, SessionConfig,
    ZoneRect,
};
use campaign_editor::{Document, DragConfig};

fn doc(ids: &[&str]) -> Document {
    Document::with_blocks(
        "campaign-1",
        ids.iter().map(|id| Block::new(*id, BlockType::Hero)),
    )
}

fn ids(session: &EditorSession) -> Vec<String> {
    session
        .document()
        .block_ids()
        .into_iter()
        .map(String::from)
        .collect()
}

fn palette(block_type: BlockType) -> DragItem {
    DragItem::Template {
        template_id: format!("palette-{block_type}"),
        block_type,
    }
}

#[test]
fn test_move_then_undo_scenario() {
    let mut session = EditorSession::new(doc(&["A", "B", "C"]), SessionConfig::default()).unwrap();

    session.dispatch(Intent::MoveBlock {
        block_id: "C".to_string(),
        over_id: "A".to_string(),
    });
    assert_eq!(ids(&session), ["C", "A", "B"]);

    assert!(session.undo());
    assert_eq!(ids(&session), ["A", "B", "C"]);

    assert!(session.redo());
    assert_eq!(ids(&session), ["C", "A", "B"]);
}

#[test]
fn test_add_hero_to_empty_document() {
    let mut session = EditorSession::new(Document::new("campaign-1"), SessionConfig::default()).unwrap();

    session.dispatch(Intent::AddBlock {
        block_type: BlockType::Hero,
        at_index: None,
    });

    let document = session.document();
    assert_eq!(document.blocks.len(), 1);
    assert_eq!(document.blocks[0].block_type, BlockType::Hero);
    assert!(document.blocks[0].props.contains_key("title"));
}

#[test]
fn test_palette_drop_at_index_one() {
    let mut session = EditorSession::new(doc(&["a", "b"]), SessionConfig::default()).unwrap();

    session.handle_drag(DragEvent::Start {
        item: palette(BlockType::Features1),
    });
    session.handle_drag(DragEvent::Over {
        target: Some(DropTarget::Index(1)),
    });
    let outcome = session.handle_drag(DragEvent::End {
        target: Some(DropTarget::Index(1)),
    });

    assert!(matches!(outcome, DragOutcome::Dropped(Intent::AddBlock { .. })));
    let document = session.document();
    assert_eq!(document.blocks.len(), 3);
    assert_eq!(document.blocks[1].block_type, BlockType::Features1);
    assert_eq!(document.blocks[0].id, "a");
    assert_eq!(document.blocks[2].id, "b");
}

#[test]
fn test_pointer_drop_on_lower_half_inserts_after() {
    let mut session = EditorSession::new(doc(&["a", "b"]), SessionConfig::default()).unwrap();
    let mut sensor = PointerSensor::new(DragConfig {
        activation_distance: 4.0,
    });

    // Block "a" occupies y = 0..100 on the canvas
    let zone = ZoneRect::new(0.0, 100.0);
    let target = |y: f64| Some(DropTarget::block("a", Placement::from_midpoint(y, zone)));

    sensor.pointer_down(palette(BlockType::Cta), Point::new(-200.0, 10.0));
    for signal in sensor.pointer_move(Point::new(-150.0, 30.0), target(30.0)) {
        session.handle_sensor(signal);
    }
    assert!(session.drag().is_dragging());

    let signal = sensor.pointer_up(target(75.0)).unwrap();
    session.handle_sensor(signal);

    let document = session.document();
    assert_eq!(document.len(), 3);
    assert_eq!(document.blocks[1].block_type, BlockType::Cta);
    assert!(!session.drag().is_dragging());
}

#[test]
fn test_pointer_click_selects_instead_of_dragging() {
    let mut session = EditorSession::new(doc(&["a", "b"]), SessionConfig::default()).unwrap();
    let mut sensor = PointerSensor::new(DragConfig::default());

    sensor.pointer_down(DragItem::Block { id: "b".to_string() }, Point::new(10.0, 10.0));
    assert!(sensor.pointer_move(Point::new(11.0, 10.0), None).is_empty());
    let signal = sensor.pointer_up(None).unwrap();
    session.handle_sensor(signal);

    assert_eq!(session.selected_block_id(), Some("b"));
    assert_eq!(ids(&session), ["a", "b"]);
    assert!(!session.history().can_undo());
}

#[test]
fn test_keyboard_reorder() {
    let mut session = EditorSession::new(doc(&["a", "b", "c"]), SessionConfig::default()).unwrap();
    let mut sensor = KeyboardSensor::new();

    let commands = [
        KeyCommand::Grab(DragItem::Block { id: "c".to_string() }),
        KeyCommand::MoveUp,
        KeyCommand::MoveUp,
        KeyCommand::Drop,
    ];
    for command in commands {
        let signal = sensor.press(command, session.document()).unwrap();
        session.handle_sensor(signal);
    }

    assert_eq!(ids(&session), ["c", "a", "b"]);
}

#[test]
fn test_keyboard_cancel_leaves_document_untouched() {
    let mut session = EditorSession::new(doc(&["a", "b", "c"]), SessionConfig::default()).unwrap();
    let before = session.document().clone();
    let mut sensor = KeyboardSensor::new();

    for command in [
        KeyCommand::Grab(DragItem::Block { id: "a".to_string() }),
        KeyCommand::MoveDown,
        KeyCommand::Cancel,
    ] {
        let signal = sensor.press(command, session.document()).unwrap();
        session.handle_sensor(signal);
    }

    assert_eq!(session.document(), &before);
    assert!(!session.history().can_undo());
}

#[test]
fn test_load_resets_history() {
    let mut session = EditorSession::new(doc(&["a"]), SessionConfig::default()).unwrap();
    session.dispatch(Intent::DeleteBlock {
        block_id: "a".to_string(),
    });
    assert!(session.history().can_undo());

    session.load(doc(&["x", "y"])).unwrap();
    assert!(!session.history().can_undo());
    assert!(!session.undo());
    assert_eq!(ids(&session), ["x", "y"]);
}

#[tokio::test]
async fn test_save_to_json_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("campaign.json");

    let mut session = EditorSession::new(doc(&["a"]), SessionConfig::default())?;
    session.dispatch(Intent::AddBlock {
        block_type: BlockType::Pricing,
        at_index: Some(0),
    });

    session.save(&JsonFilePersist::new(&path)).await?;
    assert!(!session.is_dirty());

    let reloaded = Document::from_json(&std::fs::read_to_string(&path)?)?;
    assert_eq!(&reloaded, session.document().as_ref());
    Ok(())
}

#[test]
fn test_block_dropped_on_slot_between_later_blocks() {
    let mut session = EditorSession::new(doc(&["a", "b", "c"]), SessionConfig::default()).unwrap();

    session.handle_drag(DragEvent::Start {
        item: DragItem::Block { id: "a".to_string() },
    });
    let outcome = session.handle_drag(DragEvent::End {
        target: Some(DropTarget::Index(2)),
    });

    assert!(matches!(outcome, DragOutcome::Dropped(Intent::MoveBlockTo { .. })));
    assert_eq!(ids(&session), ["b", "a", "c"]);
}
