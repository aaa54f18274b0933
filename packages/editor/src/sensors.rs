//! # Drag Sensors
//!
//! Sensors turn raw host input into the abstract drag protocol consumed by
//! [`DragController`](crate::DragController).
//!
//! - [`PointerSensor`]: a press only becomes a drag once the pointer has
//!   travelled `activation_distance`; releasing earlier is a click.
//! - [`KeyboardSensor`]: grab / move / drop / cancel through discrete key
//!   commands, for users who cannot drag with a pointer.

use crate::document::Document;
use crate::drag::{DragEvent, DragItem, DropTarget, Placement};
use campaign_common::DragSettings;

/// Output of a sensor step
#[derive(Debug, Clone, PartialEq)]
pub enum SensorSignal {
    Drag(DragEvent),

    /// Press released before activation; hosts treat it as selection
    Click(DragItem),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Pointer activation policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    pub activation_distance: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self::from(&DragSettings::default())
    }
}

impl From<&DragSettings> for DragConfig {
    fn from(settings: &DragSettings) -> Self {
        Self {
            activation_distance: settings.activation_distance.max(0.0),
        }
    }
}

#[derive(Debug, Clone)]
struct Press {
    item: DragItem,
    origin: Point,
    active: bool,
}

/// Mouse/touch sensor with a distance activation constraint
#[derive(Debug, Clone, Default)]
pub struct PointerSensor {
    config: DragConfig,
    press: Option<Press>,
}

impl PointerSensor {
    pub fn new(config: DragConfig) -> Self {
        Self { config, press: None }
    }

    /// Whether a press has turned into a drag
    pub fn is_active(&self) -> bool {
        self.press.as_ref().is_some_and(|p| p.active)
    }

    /// Pointer pressed on a palette item or block; ignored while a press is
    /// already being tracked
    pub fn pointer_down(&mut self, item: DragItem, position: Point) {
        if self.press.is_some() {
            return;
        }
        self.press = Some(Press {
            item,
            origin: position,
            active: false,
        });
    }

    /// Pointer moved; emits `Start` (followed by `Over`) once the activation
    /// distance is reached, then `Over` on every further move
    pub fn pointer_move(&mut self, position: Point, target: Option<DropTarget>) -> Vec<SensorSignal> {
        let Some(press) = &mut self.press else {
            return Vec::new();
        };

        if press.active {
            return vec![SensorSignal::Drag(DragEvent::Over { target })];
        }

        if press.origin.distance_to(position) < self.config.activation_distance {
            return Vec::new();
        }

        press.active = true;
        vec![
            SensorSignal::Drag(DragEvent::Start {
                item: press.item.clone(),
            }),
            SensorSignal::Drag(DragEvent::Over { target }),
        ]
    }

    /// Pointer released: ends the drag, or reports a click if the press never
    /// activated
    pub fn pointer_up(&mut self, target: Option<DropTarget>) -> Option<SensorSignal> {
        let press = self.press.take()?;

        if press.active {
            Some(SensorSignal::Drag(DragEvent::End { target }))
        } else {
            Some(SensorSignal::Click(press.item))
        }
    }

    /// Escape pressed or pointer lost
    pub fn cancel(&mut self) -> Option<SensorSignal> {
        let press = self.press.take()?;
        press.active.then_some(SensorSignal::Drag(DragEvent::Cancel))
    }
}

/// Discrete commands the host maps keys onto (Space/Enter, arrows, Escape)
#[derive(Debug, Clone, PartialEq)]
pub enum KeyCommand {
    /// Pick up the focused palette item or block
    Grab(DragItem),
    MoveUp,
    MoveDown,
    Drop,
    Cancel,
}

#[derive(Debug, Clone)]
struct Grabbed {
    item: DragItem,
    cursor: usize,
}

/// Keyboard sensor moving a cursor over drop positions
#[derive(Debug, Clone, Default)]
pub struct KeyboardSensor {
    grabbed: Option<Grabbed>,
}

impl KeyboardSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.grabbed.is_some()
    }

    /// Current cursor position, if something is grabbed
    pub fn cursor(&self) -> Option<usize> {
        self.grabbed.as_ref().map(|g| g.cursor)
    }

    pub fn press(&mut self, command: KeyCommand, document: &Document) -> Option<SensorSignal> {
        match command {
            KeyCommand::Grab(item) => self.grab(item, document),
            KeyCommand::MoveUp => self.step(document, -1),
            KeyCommand::MoveDown => self.step(document, 1),
            KeyCommand::Drop => {
                let grabbed = self.grabbed.take()?;
                let target = target_at(&grabbed, document);
                Some(SensorSignal::Drag(DragEvent::End { target }))
            }
            KeyCommand::Cancel => {
                self.grabbed.take()?;
                Some(SensorSignal::Drag(DragEvent::Cancel))
            }
        }
    }

    fn grab(&mut self, item: DragItem, document: &Document) -> Option<SensorSignal> {
        if self.grabbed.is_some() {
            return None;
        }

        // Blocks start on themselves, templates at the end of the page
        let cursor = match &item {
            DragItem::Block { id } => document.index_of(id)?,
            DragItem::Template { .. } => document.len(),
        };

        self.grabbed = Some(Grabbed {
            item: item.clone(),
            cursor,
        });
        Some(SensorSignal::Drag(DragEvent::Start { item }))
    }

    fn step(&mut self, document: &Document, delta: isize) -> Option<SensorSignal> {
        let grabbed = self.grabbed.as_mut()?;
        let max = max_cursor(&grabbed.item, document);

        grabbed.cursor = grabbed.cursor.saturating_add_signed(delta).min(max);
        let target = target_at(grabbed, document);
        Some(SensorSignal::Drag(DragEvent::Over { target }))
    }
}

fn max_cursor(item: &DragItem, document: &Document) -> usize {
    match item {
        // A block can only land on an existing position
        DragItem::Block { .. } => document.len().saturating_sub(1),
        // A template can be inserted anywhere, including after the last block
        DragItem::Template { .. } => document.len(),
    }
}

fn target_at(grabbed: &Grabbed, document: &Document) -> Option<DropTarget> {
    match grabbed.item {
        DragItem::Block { .. } => document
            .blocks
            .get(grabbed.cursor)
            .map(|block| DropTarget::block(block.id.clone(), Placement::Before)),
        DragItem::Template { .. } => Some(DropTarget::Index(grabbed.cursor.min(document.len()))),
    }
}
