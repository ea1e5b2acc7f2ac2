//! Drag-to-reorder state machine.
//!
//! A press arms a session. Once the pointer travels past [`DRAG_THRESHOLD`]
//! vertically, the session becomes a drag: the pressed image follows the
//! pointer and the others reflow around the nearest magnetic slot. Releasing
//! reports either a click or the reorder to apply.

use crate::item::ItemId;
use crate::snap::{MagneticSlots, preview_order};

/// Vertical travel, in viewport pixels, before a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 2.0;

/// State of an armed or active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// The image being dragged.
    pub dragged: ItemId,
    /// Index of the dragged image when the session began.
    pub original_index: usize,
    /// Pointer y at press time.
    pub start_pointer_y: f64,
    /// Top of the dragged image at press time.
    pub start_item_y: f64,
    pub item_height: f64,
    /// Slot geometry captured at press time.
    pub slots: MagneticSlots,
    /// Slot the dragged image would drop into.
    pub candidate_index: usize,
    /// Current top of the dragged image.
    pub current_item_y: f64,
    /// Original indices in current display order.
    display_order: Vec<usize>,
}

impl DragSession {
    fn new(dragged: ItemId, original_index: usize, pointer_y: f64, slots: MagneticSlots) -> Option<Self> {
        let start_item_y = slots.top(original_index)?;
        let item_height = slots.height(original_index)?;
        let display_order = (0..slots.len()).collect();
        Some(Self {
            dragged,
            original_index,
            start_pointer_y: pointer_y,
            start_item_y,
            item_height,
            slots,
            candidate_index: original_index,
            current_item_y: start_item_y,
            display_order,
        })
    }

    /// Vertical travel since the press.
    pub fn delta(&self, pointer_y: f64) -> f64 {
        pointer_y - self.start_pointer_y
    }

    /// Centre of the dragged image at its current position.
    pub fn center_y(&self) -> f64 {
        self.current_item_y + self.item_height / 2.0
    }

    /// Original indices in display order.
    pub fn display_order(&self) -> &[usize] {
        &self.display_order
    }

    /// Displayed top of the image at `original_index`.
    pub fn display_top(&self, original_index: usize) -> Option<f64> {
        if original_index == self.original_index {
            return Some(self.current_item_y);
        }
        let position = self.display_order.iter().position(|&i| i == original_index)?;
        self.slots.top(position)
    }

    /// Displayed tops for every image, indexed by original position.
    pub fn display_tops(&self) -> Vec<f64> {
        (0..self.slots.len())
            .map(|i| self.display_top(i).unwrap_or_default())
            .collect()
    }

    /// Move the dragged image and reflow the others. Returns true if the
    /// candidate slot changed.
    fn follow(&mut self, pointer_y: f64) -> bool {
        self.current_item_y = self.start_item_y + self.delta(pointer_y);
        match self.slots.nearest(self.center_y()) {
            Some(candidate) if candidate != self.candidate_index => {
                self.candidate_index = candidate;
                self.display_order = preview_order(self.slots.len(), self.original_index, candidate);
                true
            }
            _ => false,
        }
    }
}

/// Phase of the drag engine.
#[derive(Debug, Clone, Default)]
pub enum DragPhase {
    /// No button held.
    #[default]
    Idle,
    /// Pressed on an image, still within the dead zone.
    Armed(DragSession),
    /// Past the dead zone; the image follows the pointer.
    Dragging(DragSession),
}

/// Result of a pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragUpdate {
    /// No session is active.
    Ignored,
    /// Still inside the dead zone.
    Armed,
    /// The press just became a drag.
    Started { reflowed: bool },
    /// The dragged image moved.
    Moved { reflowed: bool },
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// No session was active.
    None,
    /// Released inside the dead zone.
    Click(ItemId),
    /// Released after dragging; move `from` to `to` (may be equal).
    Reorder { id: ItemId, from: usize, to: usize },
}

/// Drag-to-reorder state machine.
#[derive(Debug, Clone, Default)]
pub struct DragEngine {
    phase: DragPhase,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// Whether a session is armed or dragging.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, DragPhase::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            DragPhase::Idle => None,
            DragPhase::Armed(s) | DragPhase::Dragging(s) => Some(s),
        }
    }

    /// Image following the pointer, once past the dead zone.
    pub fn dragged_id(&self) -> Option<ItemId> {
        match &self.phase {
            DragPhase::Dragging(s) => Some(s.dragged),
            _ => None,
        }
    }

    /// Arm a session for the image at `index`.
    ///
    /// Returns false if a session is already active or the index has no slot.
    pub fn begin_drag(&mut self, id: ItemId, index: usize, pointer_y: f64, slots: MagneticSlots) -> bool {
        if self.is_active() {
            log::debug!("Ignoring drag start for {id}: a session is already active");
            return false;
        }
        match DragSession::new(id, index, pointer_y, slots) {
            Some(session) => {
                self.phase = DragPhase::Armed(session);
                true
            }
            None => false,
        }
    }

    /// Feed a pointer move.
    pub fn update_drag(&mut self, pointer_y: f64) -> DragUpdate {
        match std::mem::take(&mut self.phase) {
            DragPhase::Idle => DragUpdate::Ignored,
            DragPhase::Armed(mut session) => {
                if session.delta(pointer_y).abs() > DRAG_THRESHOLD {
                    let reflowed = session.follow(pointer_y);
                    self.phase = DragPhase::Dragging(session);
                    DragUpdate::Started { reflowed }
                } else {
                    self.phase = DragPhase::Armed(session);
                    DragUpdate::Armed
                }
            }
            DragPhase::Dragging(mut session) => {
                let reflowed = session.follow(pointer_y);
                self.phase = DragPhase::Dragging(session);
                DragUpdate::Moved { reflowed }
            }
        }
    }

    /// Release the pointer, ending any session.
    pub fn end_drag(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.phase) {
            DragPhase::Idle => DragOutcome::None,
            DragPhase::Armed(session) => DragOutcome::Click(session.dragged),
            DragPhase::Dragging(session) => DragOutcome::Reorder {
                id: session.dragged,
                from: session.original_index,
                to: session.candidate_index,
            },
        }
    }

    /// Abandon any session without reporting an outcome.
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }
}
