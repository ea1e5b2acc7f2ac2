//! Pointer events delivered by the host shell.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => *position,
        }
    }

    /// Primary-button press at a position.
    pub fn press(position: Point) -> Self {
        PointerEvent::Down {
            position,
            button: MouseButton::Left,
        }
    }

    /// Primary-button release at a position.
    pub fn release(position: Point) -> Self {
        PointerEvent::Up {
            position,
            button: MouseButton::Left,
        }
    }

    pub fn motion(position: Point) -> Self {
        PointerEvent::Move { position }
    }
}
