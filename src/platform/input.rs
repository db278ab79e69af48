//! Logical input events
//!
//! Touch/pointer translation happens outside the core; it hands over
//! pointer positions already normalized to the board (0..1 on each axis).

use glam::Vec2;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Finger/pointer pressed at a normalized board position
    PointerDown { normalized: Vec2 },
    /// Finger/pointer released
    PointerUp,
    /// Quit request (only honoured on the menu)
    Exit,
}

impl InputEvent {
    /// Build a press from a position in board pixels
    pub fn pointer_down_at(board_pos: Vec2, config: &Config) -> Self {
        let size = Vec2::new(config.board_width, config.board_height);
        InputEvent::PointerDown {
            normalized: board_pos / size,
        }
    }

    /// Position in board pixels, for presses
    pub fn board_position(&self, config: &Config) -> Option<Vec2> {
        match self {
            InputEvent::PointerDown { normalized } => Some(Vec2::new(
                normalized.x * config.board_width,
                normalized.y * config.board_height,
            )),
            _ => None,
        }
    }
}
