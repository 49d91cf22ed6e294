//! Pointer event vocabulary for gesture dispatch.

use crate::stage::NodeId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Identifier of a pointing device during one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u32);

/// Pointer event type for unified mouse/touch/pen handling.
///
/// `Down` carries the node the event was dispatched to; moves and
/// releases are funneled to an owner purely by pointer id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        pointer: PointerId,
        position: Point,
        target: NodeId,
    },
    Move {
        pointer: PointerId,
        position: Point,
    },
    Up {
        pointer: PointerId,
        position: Point,
    },
}

impl PointerEvent {
    /// The pointer this event belongs to.
    pub fn pointer(&self) -> PointerId {
        match self {
            Self::Down { pointer, .. } | Self::Move { pointer, .. } | Self::Up { pointer, .. } => {
                *pointer
            }
        }
    }

    /// Document coordinates of the event.
    pub fn position(&self) -> Point {
        match self {
            Self::Down { position, .. } | Self::Move { position, .. } | Self::Up { position, .. } => {
                *position
            }
        }
    }
}
