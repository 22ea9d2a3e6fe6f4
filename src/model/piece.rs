use serde::{Deserialize, Serialize};

use super::{Attributes, Position};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl std::fmt::Debug for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub attributes: Attributes,
    placed: bool,
    position: Position,
}

impl Piece {
    pub fn new(id: PieceId, attributes: Attributes, position: Position) -> Self {
        Self {
            id,
            attributes,
            placed: false,
            position,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }

    pub fn can_be_dragged(&self) -> bool {
        !self.placed
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Moves an unplaced piece; returns false (and does nothing) once placed.
    pub fn move_to(&mut self, position: Position) -> bool {
        if self.placed {
            return false;
        }
        self.position = position;
        true
    }

    /// Locks the piece onto `anchor`. Placement is one-way.
    pub(crate) fn place_at(&mut self, anchor: Position) {
        self.position = anchor;
        self.placed = true;
    }
}
