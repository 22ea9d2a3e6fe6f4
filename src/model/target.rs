use serde::{Deserialize, Serialize};

use super::{Attributes, Piece, Position};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl std::fmt::Debug for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Acceptance {
    Any,
    Attributes(Attributes),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub acceptance: Acceptance,
    pub position: Position,
}

impl Target {
    pub fn new(id: TargetId, acceptance: Acceptance, position: Position) -> Self {
        Self {
            id,
            acceptance,
            position,
        }
    }

    pub fn accepting(id: TargetId, required: Attributes, position: Position) -> Self {
        Self::new(id, Acceptance::Attributes(required), position)
    }

    pub fn can_accept(&self, piece: &Piece) -> bool {
        match &self.acceptance {
            Acceptance::Any => true,
            Acceptance::Attributes(required) => piece.attributes.satisfies(required),
        }
    }

    pub fn distance_to(&self, position: &Position) -> f32 {
        self.position.distance(position)
    }
}
