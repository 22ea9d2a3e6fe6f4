use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use super::{Piece, PieceId, Target, TargetId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout has no pieces")]
    NoPieces,
    #[error("layout has no targets")]
    NoTargets,
    #[error("duplicate piece id {0}")]
    DuplicatePiece(PieceId),
    #[error("duplicate target id {0}")]
    DuplicateTarget(TargetId),
    #[error("solution references unknown piece {0}")]
    UnknownPiece(PieceId),
    #[error("solution maps {piece} to unknown target {target}")]
    UnknownTarget { piece: PieceId, target: TargetId },
    #[error("target {0} is the solution for more than one piece")]
    SharedTarget(TargetId),
}

/// Authoritative piece → target pairing for matching puzzles. Pieces without an
/// entry are validated against the target's acceptance criteria instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionMap(BTreeMap<PieceId, TargetId>);

impl SolutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, piece: PieceId, target: TargetId) {
        self.0.insert(piece, target);
    }

    pub fn target_for(&self, piece: PieceId) -> Option<TargetId> {
        self.0.get(&piece).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, TargetId)> + '_ {
        self.0.iter().map(|(piece, target)| (*piece, *target))
    }
}

impl FromIterator<(PieceId, TargetId)> for SolutionMap {
    fn from_iter<I: IntoIterator<Item = (PieceId, TargetId)>>(iter: I) -> Self {
        SolutionMap(iter.into_iter().collect())
    }
}

/// Everything a layout generator hands to a session. Pieces keep creation order,
/// which is also hint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PuzzleLayout {
    pub pieces: Vec<Piece>,
    pub targets: Vec<Target>,
    pub solution: SolutionMap,
}

impl PuzzleLayout {
    pub fn new(pieces: Vec<Piece>, targets: Vec<Target>, solution: SolutionMap) -> Self {
        Self {
            pieces,
            targets,
            solution,
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.pieces.is_empty() {
            return Err(LayoutError::NoPieces);
        }
        if self.targets.is_empty() {
            return Err(LayoutError::NoTargets);
        }

        let mut piece_ids = HashSet::new();
        for piece in &self.pieces {
            if !piece_ids.insert(piece.id) {
                return Err(LayoutError::DuplicatePiece(piece.id));
            }
        }

        let mut target_ids = HashSet::new();
        for target in &self.targets {
            if !target_ids.insert(target.id) {
                return Err(LayoutError::DuplicateTarget(target.id));
            }
        }

        let mut claimed = HashSet::new();
        for (piece, target) in self.solution.iter() {
            if !piece_ids.contains(&piece) {
                return Err(LayoutError::UnknownPiece(piece));
            }
            if !target_ids.contains(&target) {
                return Err(LayoutError::UnknownTarget { piece, target });
            }
            if !claimed.insert(target) {
                return Err(LayoutError::SharedTarget(target));
            }
        }
        Ok(())
    }
}
