use thiserror::Error;

use super::{CompletionResult, LayoutError, PieceId, TargetId};

/// Why a session call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    NotStarted,
    SessionTerminal,
    Paused,
    AlreadyPlaced,
    HintsDisabled,
    HintsExhausted,
    NothingToHint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    Accepted {
        target: TargetId,
        /// Set when this placement finished the puzzle.
        completion: Option<CompletionResult>,
    },
    /// The piece stays unplaced; moving it somewhere safe is up to the caller.
    Rejected {
        target: TargetId,
        wrong_attempts: u32,
    },
    NoTargetInRange,
    NoOp(NoOpReason),
}

impl PlacementOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PlacementOutcome::Accepted { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HintOutcome {
    Given {
        piece: PieceId,
        target: TargetId,
        remaining: u32,
    },
    NoOp(NoOpReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no piece with id {0} in this session")]
    InvalidPieceId(PieceId),
    #[error("session already started")]
    AlreadyStarted,
    #[error("layout rejected: {0}")]
    InvalidLayout(#[from] LayoutError),
}
