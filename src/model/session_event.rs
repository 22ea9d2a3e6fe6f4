use std::time::Duration;

use super::{CompletionResult, Difficulty, PieceId, PuzzleType, TargetId};

/// Notifications fired by a session after each state change, before the mutating
/// call returns. Audio, UI, persistence and reward ledgers subscribe to these.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started {
        puzzle_type: PuzzleType,
        difficulty: Difficulty,
        piece_count: u32,
    },
    CorrectPlacement {
        piece: PieceId,
        target: TargetId,
        correct: u32,
    },
    IncorrectPlacement {
        piece: PieceId,
        target: TargetId,
        wrong_attempts: u32,
    },
    ProgressUpdate {
        correct: u32,
        piece_count: u32,
    },
    TimeUpdate {
        remaining: Option<Duration>,
        elapsed: Duration,
    },
    HintUsed {
        piece: PieceId,
        target: TargetId,
        hints_used: u32,
    },
    PuzzleComplete(CompletionResult),
    TimedOut,
    Paused,
    Resumed,
}
