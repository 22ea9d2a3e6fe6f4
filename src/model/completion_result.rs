use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::{Difficulty, PuzzleType};

/// Outcome of a finished puzzle. Produced once per session; fields are read-only
/// outside this module.
#[readonly::make]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub stars_earned: u8,
    pub coins_earned: u32,
    pub accuracy: f64,
    pub completion_time: Duration,
    pub hints_used: u32,
    pub wrong_attempts: u32,
    pub puzzle_type: PuzzleType,
    pub difficulty: Difficulty,
    pub playthrough_id: Uuid,
}

impl CompletionResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        stars_earned: u8,
        coins_earned: u32,
        accuracy: f64,
        completion_time: Duration,
        hints_used: u32,
        wrong_attempts: u32,
        puzzle_type: PuzzleType,
        difficulty: Difficulty,
        playthrough_id: Uuid,
    ) -> Self {
        Self {
            stars_earned,
            coins_earned,
            accuracy,
            completion_time,
            hints_used,
            wrong_attempts,
            puzzle_type,
            difficulty,
            playthrough_id,
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.wrong_attempts == 0 && self.hints_used == 0
    }
}
