use crate::model::{CompletionResult, Difficulty, PuzzleType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// One finished puzzle as kept by the progression store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelRecord {
    pub level: u32,
    pub puzzle_type: PuzzleType,
    pub difficulty: Difficulty,
    pub stars: u8,
    pub coins: u32,
    pub accuracy: f64,
    pub completion_time: Duration,
    pub hints_used: u32,
    pub wrong_attempts: u32,
    pub timestamp: i64,
    pub playthrough_id: Uuid,
}

impl LevelRecord {
    pub fn from_completion(level: u32, result: &CompletionResult, timestamp: i64) -> Self {
        Self {
            level,
            puzzle_type: result.puzzle_type,
            difficulty: result.difficulty,
            stars: result.stars_earned,
            coins: result.coins_earned,
            accuracy: result.accuracy,
            completion_time: result.completion_time,
            hints_used: result.hints_used,
            wrong_attempts: result.wrong_attempts,
            timestamp,
            playthrough_id: result.playthrough_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DifficultyTotals {
    pub difficulty: Difficulty,
    pub total_games_played: u32,
    pub total_time_played: Duration,
    pub total_hints_used: u32,
    pub total_stars: u32,
}
