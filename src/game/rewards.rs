//! Star and coin rules for a finished puzzle.
//!
//! One canonical formula is used. Stars start at one for finishing and gain one
//! each for high accuracy, finishing with more than half the time left, and
//! using no hints; the total is clamped to three, so bonuses may overlap.

use std::time::Duration;
use uuid::Uuid;

use crate::model::{CompletionResult, Difficulty, PuzzleType, SessionClock};

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 3;
pub const MIN_COINS: u32 = 5;

const ACCURACY_STAR_THRESHOLD: f64 = 0.9;
const TIME_STAR_FRACTION: f64 = 0.5;
const TIME_COIN_FRACTION: f64 = 0.7;
const COINS_PER_LEVEL: i64 = 10;
const ACCURACY_COIN_SCALE: f64 = 20.0;
const TIME_COIN_BONUS: i64 = 15;
const HINT_COIN_PENALTY: i64 = 5;

/// `correct / total`, or 1.0 before any attempt.
pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 1.0;
    }
    (correct as f64 / total as f64).clamp(0.0, 1.0)
}

/// Everything the formulas look at, captured when the last piece lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardInputs {
    pub difficulty: Difficulty,
    pub accuracy: f64,
    /// Share of the time limit left, `None` for untimed sessions.
    pub remaining_fraction: Option<f64>,
    pub hints_used: u32,
}

impl RewardInputs {
    pub fn new(difficulty: Difficulty, accuracy: f64, clock: &SessionClock, hints_used: u32) -> Self {
        Self {
            difficulty,
            accuracy,
            remaining_fraction: clock.remaining_fraction(),
            hints_used,
        }
    }

    fn time_left_above(&self, fraction: f64) -> bool {
        self.remaining_fraction
            .is_some_and(|remaining| remaining > fraction)
    }
}

pub fn stars_earned(inputs: &RewardInputs) -> u8 {
    let mut stars = MIN_STARS;
    if inputs.accuracy >= ACCURACY_STAR_THRESHOLD {
        stars += 1;
    }
    if inputs.time_left_above(TIME_STAR_FRACTION) {
        stars += 1;
    }
    if inputs.hints_used == 0 {
        stars += 1;
    }
    stars.clamp(MIN_STARS, MAX_STARS)
}

pub fn coins_earned(inputs: &RewardInputs) -> u32 {
    let base = COINS_PER_LEVEL * inputs.difficulty.level() as i64;
    // ties go to even, matching how the game engine rounded
    let accuracy_bonus = (inputs.accuracy * ACCURACY_COIN_SCALE).round_ties_even() as i64;
    let time_bonus = if inputs.time_left_above(TIME_COIN_FRACTION) {
        TIME_COIN_BONUS
    } else {
        0
    };
    let hints_penalty = HINT_COIN_PENALTY * inputs.hints_used as i64;

    let coins = base + accuracy_bonus + time_bonus - hints_penalty;
    coins.max(MIN_COINS as i64) as u32
}

#[allow(clippy::too_many_arguments)]
pub fn completion_result(
    puzzle_type: PuzzleType,
    difficulty: Difficulty,
    correct: u32,
    total: u32,
    hints_used: u32,
    clock: &SessionClock,
    playthrough_id: Uuid,
) -> CompletionResult {
    let accuracy = accuracy(correct, total);
    let inputs = RewardInputs::new(difficulty, accuracy, clock, hints_used);
    let completion_time: Duration = clock.elapsed();

    CompletionResult::new(
        stars_earned(&inputs),
        coins_earned(&inputs),
        accuracy,
        completion_time,
        hints_used,
        total.saturating_sub(correct),
        puzzle_type,
        difficulty,
        playthrough_id,
    )
}
