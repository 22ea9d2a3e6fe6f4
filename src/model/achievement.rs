use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::CompletionResult;

/// Runs at or under this time count toward `SpeedMaster`.
pub const SPEED_MASTER_TIME: Duration = Duration::from_secs(30);

/// One-time milestones. Each pays its coin reward once, when first earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstPuzzle,
    PerfectScore,
    SpeedMaster,
    PuzzleMaster,
    StarCollector10,
    StarCollector50,
    StarMaster,
    CoinCollector100,
    CoinCollector500,
}

/// Totals an achievement may be checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Milestones {
    pub levels_completed: u32,
    pub total_stars: u32,
    pub total_coins: u32,
}

impl Achievement {
    pub fn all() -> Vec<Achievement> {
        vec![
            Achievement::FirstPuzzle,
            Achievement::PerfectScore,
            Achievement::SpeedMaster,
            Achievement::PuzzleMaster,
            Achievement::StarCollector10,
            Achievement::StarCollector50,
            Achievement::StarMaster,
            Achievement::CoinCollector100,
            Achievement::CoinCollector500,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstPuzzle => "First Puzzle",
            Achievement::PerfectScore => "Perfect Score",
            Achievement::SpeedMaster => "Speed Master",
            Achievement::PuzzleMaster => "Puzzle Master",
            Achievement::StarCollector10 => "Star Collector",
            Achievement::StarCollector50 => "Star Hoarder",
            Achievement::StarMaster => "Star Master",
            Achievement::CoinCollector100 => "Coin Collector",
            Achievement::CoinCollector500 => "Treasure Chest",
        }
    }

    pub fn coin_reward(&self) -> u32 {
        match self {
            Achievement::FirstPuzzle => 10,
            Achievement::PerfectScore => 50,
            Achievement::SpeedMaster => 75,
            Achievement::PuzzleMaster => 200,
            Achievement::StarCollector10 => 20,
            Achievement::StarCollector50 => 50,
            Achievement::StarMaster => 100,
            Achievement::CoinCollector100 => 10,
            Achievement::CoinCollector500 => 25,
        }
    }

    /// Whether this is earned given the running totals and, for per-run
    /// achievements, the run that just finished.
    pub fn is_earned(&self, milestones: &Milestones, run: Option<&CompletionResult>) -> bool {
        match self {
            Achievement::FirstPuzzle => milestones.levels_completed >= 1,
            Achievement::PerfectScore => run.is_some_and(|run| run.wrong_attempts == 0),
            Achievement::SpeedMaster => {
                run.is_some_and(|run| run.completion_time <= SPEED_MASTER_TIME)
            }
            Achievement::PuzzleMaster => milestones.levels_completed >= 50,
            Achievement::StarCollector10 => milestones.total_stars >= 10,
            Achievement::StarCollector50 => milestones.total_stars >= 50,
            Achievement::StarMaster => milestones.total_stars >= 100,
            Achievement::CoinCollector100 => milestones.total_coins >= 100,
            Achievement::CoinCollector500 => milestones.total_coins >= 500,
        }
    }
}

/// What one day of the seven-day login cycle grants. Items are handed to the
/// host to resolve; only coins are credited here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DailyReward {
    Coins(u32),
    Sticker,
    Costume,
}

pub const DAILY_REWARDS: [DailyReward; 7] = [
    DailyReward::Coins(20),
    DailyReward::Coins(30),
    DailyReward::Sticker,
    DailyReward::Coins(40),
    DailyReward::Coins(50),
    DailyReward::Costume,
    DailyReward::Coins(100),
];
