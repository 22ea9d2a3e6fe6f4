use super::{Achievement, DailyReward};

/// Notifications from the reward ledger, fired after its state is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardEvent {
    LevelComplete { level: u32 },
    StarsEarned(u32),
    CoinsEarned(u32),
    AchievementUnlocked(Achievement),
    DailyRewardClaimed { day: u32, reward: DailyReward },
}
