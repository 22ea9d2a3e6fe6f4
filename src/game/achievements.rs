use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use std::collections::BTreeSet;

use super::kv_store::{load_or_default, store_value, KeyValueStore, StoreError};
use super::progression::Progression;
use crate::events::{EventEmitter, EventHandler};
use crate::model::{
    Achievement, CompletionResult, DailyReward, Milestones, RewardEvent, SessionEvent,
    DAILY_REWARDS,
};

const COMPLETED_ACHIEVEMENTS: &str = "CompletedAchievements";
const LAST_DAILY_CLAIM: &str = "LastDailyRewardClaim";
const DAILY_STREAK: &str = "DailyRewardStreak";

fn daily_cooldown() -> TimeDelta {
    TimeDelta::hours(20)
}

fn streak_grace() -> TimeDelta {
    TimeDelta::days(2)
}

pub trait WallClock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reward ledger on top of [`Progression`]: one-time achievements and the
/// seven-day login reward. Coins it pays go through the progression so there
/// is a single balance.
pub struct Achievements<S: KeyValueStore> {
    progression: Progression<S>,
    emitter: EventEmitter<RewardEvent>,
    clock: Box<dyn WallClock>,
    unlocked: BTreeSet<Achievement>,
    last_daily_claim: Option<DateTime<Utc>>,
    daily_streak: u32,
}

impl<S: KeyValueStore> Achievements<S> {
    pub fn new(progression: Progression<S>, emitter: EventEmitter<RewardEvent>) -> Self {
        Self::with_clock(progression, emitter, Box::new(SystemClock))
    }

    pub fn with_clock(
        progression: Progression<S>,
        emitter: EventEmitter<RewardEvent>,
        clock: Box<dyn WallClock>,
    ) -> Self {
        let mut achievements = Self {
            progression,
            emitter,
            clock,
            unlocked: BTreeSet::new(),
            last_daily_claim: None,
            daily_streak: 0,
        };
        achievements.load();
        achievements
    }

    fn load(&mut self) {
        let store = self.progression.store();
        self.unlocked = load_or_default(store, COMPLETED_ACHIEVEMENTS);
        let last_claim: Option<i64> = load_or_default(store, LAST_DAILY_CLAIM);
        self.last_daily_claim = last_claim.and_then(|secs| DateTime::from_timestamp(secs, 0));
        self.daily_streak = load_or_default(store, DAILY_STREAK);
        debug!(
            target: "achievements",
            "Loaded {} achievements; daily streak: {}",
            self.unlocked.len(),
            self.daily_streak
        );
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let last_claim = self.last_daily_claim.map(|claim| claim.timestamp());
        let store = self.progression.store_mut();
        store_value(store, COMPLETED_ACHIEVEMENTS, &self.unlocked)?;
        store_value(store, LAST_DAILY_CLAIM, &last_claim)?;
        store_value(store, DAILY_STREAK, &self.daily_streak)?;
        store.flush()
    }

    /// Credits a finished puzzle, then pays out whatever it unlocked. Returns
    /// the newly unlocked achievements in unlock order.
    pub fn record_completion(&mut self, result: &CompletionResult) -> Result<Vec<Achievement>, StoreError> {
        let record = self.progression.complete_level(result)?;
        self.emitter.emit(&RewardEvent::LevelComplete {
            level: record.level,
        });
        self.emitter
            .emit(&RewardEvent::StarsEarned(result.stars_earned as u32));
        self.emitter
            .emit(&RewardEvent::CoinsEarned(result.coins_earned));
        self.unlock_earned(Some(result))
    }

    fn milestones(&self) -> Milestones {
        Milestones {
            levels_completed: self.progression.levels_completed(),
            total_stars: self.progression.total_stars(),
            total_coins: self.progression.total_coins(),
        }
    }

    // Rewards raise the coin total, so each unlock can earn another.
    fn unlock_earned(&mut self, run: Option<&CompletionResult>) -> Result<Vec<Achievement>, StoreError> {
        let mut newly_unlocked = Vec::new();
        loop {
            let milestones = self.milestones();
            let next = Achievement::all().into_iter().find(|achievement| {
                !self.unlocked.contains(achievement) && achievement.is_earned(&milestones, run)
            });
            let Some(achievement) = next else {
                break;
            };

            self.unlocked.insert(achievement);
            self.save()?;
            self.progression.add_coins(achievement.coin_reward())?;
            info!(
                target: "achievements",
                "Unlocked {}; +{} coins",
                achievement.title(),
                achievement.coin_reward()
            );
            self.emitter
                .emit(&RewardEvent::AchievementUnlocked(achievement));
            self.emitter
                .emit(&RewardEvent::CoinsEarned(achievement.coin_reward()));
            newly_unlocked.push(achievement);
        }
        Ok(newly_unlocked)
    }

    pub fn can_claim_daily(&self) -> bool {
        match self.last_daily_claim {
            Some(last) => self.clock.now() - last >= daily_cooldown(),
            None => true,
        }
    }

    /// Grants today's login reward. `None` while the cooldown is running.
    /// Missing more than two days starts the cycle over at day one.
    pub fn claim_daily_reward(&mut self) -> Result<Option<DailyReward>, StoreError> {
        if !self.can_claim_daily() {
            debug!(target: "achievements", "Daily reward already claimed");
            return Ok(None);
        }
        let now = self.clock.now();
        if let Some(last) = self.last_daily_claim {
            if now - last > streak_grace() {
                info!(target: "achievements", "Daily streak of {} lapsed", self.daily_streak);
                self.daily_streak = 0;
            }
        }
        self.daily_streak = self.daily_streak % DAILY_REWARDS.len() as u32 + 1;
        self.last_daily_claim = Some(now);
        let reward = DAILY_REWARDS[(self.daily_streak - 1) as usize];
        self.save()?;

        info!(target: "achievements", "Day {} reward: {:?}", self.daily_streak, reward);
        self.emitter.emit(&RewardEvent::DailyRewardClaimed {
            day: self.daily_streak,
            reward,
        });
        if let DailyReward::Coins(amount) = reward {
            self.progression.add_coins(amount)?;
            self.emitter.emit(&RewardEvent::CoinsEarned(amount));
        }
        self.unlock_earned(None)?;
        Ok(Some(reward))
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.unlocked.clear();
        self.last_daily_claim = None;
        self.daily_streak = 0;
        let store = self.progression.store_mut();
        for key in [COMPLETED_ACHIEVEMENTS, LAST_DAILY_CLAIM, DAILY_STREAK] {
            store.remove(key);
        }
        self.progression.reset()
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.unlocked.iter().copied()
    }

    /// Day of the cycle last claimed, 1 through 7; 0 before the first claim.
    pub fn daily_streak(&self) -> u32 {
        self.daily_streak
    }

    pub fn progression(&self) -> &Progression<S> {
        &self.progression
    }

    pub fn progression_mut(&mut self) -> &mut Progression<S> {
        &mut self.progression
    }
}

impl<S: KeyValueStore> EventHandler<SessionEvent> for Achievements<S> {
    fn handle_event(&mut self, event: &SessionEvent) {
        if let SessionEvent::PuzzleComplete(result) = event {
            if let Err(err) = self.record_completion(result) {
                warn!(target: "achievements", "Failed to save rewards: {}", err);
            }
        }
    }
}
