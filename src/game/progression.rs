use chrono::Utc;
use log::{debug, info, warn};
use std::collections::HashMap;

use super::kv_store::{load_or_default, store_value, KeyValueStore, StoreError};
use crate::events::EventHandler;
use crate::model::{
    CompletionResult, Difficulty, DifficultyTotals, LevelRecord, PuzzleType, SessionEvent,
};

pub const DEFAULT_TOTAL_LEVELS: u32 = 20;
pub const MAX_RECORDS_PER_PUZZLE: usize = 20;

const CURRENT_LEVEL: &str = "CurrentLevel";
const TOTAL_STARS: &str = "TotalStars";
const TOTAL_COINS: &str = "TotalCoins";
const LEVEL_RECORDS: &str = "LevelRecords";
const DIFFICULTY_TOTALS: &str = "DifficultyTotals";

/// Player progress across sessions: unlocked level, star and coin totals,
/// best runs and per-difficulty totals.
#[derive(Debug)]
pub struct Progression<S: KeyValueStore> {
    store: S,
    total_levels: u32,
    current_level: u32,
    total_stars: u32,
    total_coins: u32,
    records: Vec<LevelRecord>,
    totals: HashMap<Difficulty, DifficultyTotals>,
}

impl<S: KeyValueStore> Progression<S> {
    pub fn new(store: S) -> Self {
        Self::with_total_levels(store, DEFAULT_TOTAL_LEVELS)
    }

    pub fn with_total_levels(store: S, total_levels: u32) -> Self {
        let total_levels = total_levels.max(1);
        let mut progression = Self {
            store,
            total_levels,
            current_level: 1,
            total_stars: 0,
            total_coins: 0,
            records: Vec::new(),
            totals: HashMap::new(),
        };
        progression.load();
        progression
    }

    fn load(&mut self) {
        let level: u32 = load_or_default(&self.store, CURRENT_LEVEL);
        self.current_level = level.clamp(1, self.total_levels);
        self.total_stars = load_or_default(&self.store, TOTAL_STARS);
        self.total_coins = load_or_default(&self.store, TOTAL_COINS);
        self.records = load_or_default(&self.store, LEVEL_RECORDS);

        let totals: Vec<DifficultyTotals> = load_or_default(&self.store, DIFFICULTY_TOTALS);
        self.totals = totals
            .into_iter()
            .map(|totals| (totals.difficulty, totals))
            .collect();

        info!(
            target: "progression",
            "Progress loaded; level: {}; stars: {}; coins: {}",
            self.current_level,
            self.total_stars,
            self.total_coins
        );
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        let mut totals: Vec<&DifficultyTotals> = self.totals.values().collect();
        totals.sort_by_key(|totals| totals.difficulty);

        store_value(&mut self.store, CURRENT_LEVEL, &self.current_level)?;
        store_value(&mut self.store, TOTAL_STARS, &self.total_stars)?;
        store_value(&mut self.store, TOTAL_COINS, &self.total_coins)?;
        store_value(&mut self.store, LEVEL_RECORDS, &self.records)?;
        store_value(&mut self.store, DIFFICULTY_TOTALS, &totals)?;
        self.store.flush()
    }

    /// Credits a finished puzzle and unlocks the next level.
    pub fn complete_level(&mut self, result: &CompletionResult) -> Result<LevelRecord, StoreError> {
        let record = LevelRecord::from_completion(self.current_level, result, Utc::now().timestamp());

        self.total_stars = self.total_stars.saturating_add(result.stars_earned as u32);
        self.total_coins = self.total_coins.saturating_add(result.coins_earned);
        if self.current_level < self.total_levels {
            self.current_level += 1;
        }

        let totals = self
            .totals
            .entry(result.difficulty)
            .or_insert_with(|| DifficultyTotals {
                difficulty: result.difficulty,
                ..Default::default()
            });
        totals.total_games_played = totals.total_games_played.saturating_add(1);
        totals.total_time_played = totals.total_time_played.saturating_add(result.completion_time);
        totals.total_hints_used = totals.total_hints_used.saturating_add(result.hints_used);
        totals.total_stars = totals.total_stars.saturating_add(result.stars_earned as u32);

        self.insert_record(record.clone());

        info!(
            target: "progression",
            "Level {} complete; +{} stars, +{} coins; now on level {}",
            record.level,
            result.stars_earned,
            result.coins_earned,
            self.current_level
        );
        self.save()?;
        Ok(record)
    }

    /// Keeps the fastest runs for each puzzle type and difficulty.
    fn insert_record(&mut self, record: LevelRecord) {
        self.records.push(record);
        self.records
            .sort_by(|a, b| a.completion_time.cmp(&b.completion_time));

        let mut kept: HashMap<(PuzzleType, Difficulty), usize> = HashMap::new();
        self.records.retain(|record| {
            let count = kept
                .entry((record.puzzle_type, record.difficulty))
                .or_default();
            *count += 1;
            *count <= MAX_RECORDS_PER_PUZZLE
        });
    }

    /// Jumps to an already-known level. Out-of-range levels are refused.
    pub fn load_level(&mut self, level: u32) -> bool {
        if level == 0 || level > self.total_levels {
            return false;
        }
        self.current_level = level;
        true
    }

    pub fn add_coins(&mut self, amount: u32) -> Result<u32, StoreError> {
        self.total_coins = self.total_coins.saturating_add(amount);
        debug!(target: "progression", "Earned {} coins; total: {}", amount, self.total_coins);
        self.save()?;
        Ok(self.total_coins)
    }

    /// Spends coins if there are enough. Returns false and changes nothing otherwise.
    pub fn spend_coins(&mut self, amount: u32) -> Result<bool, StoreError> {
        if self.total_coins < amount {
            debug!(
                target: "progression",
                "Cannot spend {} coins; only {} available",
                amount,
                self.total_coins
            );
            return Ok(false);
        }
        self.total_coins -= amount;
        self.save()?;
        Ok(true)
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        info!(target: "progression", "Resetting all progress");
        self.current_level = 1;
        self.total_stars = 0;
        self.total_coins = 0;
        self.records.clear();
        self.totals.clear();
        for key in [CURRENT_LEVEL, TOTAL_STARS, TOTAL_COINS, LEVEL_RECORDS, DIFFICULTY_TOTALS] {
            self.store.remove(key);
        }
        self.store.flush()
    }

    pub fn high_scores(&self, puzzle_type: PuzzleType, difficulty: Difficulty, limit: usize) -> Vec<LevelRecord> {
        self.records
            .iter()
            .filter(|record| record.puzzle_type == puzzle_type && record.difficulty == difficulty)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn totals(&self, difficulty: Difficulty) -> DifficultyTotals {
        self.totals
            .get(&difficulty)
            .cloned()
            .unwrap_or_else(|| DifficultyTotals {
                difficulty,
                ..Default::default()
            })
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn total_levels(&self) -> u32 {
        self.total_levels
    }

    pub fn total_stars(&self) -> u32 {
        self.total_stars
    }

    pub fn total_coins(&self) -> u32 {
        self.total_coins
    }

    /// Finished puzzles across every difficulty.
    pub fn levels_completed(&self) -> u32 {
        self.totals
            .values()
            .fold(0, |sum, totals| sum.saturating_add(totals.total_games_played))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<S: KeyValueStore> EventHandler<SessionEvent> for Progression<S> {
    fn handle_event(&mut self, event: &SessionEvent) {
        if let SessionEvent::PuzzleComplete(result) = event {
            if let Err(err) = self.complete_level(result) {
                warn!(target: "progression", "Failed to save progress: {}", err);
            }
        }
    }
}
