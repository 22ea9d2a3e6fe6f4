use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Easy,
    Normal,
    Medium,
    Hard,
    Expert,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Easy
    }
}

impl Difficulty {
    pub fn all() -> Vec<Difficulty> {
        vec![
            Difficulty::Easy,
            Difficulty::Normal,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
        ]
    }

    /// 1-based level as shown to players.
    pub fn level(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
            Difficulty::Expert => 5,
        }
    }

    pub fn from_level(level: u8) -> Option<Difficulty> {
        match level {
            1 => Some(Difficulty::Easy),
            2 => Some(Difficulty::Normal),
            3 => Some(Difficulty::Medium),
            4 => Some(Difficulty::Hard),
            5 => Some(Difficulty::Expert),
            _ => None,
        }
    }

    pub fn piece_count(&self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Normal => 4,
            Difficulty::Medium => 6,
            Difficulty::Hard => 8,
            Difficulty::Expert => 10,
        }
    }

    pub fn time_limit(&self) -> Duration {
        let seconds = match self {
            Difficulty::Easy => 300,
            Difficulty::Normal => 240,
            Difficulty::Medium => 180,
            Difficulty::Hard => 150,
            Difficulty::Expert => 120,
        };
        Duration::from_secs(seconds)
    }

    pub fn max_hints(&self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 3,
            Difficulty::Medium => 2,
            Difficulty::Hard => 1,
            Difficulty::Expert => 0,
        }
    }

    pub fn hints_allowed(&self) -> bool {
        !matches!(self, Difficulty::Expert)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (level {})", self.name(), self.level())
    }
}
