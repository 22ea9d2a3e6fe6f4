use crate::model::{Difficulty, PuzzleType};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::progression::DEFAULT_TOTAL_LEVELS;
use super::session::DEFAULT_SNAP_RADIUS;

const CURRENT_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default)]
    pub puzzle_type: PuzzleType,

    #[serde(default = "default_true")]
    pub time_limited: bool,

    #[serde(default = "default_snap_radius")]
    pub snap_radius: f32,

    #[serde(default = "default_total_levels")]
    pub total_levels: u32,
}

// Helper functions for default values
fn default_version() -> u32 {
    CURRENT_VERSION
}
fn default_true() -> bool {
    true
}
fn default_snap_radius() -> f32 {
    DEFAULT_SNAP_RADIUS
}
fn default_total_levels() -> u32 {
    DEFAULT_TOTAL_LEVELS
}

fn is_usable_snap_radius(radius: f32) -> bool {
    radius.is_finite() && radius > 0.0
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: CURRENT_VERSION,
            difficulty: Difficulty::default(),
            puzzle_type: PuzzleType::default(),
            time_limited: true,
            snap_radius: DEFAULT_SNAP_RADIUS,
            total_levels: DEFAULT_TOTAL_LEVELS,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Settings::default(),
        }
    }

    /// Reads settings from `path`, writing defaults there when the file is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(contents) = fs::read_to_string(path) {
            match serde_json::from_str::<Settings>(&contents) {
                Ok(mut settings) => {
                    settings.migrate();
                    debug!(target: "settings", "Loaded settings from {:?}", path);
                    return settings;
                }
                Err(err) => warn!(target: "settings", "Ignoring bad settings file {:?}: {}", path, err),
            }
        }
        let default = Settings::default();
        let _ = default.save_to(path);
        default
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        match Self::settings_path() {
            Some(path) => self.save_to(&path),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no user data directory",
            )),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        // Ensure the directory exists
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
    }

    pub fn settings_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("kidpuzzle").join("settings.json"))
    }

    fn migrate(&mut self) {
        if self.version < 2 {
            self.version = 2;
        }
        // a radius of zero or less would make every drop miss
        if !is_usable_snap_radius(self.snap_radius) {
            warn!(
                target: "settings",
                "Replacing snap radius {} with {}",
                self.snap_radius,
                DEFAULT_SNAP_RADIUS
            );
            self.snap_radius = DEFAULT_SNAP_RADIUS;
        }
        self.total_levels = self.total_levels.max(1);
    }

    /// The configured snap radius, or the default when it is not a positive number.
    pub fn effective_snap_radius(&self) -> f32 {
        if is_usable_snap_radius(self.snap_radius) {
            self.snap_radius
        } else {
            DEFAULT_SNAP_RADIUS
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        let value = std::env::var("SEED").ok()?;
        match value.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!(target: "settings", "Ignoring invalid SEED {:?}", value);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kidpuzzle").join("settings.json");

        let settings = Settings::load_from(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            difficulty: Difficulty::Hard,
            puzzle_type: PuzzleType::Jigsaw,
            time_limited: false,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_old_file_gets_defaults_and_migrates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"version": 1, "difficulty": "Medium"}"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.version(), CURRENT_VERSION);
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert!(settings.time_limited);
        assert_eq!(settings.snap_radius, DEFAULT_SNAP_RADIUS);
        assert_eq!(settings.total_levels, DEFAULT_TOTAL_LEVELS);
    }

    #[test]
    fn test_unusable_snap_radius_is_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        for radius in ["0", "-2.5"] {
            let contents = format!(r#"{{"version": 2, "snap_radius": {}}}"#, radius);
            fs::write(&path, contents).unwrap();
            assert_eq!(Settings::load_from(&path).snap_radius, DEFAULT_SNAP_RADIUS);
        }

        let settings = Settings {
            snap_radius: f32::NAN,
            ..Settings::default()
        };
        assert_eq!(settings.effective_snap_radius(), DEFAULT_SNAP_RADIUS);
        assert_eq!(
            crate::game::SessionConfig::from_settings(&settings).snap_radius,
            DEFAULT_SNAP_RADIUS
        );

        let settings = Settings {
            snap_radius: 1.5,
            ..Settings::default()
        };
        assert_eq!(settings.effective_snap_radius(), 1.5);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "difficulty = hard").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    #[serial]
    fn test_seed_from_env() {
        std::env::set_var("SEED", "42");
        assert_eq!(Settings::seed_from_env(), Some(42));

        std::env::set_var("SEED", "forty-two");
        assert_eq!(Settings::seed_from_env(), None);

        std::env::remove_var("SEED");
        assert_eq!(Settings::seed_from_env(), None);
    }

    #[test]
    #[serial]
    fn test_debug_mode() {
        std::env::set_var("DEBUG", "1");
        assert!(Settings::is_debug_mode());
        std::env::set_var("DEBUG", "0");
        assert!(!Settings::is_debug_mode());
        std::env::remove_var("DEBUG");
        assert!(!Settings::is_debug_mode());
    }
}
