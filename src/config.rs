use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity::{Direction, Position};
use crate::error::{Error, Result};

/// Longest movement interval a settings file may ask for.
pub const MAX_INTERVAL_LIMIT_MS: f64 = 60_000.0;

/// Parameters of the movement interval formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    /// Interval at speed 1.0 on a zero-sized board.
    pub base_interval_ms: f64,
    pub min_interval_ms: f64,
    pub max_interval_ms: f64,
    /// Board diagonal at which the interval is halved.
    pub reference_diagonal: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 200.0,
            min_interval_ms: 16.0,
            max_interval_ms: 1000.0,
            reference_diagonal: 80.0,
        }
    }
}

/// Gameplay constants. Every field can be overridden from `settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub initial_head: Position,
    pub initial_direction: Direction,
    pub initial_length: usize,
    /// Multiplier on the movement interval; lower is faster.
    pub initial_speed: f64,
    pub speed_step: f64,
    pub min_speed: f64,
    /// Seconds a snake survives without eating.
    pub hunger_reset: i32,
    pub food_ttl_ms: u64,
    pub timing: TimingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_head: Position::new(5, 5),
            initial_direction: Direction::Right,
            initial_length: 3,
            initial_speed: 1.0,
            speed_step: 0.05,
            min_speed: 0.05,
            hunger_reset: 30,
            food_ttl_ms: 10_000,
            timing: TimingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn food_ttl(&self) -> Duration {
        Duration::from_millis(self.food_ttl_ms)
    }

    /// Reads overrides from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::io(path, e)),
        };
        let config: Self = serde_json::from_str(&raw).map_err(|e| Error::corrupt(path, e))?;
        config.validate().map_err(|reason| Error::InvalidSettings {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with, naming the first offender.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        let timing = &self.timing;
        let checks = [
            (self.initial_length >= 1, "initialLength must be at least 1"),
            (self.initial_speed > 0.0, "initialSpeed must be positive"),
            (self.speed_step >= 0.0, "speedStep must not be negative"),
            (self.min_speed > 0.0, "minSpeed must be positive"),
            (self.hunger_reset > 0, "hungerReset must be positive"),
            (self.food_ttl_ms > 0, "foodTtlMs must be positive"),
            (timing.base_interval_ms > 0.0, "timing.baseIntervalMs must be positive"),
            (timing.min_interval_ms > 0.0, "timing.minIntervalMs must be positive"),
            (
                timing.min_interval_ms <= timing.max_interval_ms,
                "timing.minIntervalMs must not exceed timing.maxIntervalMs",
            ),
            (
                timing.max_interval_ms <= MAX_INTERVAL_LIMIT_MS,
                "timing.maxIntervalMs is too large",
            ),
            (timing.reference_diagonal > 0.0, "timing.referenceDiagonal must be positive"),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, reason)) => Err(*reason),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::timing::tick_interval;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.initial_length, 3);
        assert_eq!(config.hunger_reset, 30);
        assert_eq!(config.food_ttl(), Duration::from_secs(10));
        assert_eq!(config.timing.reference_diagonal, 80.0);
    }

    #[test]
    fn test_missing_settings_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_settings_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"hungerReset": 12, "timing": {"minIntervalMs": 40}}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.hunger_reset, 12);
        assert_eq!(config.timing.min_interval_ms, 40.0);
        assert_eq!(config.timing.max_interval_ms, 1000.0);
        assert_eq!(config.speed_step, 0.05);
    }

    #[test]
    fn test_malformed_settings_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(EngineConfig::load(&path), Err(Error::Corrupt { .. })));
    }

    fn load_str(json: &str) -> Result<EngineConfig> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, json).unwrap();
        EngineConfig::load(&path)
    }

    fn rejected_reason(json: &str) -> &'static str {
        match load_str(json) {
            Err(Error::InvalidSettings { reason, .. }) => reason,
            other => panic!("{json} should be rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_min_interval_above_max_is_rejected() {
        assert_eq!(
            rejected_reason(r#"{"timing": {"minIntervalMs": 2000}}"#),
            "timing.minIntervalMs must not exceed timing.maxIntervalMs"
        );
    }

    #[test]
    fn test_zero_reference_diagonal_is_rejected() {
        assert_eq!(
            rejected_reason(r#"{"timing": {"referenceDiagonal": 0}}"#),
            "timing.referenceDiagonal must be positive"
        );
    }

    #[test]
    fn test_out_of_range_settings_are_rejected() {
        let cases = [
            (r#"{"initialLength": 0}"#, "initialLength must be at least 1"),
            (r#"{"initialSpeed": 0}"#, "initialSpeed must be positive"),
            (r#"{"speedStep": -0.1}"#, "speedStep must not be negative"),
            (r#"{"minSpeed": 0}"#, "minSpeed must be positive"),
            (r#"{"minSpeed": -1.5}"#, "minSpeed must be positive"),
            (r#"{"hungerReset": 0}"#, "hungerReset must be positive"),
            (r#"{"foodTtlMs": 0}"#, "foodTtlMs must be positive"),
            (r#"{"timing": {"baseIntervalMs": 0}}"#, "timing.baseIntervalMs must be positive"),
            (r#"{"timing": {"baseIntervalMs": -200}}"#, "timing.baseIntervalMs must be positive"),
            (r#"{"timing": {"minIntervalMs": -16}}"#, "timing.minIntervalMs must be positive"),
            (r#"{"timing": {"maxIntervalMs": 1e300}}"#, "timing.maxIntervalMs is too large"),
            (r#"{"timing": {"referenceDiagonal": -80}}"#, "timing.referenceDiagonal must be positive"),
        ];
        for (json, reason) in cases {
            assert_eq!(rejected_reason(json), reason, "{json}");
        }
    }

    #[test]
    fn test_accepted_settings_give_a_finite_interval_on_any_board() {
        let config = load_str(r#"{"timing": {"minIntervalMs": 1000, "referenceDiagonal": 0.5}}"#).unwrap();
        for board in [Board::new(0, 0), Board::new(20, 10), Board::new(500, 300)] {
            let interval = tick_interval(config.initial_speed, board, &config.timing);
            assert_eq!(interval, Duration::from_secs(1));
        }
    }
}
