//! Game configuration.

use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seats fed by the host's input
    pub human_players: usize,

    /// Seats fed by an automated key press generator
    pub computer_players: usize,

    /// Number of slots on the board (default: 12)
    pub table_size: usize,

    /// Number of cards in the game, numbered from 0 (default: 81)
    pub deck_size: usize,

    /// Cards per candidate set, and values per feature (default: 3)
    pub feature_size: usize,

    /// Features per card (default: 4)
    pub feature_count: usize,

    /// Round length before a forced reshuffle
    pub turn_timeout_ms: u64,

    /// Remaining time under which the countdown is refreshed finely
    pub turn_timeout_warning_ms: u64,

    /// Freeze after a legal set
    pub point_freeze_ms: u64,

    /// Freeze after an illegal set
    pub penalty_freeze_ms: u64,

    /// Artificial delay before every card placement or removal
    pub table_delay_ms: u64,

    /// Pause between automated key presses
    pub computer_press_delay_ms: u64,

    /// Log every legal set on the board after dealing
    pub hints: bool,

    /// Fixed RNG seed for reproducible games
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            human_players: 0,
            computer_players: 2,
            table_size: 12,
            deck_size: 81,
            feature_size: 3,
            feature_count: 4,
            turn_timeout_ms: 60_000,
            turn_timeout_warning_ms: 5_000,
            point_freeze_ms: 1_000,
            penalty_freeze_ms: 3_000,
            table_delay_ms: 0,
            computer_press_delay_ms: 0,
            hints: false,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse and validate a configuration from JSON. Missing fields keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_json(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON without validating it, for callers
    /// that layer further overrides on top.
    pub fn parse_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players() == 0 {
            return Err(ConfigError::invalid(
                "players",
                "Need at least one human or computer player",
            ));
        }

        if self.table_size == 0 {
            return Err(ConfigError::invalid("table_size", "Must be greater than 0"));
        }

        if self.feature_size < 2 {
            return Err(ConfigError::invalid("feature_size", "Must be at least 2"));
        }

        if self.feature_size > self.table_size {
            return Err(ConfigError::invalid(
                "feature_size",
                format!("Cannot exceed table size ({})", self.table_size),
            ));
        }

        if self.deck_size == 0 {
            return Err(ConfigError::invalid("deck_size", "Must be greater than 0"));
        }

        if self.feature_count == 0 {
            return Err(ConfigError::invalid("feature_count", "Must be greater than 0"));
        }

        // Every card needs its own feature encoding
        let distinct = u32::try_from(self.feature_count)
            .ok()
            .and_then(|count| self.feature_size.checked_pow(count));
        if let Some(distinct) = distinct
            && self.deck_size > distinct
        {
            return Err(ConfigError::invalid(
                "deck_size",
                format!(
                    "Cannot exceed {} distinct cards ({} features of {} values)",
                    distinct, self.feature_count, self.feature_size
                ),
            ));
        }

        if self.turn_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "turn_timeout_ms",
                "Must be greater than 0",
            ));
        }

        if self.turn_timeout_warning_ms > self.turn_timeout_ms {
            return Err(ConfigError::invalid(
                "turn_timeout_warning_ms",
                format!("Cannot exceed turn timeout ({})", self.turn_timeout_ms),
            ));
        }

        Ok(())
    }

    /// Total number of seats
    pub fn players(&self) -> usize {
        self.human_players + self.computer_players
    }

    /// Seats `0..human_players` are human, the rest are computers.
    pub fn is_human(&self, player: usize) -> bool {
        player < self.human_players
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }

    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_ms)
    }

    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_ms)
    }

    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_ms)
    }

    pub fn table_delay(&self) -> Duration {
        Duration::from_millis(self.table_delay_ms)
    }

    pub fn computer_press_delay(&self) -> Duration {
        Duration::from_millis(self.computer_press_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_no_players_is_invalid() {
        let config = GameConfig {
            human_players: 0,
            computer_players: 0,
            ..GameConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "players"));
    }

    #[test]
    fn test_feature_size_larger_than_table_is_invalid() {
        let config = GameConfig {
            table_size: 2,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_warning_longer_than_timeout_is_invalid() {
        let config = GameConfig {
            turn_timeout_ms: 1_000,
            turn_timeout_warning_ms: 2_000,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deck_larger_than_feature_space_is_invalid() {
        let config = GameConfig {
            deck_size: 82,
            ..GameConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "deck_size"));

        let full = GameConfig {
            deck_size: 81,
            ..GameConfig::default()
        };
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_huge_feature_space_does_not_overflow() {
        let config = GameConfig {
            feature_count: 200,
            ..GameConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_json_leaves_validation_to_the_caller() {
        let config = GameConfig::parse_json(r#"{ "computer_players": 0 }"#).unwrap();
        assert_eq!(config.players(), 0);
        assert!(GameConfig::from_json(r#"{ "computer_players": 0 }"#).is_err());
    }

    #[test]
    fn test_from_json_keeps_defaults_for_missing_fields() {
        let config = GameConfig::from_json(r#"{ "human_players": 1, "seed": 7 }"#).unwrap();
        assert_eq!(config.human_players, 1);
        assert_eq!(config.computer_players, 2);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.table_size, 12);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = GameConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_humans_take_the_first_seats() {
        let config = GameConfig {
            human_players: 2,
            computer_players: 1,
            ..GameConfig::default()
        };
        assert!(config.is_human(0));
        assert!(config.is_human(1));
        assert!(!config.is_human(2));
        assert_eq!(config.players(), 3);
    }
}
