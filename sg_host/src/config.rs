//! Host configuration management.
//!
//! Layers, lowest priority first: built-in defaults, an optional JSON
//! file, `SET_*` environment variables, command line flags.

use set_game::GameConfig;
use std::path::PathBuf;

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub human_players: Option<usize>,
    pub computer_players: Option<usize>,
    pub turn_timeout_ms: Option<u64>,
    pub seed: Option<u64>,
    pub hints: bool,
}

/// Complete host configuration
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Game settings handed to the library
    pub game: GameConfig,
    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
}

impl HostConfig {
    /// Load and validate the configuration
    ///
    /// # Arguments
    ///
    /// * `cli` - Command line overrides, applied last
    ///
    /// # Returns
    ///
    /// * `Result<HostConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or if the
    /// merged settings are invalid
    pub fn load(cli: CliOverrides) -> Result<Self, ConfigError> {
        let mut game = match &cli.config_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                GameConfig::parse_json(&json)?
            }
            None => GameConfig::default(),
        };

        apply_env(&mut game);

        if let Some(humans) = cli.human_players {
            game.human_players = humans;
        }
        if let Some(computers) = cli.computer_players {
            game.computer_players = computers;
        }
        if let Some(timeout) = cli.turn_timeout_ms {
            game.turn_timeout_ms = timeout;
        }
        if cli.seed.is_some() {
            game.seed = cli.seed;
        }
        if cli.hints {
            game.hints = true;
        }

        game.validate()?;

        Ok(Self {
            game,
            source: cli.config_path,
        })
    }
}

fn apply_env(game: &mut GameConfig) {
    game.human_players = parse_env_or("SET_HUMAN_PLAYERS", game.human_players);
    game.computer_players = parse_env_or("SET_COMPUTER_PLAYERS", game.computer_players);
    game.table_size = parse_env_or("SET_TABLE_SIZE", game.table_size);
    game.deck_size = parse_env_or("SET_DECK_SIZE", game.deck_size);
    game.feature_size = parse_env_or("SET_FEATURE_SIZE", game.feature_size);
    game.feature_count = parse_env_or("SET_FEATURE_COUNT", game.feature_count);
    game.turn_timeout_ms = parse_env_or("SET_TURN_TIMEOUT_MS", game.turn_timeout_ms);
    game.turn_timeout_warning_ms =
        parse_env_or("SET_TURN_TIMEOUT_WARNING_MS", game.turn_timeout_warning_ms);
    game.point_freeze_ms = parse_env_or("SET_POINT_FREEZE_MS", game.point_freeze_ms);
    game.penalty_freeze_ms = parse_env_or("SET_PENALTY_FREEZE_MS", game.penalty_freeze_ms);
    game.table_delay_ms = parse_env_or("SET_TABLE_DELAY_MS", game.table_delay_ms);
    game.computer_press_delay_ms =
        parse_env_or("SET_COMPUTER_PRESS_DELAY_MS", game.computer_press_delay_ms);
    game.hints = parse_env_or("SET_HINTS", game.hints);
    game.seed = std::env::var("SET_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .or(game.seed);
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Game(#[from] set_game::ConfigError),
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
