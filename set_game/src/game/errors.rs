//! Game error types.

use super::entities::{Card, PlayerId, Slot};
use thiserror::Error;

/// Board precondition violations
#[derive(Debug, Eq, Error, PartialEq)]
pub enum TableError {
    /// Slot index past the end of the board
    #[error("slot {slot} out of range (table size {size})")]
    SlotOutOfRange { slot: Slot, size: usize },

    /// Card placed on a slot that already holds one
    #[error("slot {0} already holds a card")]
    SlotOccupied(Slot),

    /// Card or token operation on an empty slot
    #[error("slot {0} is empty")]
    SlotEmpty(Slot),

    /// Card identifier past the end of the deck
    #[error("card {card} out of range (deck size {size})")]
    UnknownCard { card: Card, size: usize },

    /// Card already on the board elsewhere
    #[error("card {card} is already on slot {slot}")]
    CardAlreadyPlaced { card: Card, slot: Slot },

    /// Token operation while the dealer holds the table
    #[error("table is locked by the dealer")]
    Locked,

    /// Token placed by a player whose candidate set is full
    #[error("player {0} already holds a full candidate set")]
    SelectionFull(PlayerId),

    /// Token placed twice on the same slot
    #[error("player {player} already has a token on slot {slot}")]
    TokenExists { player: PlayerId, slot: Slot },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Top-level game errors
#[derive(Debug, Error)]
pub enum GameError {
    /// Board error raised while the dealer was mutating the table
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Player index with no seat
    #[error("No player with id {0}")]
    UnknownPlayer(PlayerId),

    /// A game task panicked or was aborted
    #[error("Task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for GameError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Join(value.to_string())
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
