//! Game types shared by the table, the players and the dealer.
//!
//! This module provides:
//! - Configuration and its validation
//! - Card, slot and player identifiers, and the validation outcomes
//! - Error types
//! - The set legality oracle and the display sink collaborators
//! - The [`Game`](session::Game) facade used by hosts

pub mod config;
pub mod entities;
pub mod errors;
pub mod oracle;
pub mod session;
pub mod ui;

pub use config::GameConfig;
pub use entities::{Card, PlayerId, PlayerState, Resolution, Slot, Toggle};
pub use errors::{ConfigError, GameError, GameResult, TableError};
pub use oracle::{SetOracle, StandardOracle};
pub use session::Game;
pub use ui::{LogUi, NullUi, RecordingUi, Ui, UiEvent};
