//! # Set Game
//!
//! The concurrency core of the card game "Set": a shared table of cards,
//! independent player tasks that place tokens on it, and a dealer task
//! that validates candidate sets, scores them, and runs the round clock.
//!
//! ## Architecture
//!
//! - **Table**: slot/card bijection plus per-player tokens behind one
//!   write lock, with a dealer-controlled input gate
//! - **Players**: one task per seat consuming a bounded queue of slot
//!   presses; computer seats get a random press generator
//! - **Dealer**: owns the deck, deals and clears rounds, and answers each
//!   full candidate set with a one-shot [`Resolution`]
//!
//! Rendering and set legality are collaborators behind the [`Ui`] and
//! [`SetOracle`] traits.
//!
//! ## Example
//!
//! ```no_run
//! use set_game::{Game, GameConfig, LogUi, StandardOracle};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GameConfig::default();
//!     let mut game = Game::start(
//!         config,
//!         Arc::new(StandardOracle::default()),
//!         Arc::new(LogUi),
//!     )
//!     .unwrap();
//!     let winners = game.wait().await.unwrap();
//!     println!("Winners: {:?}", winners);
//! }
//! ```

/// Configuration, identifiers, errors and collaborator traits.
pub mod game;
pub use game::{
    Card, ConfigError, Game, GameConfig, GameError, GameResult, LogUi, NullUi, PlayerId,
    PlayerState, RecordingUi, Resolution, SetOracle, Slot, StandardOracle, TableError, Toggle,
    Ui, UiEvent,
};

/// Round lifecycle and validation.
pub mod dealer;
pub use dealer::{Dealer, DealerHandle};

/// Player tasks and automated input.
pub mod player;
pub use player::PlayerHandle;

/// The shared board.
pub mod table;
pub use table::Table;
