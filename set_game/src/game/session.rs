//! Host-facing game facade.

use super::{
    config::GameConfig,
    entities::{PlayerId, Slot},
    errors::GameResult,
    oracle::SetOracle,
    ui::Ui,
};
use crate::dealer::{Dealer, DealerHandle};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A running game: the dealer task plus a handle to reach its players.
pub struct Game {
    handle: DealerHandle,
    dealer: Option<JoinHandle<GameResult<Vec<PlayerId>>>>,
    winners: Option<Vec<PlayerId>>,
}

impl Game {
    /// Validate `config`, create the table and players, and spawn the
    /// dealer. Must be called from inside a tokio runtime.
    pub fn start(
        config: GameConfig,
        oracle: Arc<dyn SetOracle>,
        ui: Arc<dyn Ui>,
    ) -> GameResult<Self> {
        let (dealer, handle) = Dealer::new(config, oracle, ui)?;
        let dealer = tokio::spawn(dealer.run());
        Ok(Self {
            handle,
            dealer: Some(dealer),
            winners: None,
        })
    }

    pub fn handle(&self) -> &DealerHandle {
        &self.handle
    }

    /// Forward a human selection event. Returns false if it was dropped.
    pub async fn submit_selection(&self, player: PlayerId, slot: Slot) -> GameResult<bool> {
        self.handle.submit_selection(player, slot).await
    }

    pub fn score(&self, player: PlayerId) -> GameResult<u32> {
        self.handle.score(player)
    }

    /// Whether the dealer task has finished
    pub fn is_finished(&self) -> bool {
        self.dealer.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the game to end on its own and return the winners.
    /// Later calls return the same winners.
    pub async fn wait(&mut self) -> GameResult<Vec<PlayerId>> {
        if let Some(dealer) = self.dealer.take() {
            let winners = dealer.await??;
            self.winners = Some(winners);
        }
        Ok(self.winners.clone().unwrap_or_default())
    }

    /// Stop the game and wait until every task has exited. Idempotent.
    pub async fn terminate(&mut self) -> GameResult<Vec<PlayerId>> {
        self.handle.terminate();
        self.wait().await
    }
}
