//! Players: one task per seat, plus a key press generator for computer
//! seats.

pub mod actor;
pub mod bot;

pub use actor::{PlayerActor, PlayerHandle};
pub use bot::ComputerInput;

use crate::game::config::GameConfig;
use tokio::{sync::watch, task::JoinHandle};

/// A running seat: the player task, its optional input task, and the
/// signal that stops both.
pub struct PlayerTask {
    handle: PlayerHandle,
    stop: watch::Sender<bool>,
    actor: Option<JoinHandle<()>>,
    input: Option<JoinHandle<()>>,
}

impl PlayerTask {
    /// Spawn the player task, and a [`ComputerInput`] for computer seats.
    pub fn spawn(actor: PlayerActor, handle: PlayerHandle, config: &GameConfig) -> Self {
        let (stop, stop_rx) = watch::channel(false);

        let input = (!handle.is_human()).then(|| {
            let input = ComputerInput::new(
                handle.clone(),
                config.table_size,
                config.computer_press_delay(),
                config.seed,
                stop_rx.clone(),
            );
            tokio::spawn(input.run())
        });
        let actor = tokio::spawn(actor.run(stop_rx));

        Self {
            handle,
            stop,
            actor: Some(actor),
            input,
        }
    }

    pub fn handle(&self) -> &PlayerHandle {
        &self.handle
    }

    /// Ask the player (and its input) to stop. Does not wait.
    pub fn signal(&self) {
        self.stop.send_replace(true);
    }

    /// Stop the seat and wait until both of its tasks have exited.
    pub async fn terminate(&mut self) {
        self.signal();
        self.join().await;
    }

    /// Wait for the input task, then the player task. Safe to call twice.
    pub async fn join(&mut self) {
        if let Some(input) = self.input.take()
            && let Err(err) = input.await
        {
            log::error!("Input task for player {} failed: {}", self.handle.id(), err);
        }
        if let Some(actor) = self.actor.take()
            && let Err(err) = actor.await
        {
            log::error!("Player {} task failed: {}", self.handle.id(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{entities::PlayerState, oracle::StandardOracle, ui::NullUi},
        table::Table,
    };
    use std::{sync::Arc, time::Duration};
    use tokio::sync::mpsc;

    fn seat(config: &GameConfig) -> PlayerTask {
        let table = Arc::new(Table::new(
            config,
            Arc::new(StandardOracle::default()),
            Arc::new(NullUi),
        ));
        let (validations, _requests) = mpsc::unbounded_channel();
        let (actor, handle) = PlayerActor::new(0, config, table, Arc::new(NullUi), validations);
        PlayerTask::spawn(actor, handle, config)
    }

    #[tokio::test]
    async fn test_terminate_joins_computer_seat() {
        let mut seat = seat(&GameConfig::default());
        assert!(seat.input.is_some());

        tokio::time::timeout(Duration::from_secs(2), seat.terminate())
            .await
            .expect("seat did not stop");
        assert_eq!(seat.handle().state(), PlayerState::Terminated);
        assert!(seat.input.is_none());
        assert!(seat.actor.is_none());

        // Second call is a no-op
        seat.terminate().await;
    }

    #[tokio::test]
    async fn test_human_seat_has_no_input_task() {
        let config = GameConfig {
            human_players: 1,
            computer_players: 0,
            ..GameConfig::default()
        };
        let mut seat = seat(&config);
        assert!(seat.input.is_none());
        seat.terminate().await;
        assert_eq!(seat.handle().state(), PlayerState::Terminated);
    }
}
