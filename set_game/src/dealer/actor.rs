//! Dealer actor: owns the deck, runs rounds, validates candidate sets.

use super::messages::{ValidationReceiver, ValidationRequest, ValidationSender};
use crate::{
    game::{
        config::GameConfig,
        entities::{Card, PlayerId, Resolution, Slot},
        errors::{GameError, GameResult},
        oracle::SetOracle,
        ui::Ui,
    },
    player::{PlayerActor, PlayerHandle, PlayerTask},
    table::Table,
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    time::Instant,
};

/// Countdown refresh while far from the deadline
const COARSE_TICK: Duration = Duration::from_secs(1);

/// Countdown refresh inside the warning threshold
const FINE_TICK: Duration = Duration::from_millis(10);

/// Every player whose score equals the highest score.
pub fn winners(scores: &[u32]) -> Vec<PlayerId> {
    let Some(&best) = scores.iter().max() else {
        return Vec::new();
    };
    scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score == best)
        .map(|(player, _)| player)
        .collect()
}

/// Cloneable handle to a game run by a [`Dealer`].
#[derive(Clone)]
pub struct DealerHandle {
    players: Arc<[PlayerHandle]>,
    table: Arc<Table>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl DealerHandle {
    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }

    pub fn player(&self, player: PlayerId) -> GameResult<&PlayerHandle> {
        self.players
            .get(player)
            .ok_or(GameError::UnknownPlayer(player))
    }

    /// Forward a selection event to a player. See
    /// [`PlayerHandle::submit_selection`] for when it is dropped.
    pub async fn submit_selection(&self, player: PlayerId, slot: Slot) -> GameResult<bool> {
        Ok(self.player(player)?.submit_selection(slot).await)
    }

    pub fn score(&self, player: PlayerId) -> GameResult<u32> {
        Ok(self.player(player)?.score())
    }

    /// Scores indexed by player id
    pub fn scores(&self) -> Vec<u32> {
        self.players.iter().map(PlayerHandle::score).collect()
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Request the end of the game. Idempotent.
    pub fn terminate(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_terminated(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// The round orchestrator. The deck never leaves this struct.
pub struct Dealer {
    config: GameConfig,
    table: Arc<Table>,
    oracle: Arc<dyn SetOracle>,
    ui: Arc<dyn Ui>,
    deck: Vec<Card>,
    rng: StdRng,
    pending: Vec<PlayerActor>,
    handles: Vec<PlayerHandle>,
    seats: Vec<PlayerTask>,
    validations: ValidationReceiver,
    shutdown: watch::Receiver<bool>,
    // Held so the shutdown channel never closes under the dealer
    _shutdown_tx: Arc<watch::Sender<bool>>,
    reshuffle_at: Instant,
    board_changed: bool,
}

impl Dealer {
    /// Create a dealer, its table and every player. Nothing runs until
    /// [`Dealer::run`].
    ///
    /// # Arguments
    ///
    /// * `config` - Game configuration, validated here
    /// * `oracle` - Set legality rules
    /// * `ui` - Display sink shared by the table, players and dealer
    ///
    /// # Returns
    ///
    /// * `GameResult<(Dealer, DealerHandle)>` - Dealer and a handle for the host
    pub fn new(
        config: GameConfig,
        oracle: Arc<dyn SetOracle>,
        ui: Arc<dyn Ui>,
    ) -> GameResult<(Self, DealerHandle)> {
        let (dealer, handle, _) = Self::build(config, oracle, ui)?;
        Ok((dealer, handle))
    }

    fn build(
        config: GameConfig,
        oracle: Arc<dyn SetOracle>,
        ui: Arc<dyn Ui>,
    ) -> GameResult<(Self, DealerHandle, ValidationSender)> {
        config.validate()?;

        let table = Arc::new(Table::new(&config, oracle.clone(), ui.clone()));
        let (sender, validations) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown) = watch::channel(false);
        let shutdown_tx = Arc::new(shutdown_tx);

        let (pending, handles): (Vec<_>, Vec<_>) = (0..config.players())
            .map(|id| PlayerActor::new(id, &config, table.clone(), ui.clone(), sender.clone()))
            .unzip();

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let handle = DealerHandle {
            players: handles.clone().into(),
            table: table.clone(),
            shutdown: shutdown_tx.clone(),
        };

        let dealer = Self {
            deck: (0..config.deck_size).collect(),
            reshuffle_at: Instant::now() + config.turn_timeout(),
            config,
            table,
            oracle,
            ui,
            rng,
            pending,
            handles,
            seats: Vec::new(),
            validations,
            shutdown,
            _shutdown_tx: shutdown_tx,
            board_changed: false,
        };

        Ok((dealer, handle, sender))
    }

    /// Run the game to completion and return the winners.
    ///
    /// Players are always stopped and joined before this returns, even
    /// when a table error ends the game early.
    pub async fn run(mut self) -> GameResult<Vec<PlayerId>> {
        log::info!("Dealer starting with {} players", self.pending.len());
        self.spawn_players();

        let outcome = self.play().await;

        self.table.lock().await;
        self.terminate_players().await;
        outcome?;

        let scores: Vec<u32> = self.handles.iter().map(PlayerHandle::score).collect();
        let winners = winners(&scores);
        log::info!("Game over. Scores {:?}, winners {:?}", scores, winners);
        self.ui.announce_winners(&winners);
        Ok(winners)
    }

    fn spawn_players(&mut self) {
        let actors = std::mem::take(&mut self.pending);
        self.seats = actors
            .into_iter()
            .zip(self.handles.iter().cloned())
            .map(|(actor, handle)| PlayerTask::spawn(actor, handle, &self.config))
            .collect();
    }

    async fn play(&mut self) -> GameResult<()> {
        while !self.should_finish() {
            self.place_all_cards().await?;
            self.reset_timer();
            self.table.unlock().await;
            let dealt = self.table.count_cards().await;
            log::info!(
                "Round open: {} cards on the table, {} in the deck",
                dealt,
                self.deck.len()
            );

            self.timer_loop().await?;

            self.table.lock().await;
            self.remove_all_cards().await?;
            log::info!("Round closed");
        }
        Ok(())
    }

    /// Signal every seat, then join every seat. Each join waits for the
    /// seat's input task before its player task.
    async fn terminate_players(&mut self) {
        for seat in self.seats.iter().rev() {
            seat.signal();
        }
        for seat in self.seats.iter_mut().rev() {
            seat.join().await;
        }
    }

    fn is_terminated(&self) -> bool {
        *self.shutdown.borrow()
    }

    fn should_finish(&self) -> bool {
        if self.is_terminated() {
            log::info!("Termination requested");
            return true;
        }
        if self.oracle.find_sets(&self.deck, 1).is_empty() {
            log::info!("No legal set left in the deck ({} cards)", self.deck.len());
            return true;
        }
        false
    }

    /// Uniformly random card from the deck
    fn draw(&mut self) -> Option<Card> {
        if self.deck.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.deck.len());
        Some(self.deck.swap_remove(index))
    }

    /// Fill empty slots in random order while the deck lasts.
    async fn place_all_cards(&mut self) -> GameResult<()> {
        let mut empty = self.table.empty_slots().await;
        empty.shuffle(&mut self.rng);
        for slot in empty {
            let Some(card) = self.draw() else {
                break;
            };
            self.table.place_card(card, slot).await?;
        }

        self.board_changed = true;
        if self.config.hints {
            self.table.hints().await;
        }
        Ok(())
    }

    /// Return every card on the table to the deck, in random slot order.
    async fn remove_all_cards(&mut self) -> GameResult<()> {
        let mut occupied: Vec<Slot> = self
            .table
            .occupied()
            .await
            .into_iter()
            .map(|(slot, _)| slot)
            .collect();
        occupied.shuffle(&mut self.rng);
        for slot in occupied {
            let card = self.table.remove_card(slot).await?;
            self.deck.push(card);
        }
        Ok(())
    }

    fn reset_timer(&mut self) {
        let timeout = self.config.turn_timeout();
        self.reshuffle_at = Instant::now() + timeout;
        self.ui.set_countdown(timeout.as_millis() as u64, false);
    }

    fn update_countdown(&self, remaining: Duration) {
        let warn = remaining <= self.config.turn_timeout_warning();
        self.ui.set_countdown(remaining.as_millis() as u64, warn);
    }

    /// Serve validations until the round deadline, an empty-handed board,
    /// or termination.
    async fn timer_loop(&mut self) -> GameResult<()> {
        loop {
            if self.is_terminated() {
                return Ok(());
            }

            if self.board_changed {
                self.board_changed = false;
                if !self.table.has_set().await {
                    log::info!("No legal set on the table, closing the round early");
                    return Ok(());
                }
            }

            let remaining = self.reshuffle_at.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::info!("Round timed out");
                return Ok(());
            }
            self.update_countdown(remaining);

            let tick = if remaining <= self.config.turn_timeout_warning() {
                FINE_TICK
            } else {
                COARSE_TICK
            };
            let wait = tick.min(remaining);

            tokio::select! {
                biased;
                _ = self.shutdown.changed() => return Ok(()),
                request = tokio::time::timeout(wait, self.validations.recv()) => match request {
                    Ok(Some(request)) => self.drain(request).await?,
                    // Every player is gone; keep the clock running
                    Ok(None) => tokio::time::sleep(wait).await,
                    Err(_) => {}
                },
            }
        }
    }

    /// Check `first`, then everything already queued behind it.
    async fn drain(&mut self, first: ValidationRequest) -> GameResult<()> {
        self.check(first).await?;
        while let Ok(request) = self.validations.try_recv() {
            self.check(request).await?;
        }
        Ok(())
    }

    /// Decide one request against the cards currently under the player's
    /// tokens and answer it.
    async fn check(&mut self, request: ValidationRequest) -> GameResult<()> {
        let ValidationRequest { player, reply } = request;

        let resolution = match self.table.full_selection(player).await {
            None => Resolution::Cancel,
            Some(selection) => {
                let cards: Vec<Card> = selection.iter().map(|&(_, card)| card).collect();
                if self.oracle.is_set(&cards) {
                    let slots: Vec<Slot> = selection.iter().map(|&(slot, _)| slot).collect();
                    self.replace_cards(&slots).await?;
                    let score = self
                        .handles
                        .get(player)
                        .ok_or(GameError::UnknownPlayer(player))?
                        .award_point();
                    log::debug!("Player {} scored with cards {:?}, score {}", player, cards, score);
                    Resolution::Point
                } else {
                    log::debug!("Player {} penalized for cards {:?}", player, cards);
                    Resolution::Penalty
                }
            }
        };

        if reply.send(resolution).is_err() {
            log::warn!("Player {} stopped waiting for its {}", player, resolution);
        }
        Ok(())
    }

    /// Swap out the cards of a legal set while the table is locked.
    async fn replace_cards(&mut self, slots: &[Slot]) -> GameResult<()> {
        self.table.lock().await;
        for &slot in slots {
            self.table.remove_card(slot).await?;
            if let Some(card) = self.draw() {
                self.table.place_card(card, slot).await?;
            }
        }

        self.reset_timer();
        self.board_changed = true;
        if self.config.hints {
            self.table.hints().await;
        }
        self.table.unlock().await;
        Ok(())
    }
}
