//! Player actor and its handle.

use crate::{
    dealer::messages::{ValidationRequest, ValidationSender},
    game::{
        config::GameConfig,
        entities::{PlayerId, PlayerState, Resolution, Slot, Toggle},
        ui::Ui,
    },
    table::Table,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU8, AtomicU32, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::Instant,
};

/// Freeze countdowns are shown in whole seconds.
const FREEZE_STEP: Duration = Duration::from_secs(1);

/// State visible from outside the player task
#[derive(Debug, Default)]
struct PlayerShared {
    score: AtomicU32,
    state: AtomicU8,
}

/// Handle for feeding selection events to a player and reading its score.
#[derive(Clone)]
pub struct PlayerHandle {
    id: PlayerId,
    human: bool,
    events: mpsc::Sender<Slot>,
    shared: Arc<PlayerShared>,
    table: Arc<Table>,
    ui: Arc<dyn Ui>,
}

impl PlayerHandle {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn is_human(&self) -> bool {
        self.human
    }

    pub fn score(&self) -> u32 {
        self.shared.score.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> PlayerState {
        PlayerState::from(self.shared.state.load(Ordering::SeqCst))
    }

    /// Queue a token toggle on `slot`.
    ///
    /// Dropped (returns false) while the player is frozen or waiting for
    /// the dealer, while the dealer holds the table, or once the player has
    /// stopped. Waits for room when the queue is full.
    pub async fn submit_selection(&self, slot: Slot) -> bool {
        let state = self.state();
        if !state.accepts_input() {
            log::trace!("Player {} dropped slot {} while {}", self.id, slot, state);
            return false;
        }
        if self.table.is_locked() {
            log::trace!("Player {} dropped slot {}: table locked", self.id, slot);
            return false;
        }
        self.events.send(slot).await.is_ok()
    }

    /// Adds one point and returns the new score.
    pub(crate) fn award_point(&self) -> u32 {
        let score = self.shared.score.fetch_add(1, Ordering::SeqCst) + 1;
        self.ui.set_score(self.id, score);
        score
    }
}

/// Player actor: consumes selection events one at a time, toggles tokens,
/// and submits full candidate sets to the dealer.
pub struct PlayerActor {
    id: PlayerId,
    events: mpsc::Receiver<Slot>,
    shared: Arc<PlayerShared>,
    table: Arc<Table>,
    ui: Arc<dyn Ui>,
    validations: ValidationSender,
    point_freeze: Duration,
    penalty_freeze: Duration,
}

impl PlayerActor {
    /// Create a new player actor
    ///
    /// # Arguments
    ///
    /// * `id` - Seat index
    /// * `config` - Game configuration
    /// * `table` - Shared table
    /// * `ui` - Display sink
    /// * `validations` - Dealer's validation queue
    ///
    /// # Returns
    ///
    /// * `(PlayerActor, PlayerHandle)` - Actor and handle for sending events
    pub fn new(
        id: PlayerId,
        config: &GameConfig,
        table: Arc<Table>,
        ui: Arc<dyn Ui>,
        validations: ValidationSender,
    ) -> (Self, PlayerHandle) {
        let (sender, events) = mpsc::channel(config.feature_size);
        let shared = Arc::new(PlayerShared::default());

        let actor = Self {
            id,
            events,
            shared: shared.clone(),
            table: table.clone(),
            ui: ui.clone(),
            validations,
            point_freeze: config.point_freeze(),
            penalty_freeze: config.penalty_freeze(),
        };

        let handle = PlayerHandle {
            id,
            human: config.is_human(id),
            events: sender,
            shared,
            table,
            ui,
        };

        (actor, handle)
    }

    fn set_state(&self, state: PlayerState) {
        self.shared.state.store(state as u8, Ordering::SeqCst);
    }

    /// Run the player event loop until `stop` flips to true.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        log::info!("Player {} starting", self.id);

        while !*stop.borrow() {
            self.set_state(PlayerState::Idle);

            let slot = tokio::select! {
                biased;
                _ = stop.changed() => break,
                event = self.events.recv() => match event {
                    Some(slot) => slot,
                    None => break,
                },
            };

            self.set_state(PlayerState::Selecting);
            let toggle = self.table.toggle_token(self.id, slot).await;
            log::trace!("Player {} slot {}: {:?}", self.id, slot, toggle);

            if toggle != Toggle::Placed(self.table.feature_size()) {
                continue;
            }

            let Some(resolution) = self.await_validation(&mut stop).await else {
                break;
            };
            log::debug!("Player {} resolved: {}", self.id, resolution);

            let freeze = match resolution {
                Resolution::Point => self.point_freeze,
                Resolution::Penalty => self.penalty_freeze,
                Resolution::Cancel => Duration::ZERO,
            };
            if !self.freeze(freeze, &mut stop).await {
                break;
            }
            self.discard_stale_presses();
        }

        self.set_state(PlayerState::Terminated);
        log::info!("Player {} terminated", self.id);
    }

    /// Submit the full candidate set and wait for the dealer's answer.
    /// Returns None if the player was stopped or the dealer went away.
    async fn await_validation(&mut self, stop: &mut watch::Receiver<bool>) -> Option<Resolution> {
        self.set_state(PlayerState::AwaitingValidation);

        let (reply, response) = oneshot::channel();
        let request = ValidationRequest {
            player: self.id,
            reply,
        };
        if self.validations.send(request).is_err() {
            log::warn!("Player {}: dealer is gone", self.id);
            return None;
        }

        tokio::select! {
            biased;
            _ = stop.changed() => None,
            resolution = response => resolution.ok(),
        }
    }

    /// Drop presses queued before the selection was submitted. They were
    /// aimed at a board that may have changed since.
    fn discard_stale_presses(&mut self) {
        let mut dropped = 0;
        while self.events.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            log::trace!("Player {} discarded {} stale presses", self.id, dropped);
        }
    }

    /// Sleep through a freeze, publishing the countdown. Returns false if
    /// the player was stopped meanwhile.
    async fn freeze(&mut self, duration: Duration, stop: &mut watch::Receiver<bool>) -> bool {
        if duration.is_zero() {
            return true;
        }
        self.set_state(PlayerState::Frozen);

        let deadline = Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let shown = remaining.as_millis().div_ceil(1000) * 1000;
            self.ui.set_freeze(self.id, shown as u64);

            tokio::select! {
                biased;
                _ = stop.changed() => return false,
                _ = tokio::time::sleep(remaining.min(FREEZE_STEP)) => {}
            }
        }

        self.ui.set_freeze(self.id, 0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        oracle::StandardOracle,
        ui::{NullUi, RecordingUi, UiEvent},
    };

    struct Fixture {
        table: Arc<Table>,
        handle: PlayerHandle,
        actor: PlayerActor,
        requests: mpsc::UnboundedReceiver<ValidationRequest>,
    }

    fn fixture(config: GameConfig, ui: Arc<dyn Ui>) -> Fixture {
        let table = Arc::new(Table::new(
            &config,
            Arc::new(StandardOracle::default()),
            ui.clone(),
        ));
        let (validations, requests) = mpsc::unbounded_channel();
        let (actor, handle) = PlayerActor::new(0, &config, table.clone(), ui, validations);
        Fixture {
            table,
            handle,
            actor,
            requests,
        }
    }

    fn human_config() -> GameConfig {
        GameConfig {
            human_players: 1,
            computer_players: 0,
            point_freeze_ms: 0,
            penalty_freeze_ms: 0,
            ..GameConfig::default()
        }
    }

    async fn wait_for_state(handle: &PlayerHandle, state: PlayerState) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while handle.state() != state {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("player never reached the expected state");
    }

    #[tokio::test]
    async fn test_submission_dropped_while_table_locked() {
        let f = fixture(human_config(), Arc::new(NullUi));
        assert!(f.table.is_locked());
        assert!(!f.handle.submit_selection(0).await);
    }

    #[tokio::test]
    async fn test_full_selection_is_submitted_and_resolved() {
        let mut f = fixture(human_config(), Arc::new(NullUi));
        for slot in 0..3 {
            f.table.place_card(slot, slot).await.unwrap();
        }
        f.table.unlock().await;

        let (stop_tx, stop) = watch::channel(false);
        let task = tokio::spawn(f.actor.run(stop));

        for slot in 0..3 {
            assert!(f.handle.submit_selection(slot).await);
        }
        let request = f.requests.recv().await.unwrap();
        assert_eq!(request.player, 0);
        wait_for_state(&f.handle, PlayerState::AwaitingValidation).await;
        assert!(!f.handle.submit_selection(3).await);

        request.reply.send(Resolution::Cancel).unwrap();
        wait_for_state(&f.handle, PlayerState::Idle).await;

        stop_tx.send_replace(true);
        task.await.unwrap();
        assert_eq!(f.handle.state(), PlayerState::Terminated);
    }

    #[tokio::test]
    async fn test_second_press_on_same_slot_removes_token() {
        let ui = Arc::new(RecordingUi::new());
        let f = fixture(human_config(), ui.clone());
        f.table.place_card(0, 0).await.unwrap();
        f.table.unlock().await;

        let (stop_tx, stop) = watch::channel(false);
        let task = tokio::spawn(f.actor.run(stop));

        assert!(f.handle.submit_selection(0).await);
        assert!(f.handle.submit_selection(0).await);
        tokio::time::timeout(Duration::from_secs(2), async {
            while !ui
                .events()
                .contains(&UiEvent::RemoveToken { player: 0, slot: 0 })
            {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
        assert!(f.table.selection(0).await.is_empty());

        stop_tx.send_replace(true);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_penalty_freeze_counts_down_to_zero() {
        let ui = Arc::new(RecordingUi::new());
        let config = GameConfig {
            penalty_freeze_ms: 1_500,
            ..human_config()
        };
        let mut f = fixture(config, ui.clone());
        for slot in 0..3 {
            f.table.place_card(slot, slot).await.unwrap();
        }
        f.table.unlock().await;

        let (stop_tx, stop) = watch::channel(false);
        let task = tokio::spawn(f.actor.run(stop));
        for slot in 0..3 {
            f.handle.submit_selection(slot).await;
        }
        let request = f.requests.recv().await.unwrap();
        request.reply.send(Resolution::Penalty).unwrap();

        wait_for_state(&f.handle, PlayerState::Frozen).await;
        assert!(!f.handle.submit_selection(0).await);
        wait_for_state(&f.handle, PlayerState::Idle).await;

        let freezes: Vec<u64> = ui
            .events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Freeze { millis, .. } => Some(millis),
                _ => None,
            })
            .collect();
        assert_eq!(freezes.first(), Some(&2_000));
        assert_eq!(freezes.last(), Some(&0));

        // Tokens stay after a penalty
        assert_eq!(f.table.selection(0).await, vec![0, 1, 2]);

        stop_tx.send_replace(true);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_interrupts_freeze() {
        let config = GameConfig {
            penalty_freeze_ms: 60_000,
            ..human_config()
        };
        let mut f = fixture(config, Arc::new(NullUi));
        for slot in 0..3 {
            f.table.place_card(slot, slot).await.unwrap();
        }
        f.table.unlock().await;

        let (stop_tx, stop) = watch::channel(false);
        let task = tokio::spawn(f.actor.run(stop));
        for slot in 0..3 {
            f.handle.submit_selection(slot).await;
        }
        f.requests
            .recv()
            .await
            .unwrap()
            .reply
            .send(Resolution::Penalty)
            .unwrap();
        wait_for_state(&f.handle, PlayerState::Frozen).await;

        stop_tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("player did not stop")
            .unwrap();
        assert_eq!(f.handle.state(), PlayerState::Terminated);
    }

    #[tokio::test]
    async fn test_stop_interrupts_wait_for_validation() {
        let mut f = fixture(human_config(), Arc::new(NullUi));
        for slot in 0..3 {
            f.table.place_card(slot, slot).await.unwrap();
        }
        f.table.unlock().await;

        let (stop_tx, stop) = watch::channel(false);
        let task = tokio::spawn(f.actor.run(stop));
        for slot in 0..3 {
            assert!(f.handle.submit_selection(slot).await);
        }

        // Hold the request so the reply never arrives
        let _held = f.requests.recv().await.unwrap();
        wait_for_state(&f.handle, PlayerState::AwaitingValidation).await;

        stop_tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("player did not stop")
            .unwrap();
        assert_eq!(f.handle.state(), PlayerState::Terminated);
    }

    #[tokio::test]
    async fn test_presses_queued_before_submission_are_discarded() {
        let mut f = fixture(human_config(), Arc::new(NullUi));
        for slot in 0..4 {
            f.table.place_card(slot, slot).await.unwrap();
        }
        f.table.unlock().await;

        // Queue a fourth press behind the full selection before the
        // player starts consuming
        for slot in 0..3 {
            assert!(f.handle.submit_selection(slot).await);
        }
        let (stop_tx, stop) = watch::channel(false);
        let task = tokio::spawn(f.actor.run(stop));
        // Room frees up once the first press is taken
        assert!(f.handle.submit_selection(3).await);

        let request = f.requests.recv().await.unwrap();
        wait_for_state(&f.handle, PlayerState::AwaitingValidation).await;
        request.reply.send(Resolution::Penalty).unwrap();
        wait_for_state(&f.handle, PlayerState::Idle).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(f.table.tokens_at(3).await.is_empty());
        assert_eq!(f.table.selection(0).await, vec![0, 1, 2]);

        stop_tx.send_replace(true);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_award_point_updates_score_and_display() {
        let ui = Arc::new(RecordingUi::new());
        let f = fixture(human_config(), ui.clone());
        assert_eq!(f.handle.award_point(), 1);
        assert_eq!(f.handle.award_point(), 2);
        assert_eq!(f.handle.score(), 2);
        assert_eq!(
            ui.events(),
            vec![
                UiEvent::Score { player: 0, score: 1 },
                UiEvent::Score { player: 0, score: 2 },
            ]
        );
    }
}
