//! Display notifications.
//!
//! The core never renders anything itself. Every visible change is pushed
//! to a [`Ui`] sink, which must return promptly.

use super::entities::{Card, PlayerId, Slot};
use std::sync::Mutex;

/// One-way display sink.
pub trait Ui: Send + Sync {
    fn place_card(&self, card: Card, slot: Slot);
    fn remove_card(&self, slot: Slot);
    fn place_token(&self, player: PlayerId, slot: Slot);
    fn remove_token(&self, player: PlayerId, slot: Slot);
    /// Every token on `slot` was cleared at once.
    fn remove_tokens(&self, slot: Slot);
    fn set_score(&self, player: PlayerId, score: u32);
    /// Remaining freeze; 0 means the player is active again.
    fn set_freeze(&self, player: PlayerId, millis: u64);
    /// Remaining round time; `warn` is set inside the warning threshold.
    fn set_countdown(&self, millis: u64, warn: bool);
    fn announce_winners(&self, players: &[PlayerId]);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUi;

impl Ui for NullUi {
    fn place_card(&self, _card: Card, _slot: Slot) {}
    fn remove_card(&self, _slot: Slot) {}
    fn place_token(&self, _player: PlayerId, _slot: Slot) {}
    fn remove_token(&self, _player: PlayerId, _slot: Slot) {}
    fn remove_tokens(&self, _slot: Slot) {}
    fn set_score(&self, _player: PlayerId, _score: u32) {}
    fn set_freeze(&self, _player: PlayerId, _millis: u64) {}
    fn set_countdown(&self, _millis: u64, _warn: bool) {}
    fn announce_winners(&self, _players: &[PlayerId]) {}
}

/// Renders notifications as log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogUi;

impl Ui for LogUi {
    fn place_card(&self, card: Card, slot: Slot) {
        log::debug!("card {} placed on slot {}", card, slot);
    }

    fn remove_card(&self, slot: Slot) {
        log::debug!("card removed from slot {}", slot);
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        log::debug!("player {} placed a token on slot {}", player, slot);
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        log::debug!("player {} removed a token from slot {}", player, slot);
    }

    fn remove_tokens(&self, slot: Slot) {
        log::debug!("tokens cleared from slot {}", slot);
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        log::info!("player {} score: {}", player, score);
    }

    fn set_freeze(&self, player: PlayerId, millis: u64) {
        log::debug!("player {} frozen for {}ms", player, millis);
    }

    fn set_countdown(&self, millis: u64, warn: bool) {
        if warn {
            log::debug!("round ends in {}ms", millis);
        } else {
            log::trace!("round ends in {}ms", millis);
        }
    }

    fn announce_winners(&self, players: &[PlayerId]) {
        log::info!("winners: {:?}", players);
    }
}

/// Recorded display notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    PlaceCard { card: Card, slot: Slot },
    RemoveCard { slot: Slot },
    PlaceToken { player: PlayerId, slot: Slot },
    RemoveToken { player: PlayerId, slot: Slot },
    RemoveTokens { slot: Slot },
    Score { player: PlayerId, score: u32 },
    Freeze { player: PlayerId, millis: u64 },
    Countdown { millis: u64, warn: bool },
    Winners(Vec<PlayerId>),
}

/// Keeps every notification in order, for tests and replays.
#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notifications so far
    pub fn events(&self) -> Vec<UiEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: UiEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Ui for RecordingUi {
    fn place_card(&self, card: Card, slot: Slot) {
        self.push(UiEvent::PlaceCard { card, slot });
    }

    fn remove_card(&self, slot: Slot) {
        self.push(UiEvent::RemoveCard { slot });
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        self.push(UiEvent::PlaceToken { player, slot });
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        self.push(UiEvent::RemoveToken { player, slot });
    }

    fn remove_tokens(&self, slot: Slot) {
        self.push(UiEvent::RemoveTokens { slot });
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        self.push(UiEvent::Score { player, score });
    }

    fn set_freeze(&self, player: PlayerId, millis: u64) {
        self.push(UiEvent::Freeze { player, millis });
    }

    fn set_countdown(&self, millis: u64, warn: bool) {
        self.push(UiEvent::Countdown { millis, warn });
    }

    fn announce_winners(&self, players: &[PlayerId]) {
        self.push(UiEvent::Winners(players.to_vec()));
    }
}
