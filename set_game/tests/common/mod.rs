//! Shared helpers for the game integration tests.

#![allow(dead_code)]

use set_game::{Card, GameConfig, SetOracle, Slot, Table};
use std::{future::Future, time::Duration};

/// Legal sets are exactly {3k, 3k+1, 3k+2}, so tests know every set up
/// front.
pub struct TripletOracle;

impl SetOracle for TripletOracle {
    fn is_set(&self, cards: &[Card]) -> bool {
        let mut cards = cards.to_vec();
        cards.sort_unstable();
        cards.len() == 3
            && cards[0] % 3 == 0
            && cards[1] == cards[0] + 1
            && cards[2] == cards[0] + 2
    }

    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>> {
        set_game::game::oracle::combinations(cards, 3, limit, |combo| self.is_set(combo))
    }

    fn features(&self, card: Card) -> Vec<usize> {
        vec![card / 3, card % 3]
    }
}

/// One human seat, a 12-card deck on a 12-slot table, short freezes.
pub fn human_config() -> GameConfig {
    GameConfig {
        human_players: 1,
        computer_players: 0,
        table_size: 12,
        deck_size: 12,
        turn_timeout_ms: 30_000,
        turn_timeout_warning_ms: 1_000,
        point_freeze_ms: 100,
        penalty_freeze_ms: 300,
        seed: Some(7),
        ..GameConfig::default()
    }
}

/// Poll `check` until it holds, panicking after `timeout`.
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(timeout, async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Wait for the dealer to open a round with `cards` cards on the table.
pub async fn wait_for_round(table: &Table, cards: usize) {
    wait_until(Duration::from_secs(5), move || async move {
        !table.is_locked() && table.count_cards().await == cards
    })
    .await;
}

/// Slots currently holding `cards`
pub async fn slots_of(table: &Table, cards: &[Card]) -> Vec<Slot> {
    let mut slots = Vec::new();
    for &card in cards {
        slots.push(table.slot_of(card).await.expect("card not on the table"));
    }
    slots
}
