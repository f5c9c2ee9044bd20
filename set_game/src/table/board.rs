//! Shared board: cards on slots, tokens on slots, and each player's
//! candidate set.

use crate::game::{
    config::GameConfig,
    entities::{Card, PlayerId, Slot, Toggle},
    errors::TableError,
    oracle::SetOracle,
    ui::Ui,
};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::RwLock;

/// Plain board state. Every method keeps the slot/card bijection and the
/// token/selection correspondence intact or fails without changes.
#[derive(Debug)]
pub(crate) struct Board {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: Vec<Option<Slot>>,
    tokens: Vec<HashSet<PlayerId>>,
    selections: HashMap<PlayerId, Vec<Slot>>,
    feature_size: usize,
}

impl Board {
    pub(crate) fn new(table_size: usize, deck_size: usize, feature_size: usize) -> Self {
        Self {
            slot_to_card: vec![None; table_size],
            card_to_slot: vec![None; deck_size],
            tokens: vec![HashSet::new(); table_size],
            selections: HashMap::new(),
            feature_size,
        }
    }

    fn check_slot(&self, slot: Slot) -> Result<(), TableError> {
        if slot >= self.slot_to_card.len() {
            return Err(TableError::SlotOutOfRange {
                slot,
                size: self.slot_to_card.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn place_card(&mut self, card: Card, slot: Slot) -> Result<(), TableError> {
        self.check_slot(slot)?;
        if card >= self.card_to_slot.len() {
            return Err(TableError::UnknownCard {
                card,
                size: self.card_to_slot.len(),
            });
        }
        if self.slot_to_card[slot].is_some() {
            return Err(TableError::SlotOccupied(slot));
        }
        if let Some(existing) = self.card_to_slot[card] {
            return Err(TableError::CardAlreadyPlaced {
                card,
                slot: existing,
            });
        }

        self.slot_to_card[slot] = Some(card);
        self.card_to_slot[card] = Some(slot);
        Ok(())
    }

    /// Takes the card off `slot` and strips every token on it, shrinking
    /// the candidate sets that referenced it.
    pub(crate) fn remove_card(&mut self, slot: Slot) -> Result<Card, TableError> {
        self.check_slot(slot)?;
        let card = self.slot_to_card[slot]
            .take()
            .ok_or(TableError::SlotEmpty(slot))?;
        self.card_to_slot[card] = None;

        for player in self.tokens[slot].drain() {
            if let Some(selection) = self.selections.get_mut(&player) {
                selection.retain(|&s| s != slot);
            }
        }
        Ok(card)
    }

    /// Returns the new candidate set length.
    pub(crate) fn place_token(&mut self, player: PlayerId, slot: Slot) -> Result<usize, TableError> {
        self.check_slot(slot)?;
        if self.slot_to_card[slot].is_none() {
            return Err(TableError::SlotEmpty(slot));
        }
        if self.tokens[slot].contains(&player) {
            return Err(TableError::TokenExists { player, slot });
        }
        let selection = self.selections.entry(player).or_default();
        if selection.len() >= self.feature_size {
            return Err(TableError::SelectionFull(player));
        }

        selection.push(slot);
        self.tokens[slot].insert(player);
        Ok(selection.len())
    }

    pub(crate) fn remove_token(&mut self, player: PlayerId, slot: Slot) -> bool {
        if self.check_slot(slot).is_err() || !self.tokens[slot].remove(&player) {
            return false;
        }
        if let Some(selection) = self.selections.get_mut(&player) {
            selection.retain(|&s| s != slot);
        }
        true
    }

    pub(crate) fn has_token(&self, player: PlayerId, slot: Slot) -> bool {
        self.tokens
            .get(slot)
            .is_some_and(|tokens| tokens.contains(&player))
    }

    pub(crate) fn card_at(&self, slot: Slot) -> Option<Card> {
        self.slot_to_card.get(slot).copied().flatten()
    }

    pub(crate) fn slot_of(&self, card: Card) -> Option<Slot> {
        self.card_to_slot.get(card).copied().flatten()
    }

    pub(crate) fn count_cards(&self) -> usize {
        self.slot_to_card.iter().filter(|c| c.is_some()).count()
    }

    pub(crate) fn cards(&self) -> Vec<Card> {
        self.slot_to_card.iter().flatten().copied().collect()
    }

    pub(crate) fn selection(&self, player: PlayerId) -> Vec<Slot> {
        self.selections.get(&player).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        for (slot, card) in self.slot_to_card.iter().enumerate() {
            if let Some(card) = card
                && self.card_to_slot[*card] != Some(slot)
            {
                return Err(format!("slot {slot} holds card {card} but not vice versa"));
            }
        }
        for (card, slot) in self.card_to_slot.iter().enumerate() {
            if let Some(slot) = slot
                && self.slot_to_card[*slot] != Some(card)
            {
                return Err(format!("card {card} points at slot {slot} but not vice versa"));
            }
        }
        for (player, selection) in &self.selections {
            if selection.len() > self.feature_size {
                return Err(format!("player {player} selected {} slots", selection.len()));
            }
            for slot in selection {
                if !self.tokens[*slot].contains(player) {
                    return Err(format!("player {player} selected {slot} without a token"));
                }
            }
        }
        for (slot, players) in self.tokens.iter().enumerate() {
            for player in players {
                if !self.selection(*player).contains(&slot) {
                    return Err(format!("token of {player} on {slot} is not in its selection"));
                }
                if self.slot_to_card[slot].is_none() {
                    return Err(format!("token of {player} on empty slot {slot}"));
                }
            }
        }
        Ok(())
    }
}

/// Thread-safe board shared by the dealer and every player.
///
/// All mutations go through one write lock. Reads take the read lock and
/// always see a consistent snapshot. While the dealer holds the table
/// (see [`Table::lock`]) token operations are refused.
pub struct Table {
    board: RwLock<Board>,
    locked: AtomicBool,
    table_size: usize,
    feature_size: usize,
    delay: Duration,
    oracle: Arc<dyn SetOracle>,
    ui: Arc<dyn Ui>,
}

impl Table {
    /// Create an empty, locked table
    pub fn new(config: &GameConfig, oracle: Arc<dyn SetOracle>, ui: Arc<dyn Ui>) -> Self {
        Self {
            board: RwLock::new(Board::new(
                config.table_size,
                config.deck_size,
                config.feature_size,
            )),
            locked: AtomicBool::new(true),
            table_size: config.table_size,
            feature_size: config.feature_size,
            delay: config.table_delay(),
            oracle,
            ui,
        }
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    /// Stop accepting tokens until [`Table::unlock`].
    pub async fn lock(&self) {
        let _board = self.board.write().await;
        self.locked.store(true, Ordering::SeqCst);
    }

    pub async fn unlock(&self) {
        let _board = self.board.write().await;
        self.locked.store(false, Ordering::SeqCst);
    }

    /// Non-blocking check used to drop input early. Token operations
    /// repeat the check under the write lock.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Places a card on an empty slot.
    pub async fn place_card(&self, card: Card, slot: Slot) -> Result<(), TableError> {
        self.pause().await;
        let mut board = self.board.write().await;
        board.place_card(card, slot)?;
        self.ui.place_card(card, slot);
        Ok(())
    }

    /// Removes the card from a slot, along with every token on it.
    pub async fn remove_card(&self, slot: Slot) -> Result<Card, TableError> {
        self.pause().await;
        let mut board = self.board.write().await;
        let card = board.remove_card(slot)?;
        self.ui.remove_tokens(slot);
        self.ui.remove_card(slot);
        Ok(card)
    }

    /// Places a player's token; returns the new candidate set length.
    pub async fn place_token(&self, player: PlayerId, slot: Slot) -> Result<usize, TableError> {
        let mut board = self.board.write().await;
        if self.is_locked() {
            return Err(TableError::Locked);
        }
        let len = board.place_token(player, slot)?;
        self.ui.place_token(player, slot);
        Ok(len)
    }

    /// Removes a player's token. Returns true iff a token was removed.
    pub async fn remove_token(&self, player: PlayerId, slot: Slot) -> bool {
        let mut board = self.board.write().await;
        if self.is_locked() {
            return false;
        }
        let removed = board.remove_token(player, slot);
        if removed {
            self.ui.remove_token(player, slot);
        }
        removed
    }

    /// Removes the player's token from `slot` if present, otherwise places
    /// one if the candidate set has room. Decided and applied under one
    /// lock.
    pub async fn toggle_token(&self, player: PlayerId, slot: Slot) -> Toggle {
        let mut board = self.board.write().await;
        if self.is_locked() {
            return Toggle::Ignored;
        }

        if board.has_token(player, slot) {
            board.remove_token(player, slot);
            self.ui.remove_token(player, slot);
            return Toggle::Removed;
        }

        match board.place_token(player, slot) {
            Ok(len) => {
                self.ui.place_token(player, slot);
                Toggle::Placed(len)
            }
            Err(_) => Toggle::Ignored,
        }
    }

    /// Number of occupied slots
    pub async fn count_cards(&self) -> usize {
        self.board.read().await.count_cards()
    }

    pub async fn card_at(&self, slot: Slot) -> Option<Card> {
        self.board.read().await.card_at(slot)
    }

    pub async fn slot_of(&self, card: Card) -> Option<Slot> {
        self.board.read().await.slot_of(card)
    }

    /// Cards currently on the board, in slot order
    pub async fn cards(&self) -> Vec<Card> {
        self.board.read().await.cards()
    }

    /// Occupied slots with their cards
    pub async fn occupied(&self) -> Vec<(Slot, Card)> {
        let board = self.board.read().await;
        (0..self.table_size)
            .filter_map(|slot| board.card_at(slot).map(|card| (slot, card)))
            .collect()
    }

    pub async fn empty_slots(&self) -> Vec<Slot> {
        let board = self.board.read().await;
        (0..self.table_size)
            .filter(|&slot| board.card_at(slot).is_none())
            .collect()
    }

    /// Players with a token on `slot`, sorted
    pub async fn tokens_at(&self, slot: Slot) -> Vec<PlayerId> {
        let board = self.board.read().await;
        let mut players: Vec<PlayerId> = board
            .tokens
            .get(slot)
            .map(|tokens| tokens.iter().copied().collect())
            .unwrap_or_default();
        players.sort_unstable();
        players
    }

    /// The player's candidate set, in selection order
    pub async fn selection(&self, player: PlayerId) -> Vec<Slot> {
        self.board.read().await.selection(player)
    }

    /// The player's candidate set with the cards under it, if the set is
    /// exactly full.
    pub async fn full_selection(&self, player: PlayerId) -> Option<Vec<(Slot, Card)>> {
        let board = self.board.read().await;
        let selection = board.selection(player);
        if selection.len() != self.feature_size {
            return None;
        }
        selection
            .into_iter()
            .map(|slot| board.card_at(slot).map(|card| (slot, card)))
            .collect()
    }

    /// Whether the board holds at least one legal set
    pub async fn has_set(&self) -> bool {
        let cards = self.cards().await;
        !self.oracle.find_sets(&cards, 1).is_empty()
    }

    /// Logs every legal set on the board and returns their slots.
    pub async fn hints(&self) -> Vec<Vec<Slot>> {
        let board = self.board.read().await;
        let cards = board.cards();
        self.oracle
            .find_sets(&cards, usize::MAX)
            .into_iter()
            .map(|set| {
                let mut slots: Vec<Slot> = set.iter().filter_map(|&c| board.slot_of(c)).collect();
                slots.sort_unstable();
                let features: Vec<Vec<usize>> =
                    set.iter().map(|&c| self.oracle.features(c)).collect();
                log::info!("Hint: set found: slots {:?} features {:?}", slots, features);
                slots
            })
            .collect()
    }
}
