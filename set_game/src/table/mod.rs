//! The shared table: slot/card mapping, player tokens, and candidate sets.
//!
//! The dealer is the only writer of cards. Players only toggle their own
//! tokens. Removing a card silently strips the tokens on its slot, which is
//! how a successful set or a reshuffle invalidates other players' pending
//! selections.

pub mod board;

pub use board::Table;
