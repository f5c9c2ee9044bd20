use serde::{Deserialize, Serialize};
use std::fmt;

/// Card identifier. Cards are numbered `0..deck_size`; their features are
/// only meaningful to a [`SetOracle`](super::oracle::SetOracle).
pub type Card = usize;

/// Board position in `0..table_size`.
pub type Slot = usize;

/// Seat index, starting from 0.
pub type PlayerId = usize;

/// Outcome of a candidate set submitted to the dealer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Resolution {
    /// The set was legal: one point and a short freeze.
    Point,
    /// The set was illegal: no point and a longer freeze.
    Penalty,
    /// The set shrank before the dealer got to it. Nothing happens.
    Cancel,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Point => "point",
            Self::Penalty => "penalty",
            Self::Cancel => "cancel",
        };
        write!(f, "{repr}")
    }
}

/// Player state machine phases.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[repr(u8)]
pub enum PlayerState {
    /// Waiting for the next selection event.
    Idle = 0,
    /// Toggling a token for one event.
    Selecting = 1,
    /// Candidate set submitted, waiting for the dealer.
    AwaitingValidation = 2,
    /// Cooling down after a point or penalty.
    Frozen = 3,
    /// Stopped for good.
    Terminated = 4,
}

impl PlayerState {
    /// Whether new selection events are accepted in this state.
    pub fn accepts_input(self) -> bool {
        matches!(self, Self::Idle | Self::Selecting)
    }
}

impl From<u8> for PlayerState {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Selecting,
            2 => Self::AwaitingValidation,
            3 => Self::Frozen,
            _ => Self::Terminated,
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Idle => "idle",
            Self::Selecting => "selecting",
            Self::AwaitingValidation => "awaiting validation",
            Self::Frozen => "frozen",
            Self::Terminated => "terminated",
        };
        write!(f, "{repr}")
    }
}

/// Result of toggling a token on the board.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Toggle {
    /// A token was placed; carries the new candidate set length.
    Placed(usize),
    /// The player's token was taken back.
    Removed,
    /// Nothing changed: the table is locked, the slot is empty, or the
    /// candidate set is already full.
    Ignored,
}
