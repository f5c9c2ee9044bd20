//! Dealer message types.

use crate::game::entities::{PlayerId, Resolution};
use tokio::sync::{mpsc, oneshot};

/// A player's full candidate set waiting for a decision. The dealer reads
/// the slots from the table when it dequeues the request, not when the
/// request is sent.
#[derive(Debug)]
pub struct ValidationRequest {
    /// Player that completed a candidate set
    pub player: PlayerId,

    /// Answered exactly once with the outcome
    pub reply: oneshot::Sender<Resolution>,
}

/// Sending side of the dealer's validation queue
pub type ValidationSender = mpsc::UnboundedSender<ValidationRequest>;

/// Receiving side of the dealer's validation queue
pub type ValidationReceiver = mpsc::UnboundedReceiver<ValidationRequest>;
