//! The dealer: round lifecycle, deck, and set validation.

pub mod actor;
pub mod messages;

pub use actor::{Dealer, DealerHandle, winners};
pub use messages::{ValidationReceiver, ValidationRequest, ValidationSender};
