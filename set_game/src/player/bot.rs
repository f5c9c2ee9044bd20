//! Automated key presses for computer seats.

use super::actor::PlayerHandle;
use crate::game::entities::Slot;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;
use tokio::sync::watch;

/// Minimum pause after a dropped press, so a frozen bot does not spin.
const DROPPED_BACKOFF: Duration = Duration::from_millis(10);

/// Feeds uniformly random slot presses to one player until stopped.
pub struct ComputerInput {
    player: PlayerHandle,
    rng: StdRng,
    table_size: usize,
    press_delay: Duration,
    stop: watch::Receiver<bool>,
}

impl ComputerInput {
    /// Create a generator. With a seed, each seat gets its own
    /// reproducible stream.
    pub fn new(
        player: PlayerHandle,
        table_size: usize,
        press_delay: Duration,
        seed: Option<u64>,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ (player.id() as u64 + 1)),
            None => StdRng::from_os_rng(),
        };
        Self {
            player,
            rng,
            table_size,
            press_delay,
            stop,
        }
    }

    fn next_slot(&mut self) -> Slot {
        self.rng.random_range(0..self.table_size)
    }

    /// Sleep, waking early on stop. Returns false if stopped.
    async fn pause(&mut self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.stop.changed() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    pub async fn run(mut self) {
        log::debug!("Computer input for player {} starting", self.player.id());

        while !*self.stop.borrow() {
            let slot = self.next_slot();
            let accepted = tokio::select! {
                biased;
                _ = self.stop.changed() => break,
                accepted = self.player.submit_selection(slot) => accepted,
            };

            let keep_going = if !accepted {
                self.pause(self.press_delay.max(DROPPED_BACKOFF)).await
            } else if self.press_delay.is_zero() {
                tokio::task::yield_now().await;
                true
            } else {
                self.pause(self.press_delay).await
            };
            if !keep_going {
                break;
            }
        }

        log::debug!("Computer input for player {} stopped", self.player.id());
    }
}
