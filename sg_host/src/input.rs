//! Terminal input for human seats.

use set_game::{DealerHandle, PlayerId, Slot};
use tokio::sync::mpsc;

/// Parse a `<player> <slot>` line.
pub fn parse_press(line: &str) -> Option<(PlayerId, Slot)> {
    let mut parts = line.split_whitespace();
    let player = parts.next()?.parse().ok()?;
    let slot = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((player, slot))
}

/// Read stdin on a plain thread. Blocking reads would otherwise hold up
/// runtime shutdown.
pub fn spawn_reader() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel(64);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };
            if sender.blocking_send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

/// Forward parsed lines to human players until input ends.
pub async fn forward(mut lines: mpsc::Receiver<String>, handle: DealerHandle) {
    while let Some(line) = lines.recv().await {
        let Some((player, slot)) = parse_press(&line) else {
            log::warn!("Ignoring input {:?}: expected <player> <slot>", line);
            continue;
        };

        match handle.player(player) {
            Ok(seat) if !seat.is_human() => {
                log::warn!("Player {} is a computer", player);
            }
            Ok(seat) => {
                if !seat.submit_selection(slot).await {
                    log::debug!("Press on slot {} by player {} dropped", slot, player);
                }
            }
            Err(err) => log::warn!("{}", err),
        }
    }
}
