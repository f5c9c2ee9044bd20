//! Runs one game of Set in the terminal.
//!
//! Computer seats play on their own. Human seats are driven by stdin
//! lines of the form `<player> <slot>`. Display notifications go to the
//! log.

mod config;
mod input;

use std::{path::PathBuf, sync::Arc};

use anyhow::Error;
use config::{CliOverrides, HostConfig};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use set_game::{Game, LogUi, StandardOracle};

const HELP: &str = "\
Run a game of Set

USAGE:
  sg_host [OPTIONS]

OPTIONS:
  --config     PATH        JSON game configuration file
  --humans     N           Human seats, fed from stdin  [default: env SET_HUMAN_PLAYERS or 0]
  --computers  N           Computer seats  [default: env SET_COMPUTER_PLAYERS or 2]
  --timeout    MS          Round length in milliseconds  [default: env SET_TURN_TIMEOUT_MS or 60000]
  --seed       N           RNG seed for a reproducible game

FLAGS:
  --hints                  Log every legal set after each deal
  -h, --help               Print help information

INPUT:
  <player> <slot>          Toggle a token for a human seat, one press per line

ENVIRONMENT:
  RUST_LOG                 Log filter (e.g., info, set_game=debug)
  SET_*                    Any game setting, e.g. SET_DECK_SIZE, SET_PENALTY_FREEZE_MS
  A .env file in the working directory is loaded first
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let cli = CliOverrides {
        config_path: pargs.opt_value_from_str::<_, PathBuf>("--config")?,
        human_players: pargs.opt_value_from_str("--humans")?,
        computer_players: pargs.opt_value_from_str("--computers")?,
        turn_timeout_ms: pargs.opt_value_from_str("--timeout")?,
        seed: pargs.opt_value_from_str("--seed")?,
        hints: pargs.contains("--hints"),
    };

    env_logger::builder().format_target(false).init();

    let config = HostConfig::load(cli)?;
    if let Some(path) = &config.source {
        info!("Loaded configuration from {}", path.display());
    }
    info!(
        "Starting a game with {} human and {} computer players",
        config.game.human_players, config.game.computer_players
    );

    let oracle = StandardOracle::new(config.game.feature_size, config.game.feature_count);
    let humans = config.game.human_players;
    let mut game = Game::start(config.game, Arc::new(oracle), Arc::new(LogUi))?;

    // Catching signals for a clean shutdown.
    let handle = game.handle().clone();
    set_handler(move || {
        info!("Interrupted, ending the game");
        handle.terminate();
    })?;

    let input = (humans > 0).then(|| {
        tokio::spawn(input::forward(
            input::spawn_reader(),
            game.handle().clone(),
        ))
    });

    let winners = game.wait().await?;
    if let Some(input) = input {
        input.abort();
    }

    for (player, score) in game.handle().scores().iter().enumerate() {
        println!("Player {player}: {score}");
    }
    println!("Winners: {winners:?}");
    Ok(())
}
