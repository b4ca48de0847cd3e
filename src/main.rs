mod config;
mod engine;
mod error;
mod game;
mod input;
mod snake;
mod sync;
mod term;
mod window;

use std::env;
use std::fs::File;
use std::process::exit;

use anyhow::{Context, Result};
use log::{error, info, LevelFilter};
use simplelog::{Config, WriteLogger};

use crate::config::{GameConfig, LOG_ENV_VAR};
use crate::error::GameResult;
use crate::game::{Exit, SnakeGame};
use crate::term::TermWindow;

fn main() {
    // stdout belongs to the game, so logs only go to a file when asked for
    if let Err(e) = init_logging() {
        eprintln!("{:#}", e);
    }

    if let Err(e) = run() {
        error!("fatal: {:#}", e);
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

fn init_logging() -> Result<()> {
    if let Some(path) = env::var_os(LOG_ENV_VAR) {
        let file = File::create(&path).with_context(|| format!("cannot create log file {:?}", path))?;
        WriteLogger::init(LevelFilter::Debug, Config::default(), file).context("cannot install logger")?;
    }
    Ok(())
}

fn run() -> Result<()> {
    let game = SnakeGame::new(GameConfig::default());
    info!("starting snake");

    let mut window = TermWindow::open(game.cancel_token()).context("failed to set up terminal")?;
    let invalidator = window.invalidator();

    let result = game.run(&mut window, invalidator);

    // Give the terminal back before reporting anything.
    let restored = window.restore();

    let exit = settle(result, restored)?;
    info!("exiting: {:?}, score {}", exit, game.state().snapshot().body.len());
    Ok(())
}

/// The render loop's error takes precedence over a failed terminal restore.
fn settle(result: GameResult<Exit>, restored: GameResult<()>) -> Result<Exit> {
    match (result, restored) {
        (Err(e), Err(restore_err)) => {
            error!("failed to restore terminal: {}", restore_err);
            Err(e.into())
        }
        (Err(e), Ok(())) => Err(e.into()),
        (Ok(_), Err(restore_err)) => Err(anyhow::Error::new(restore_err).context("failed to restore terminal")),
        (Ok(exit), Ok(())) => Ok(exit),
    }
}
