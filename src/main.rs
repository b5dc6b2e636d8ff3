mod board;
mod clock;
mod config;
mod error;
mod game;
mod input;
mod render;
mod snake;
mod term;
#[cfg(test)]
mod test_support;
mod vector;

use std::fs::File;

use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::config::{Settings, LOG_FILE};
use crate::input::CrosstermKeys;
use crate::term::{TermManager, Terminal};

fn main() -> error::Result<()> {
    // The terminal belongs to the game, so logs go to a file
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(LOG_FILE) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("snake starting up");

    let mut term = TermManager::new();
    term.setup()?;

    let game = game::SnakeGame::new(term, Settings::default());
    let res = game.run(CrosstermKeys::new());

    // Put the terminal back even if the game loop failed
    let mut term = match res {
        Ok(term) => term,
        Err(e) => {
            log::error!("game loop failed: {}", e);
            let mut term = TermManager::new();
            term.restore()?;
            return Err(e);
        }
    };
    term.clear()?;
    term.restore()?;

    log::info!("snake shut down");
    println!("Program terminated.");
    Ok(())
}
