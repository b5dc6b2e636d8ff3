use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("input listener thread panicked")]
    InputThread,
}

pub type Result<T> = std::result::Result<T, Error>;
