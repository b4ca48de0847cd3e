use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    /// The window was destroyed with an error attached.
    #[error("presentation failure: {0}")]
    Presentation(String),

    #[error("terminal error: {0}")]
    Terminal(#[from] crossterm::ErrorKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GameResult<T> = Result<T, GameError>;
