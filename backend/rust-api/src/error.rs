use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Game is already complete, no riddle left to answer")]
    GameComplete,
}

#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("Score file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed score row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}
