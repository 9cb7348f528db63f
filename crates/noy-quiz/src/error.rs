//! Error types for noy-quiz.

use noy_boundary::Layer;
use thiserror::Error;

/// Result type for noy-quiz operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving quizzes.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Boundary engine error (bad identifiers, bad share links)
    #[error(transparent)]
    Boundary(#[from] noy_boundary::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<noy_boundary::ShareError> for Error {
    fn from(e: noy_boundary::ShareError) -> Self {
        Error::Boundary(e.into())
    }
}

/// Errors in the quiz session flow.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session with this id
    #[error("session not found: {0}")]
    NotFound(String),

    /// Question belongs to a layer other than the one being answered
    #[error("question {question_id} is not part of the current layer ({current})")]
    WrongLayer { question_id: u32, current: Layer },

    /// Every layer has been completed
    #[error("quiz already finished")]
    Finished,

    /// The quiz has no record yet
    #[error("quiz not finished yet")]
    NotFinished,

    /// Session store is at capacity
    #[error("session store full ({capacity} sessions)")]
    StoreFull { capacity: usize },
}
