//! Error types for noy-boundary.
//!
//! Vote submission and result calculation never fail; invalid input there is
//! signalled with `None`. These errors cover parsing identifiers and decoding
//! share links.

use thiserror::Error;

use crate::boundary::{Boundary, Layer};

/// Result type for noy-boundary operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when parsing boundary-engine identifiers.
#[derive(Debug, Error)]
pub enum Error {
    /// Not one of the four layer names
    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    /// Not one of the sixteen boundary names
    #[error("unknown boundary: {0}")]
    UnknownBoundary(String),

    /// Not one of the five canonical slider positions
    #[error("invalid slider value: {0} (expected 0, 25, 50, 75 or 100)")]
    InvalidSliderValue(u32),

    /// Share link could not be decoded
    #[error(transparent)]
    Share(#[from] ShareError),
}

/// Errors decoding a share link back into a quiz record.
#[derive(Debug, Error)]
pub enum ShareError {
    /// A required parameter is missing or empty.
    #[error("share link is missing {0}")]
    MissingField(&'static str),

    /// A layer's votes parameter is not a JSON tally.
    #[error("invalid votes for layer {layer}: {source}")]
    InvalidVotes {
        layer: Layer,
        #[source]
        source: serde_json::Error,
    },

    /// A layer's winner has no votes in that layer's tally.
    #[error("winning boundary {winner} for layer {layer} has no votes")]
    WinnerWithoutVotes { layer: Layer, winner: Boundary },

    /// A layer's winner is not a known boundary.
    #[error("unknown winning boundary for layer {layer}: {name}")]
    UnknownBoundary { layer: Layer, name: String },
}
