use thiserror::Error;

use crate::engine::models::Position;

/// Errors surfaced by the engine and the request codec.
///
/// `InvalidPositionFormat` and `PositionOccupied` never leave a round: the
/// session records them as a message instead. The protocol-level variants are
/// always returned to the transport layer.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("invalid position format: {0:?}")]
    InvalidPositionFormat(String),

    #[error("position {0} is already taken")]
    PositionOccupied(Position),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("malformed request: {0}")]
    MalformedRequestBody(String),

    #[error("unknown route: {0}")]
    UnknownRoute(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
