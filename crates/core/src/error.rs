//! Error taxonomy for the game core.

use thiserror::Error;

use crate::types::{GameMode, Phase};

/// Errors raised by the session state machine and its collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Zero, negative or non-finite map extents.
    #[error("invalid map metadata for '{map_id}': {reason}")]
    InvalidMapMetadata { map_id: String, reason: &'static str },

    /// Map id not present in the registry.
    #[error("unknown map '{0}'")]
    UnknownMap(String),

    /// Round source failed (network/parse). Recoverable by starting again.
    #[error("round fetch failed: {0}")]
    RoundFetchFailed(String),

    /// Operation dispatched in a phase that does not accept it.
    #[error("{operation} is not allowed while {phase:?}")]
    OrderingError {
        operation: &'static str,
        phase: Phase,
    },

    /// Source record without usable solution coordinates.
    #[error("round {index} is malformed: missing or invalid {field}")]
    MalformedRound { index: usize, field: &'static str },

    /// Location guess in a name mode, or the other way round.
    #[error("guess kind does not match mode {}", .mode.as_str())]
    GuessMismatch { mode: GameMode },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Failures the UI may recover from by re-invoking `startNewGame`.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::RoundFetchFailed(_))
    }
}

/// Failure reported by a round source; the message is surfaced verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct FetchError(pub String);

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Persistence failure of a high score backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("score storage I/O error: {0}")]
    Io(String),

    #[error("score storage is corrupt: {0}")]
    Corrupt(String),
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
