//! Error types for the session layer.

use sweepduel_protocol::PlayerId;

use crate::SessionState;

/// Reasons a click cannot be resolved.
///
/// None of these change the session; they are reported to the clicking
/// player only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The coordinates are outside the board.
    #[error("invalid coordinates ({row}, {col})")]
    InvalidCoordinate { row: i64, col: i64 },

    /// The session is not accepting clicks.
    #[error("session is {0}, not in progress")]
    NotInProgress(SessionState),

    /// The player never joined this session or has already been
    /// eliminated or removed.
    #[error("player {0} is not in play")]
    UnknownPlayer(PlayerId),
}
