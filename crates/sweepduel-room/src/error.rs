//! Error types for the room layer.

use sweepduel_board::BoardError;
use sweepduel_protocol::{PlayerId, Rejection, RoomId};
use sweepduel_session::SessionState;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is full. No more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is not (or no longer) in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The room's game has already started or ended.
    #[error("room {0} is {1}, not accepting players")]
    InvalidState(RoomId, SessionState),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// The room settings can never produce a game.
    #[error("invalid room config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Board(#[from] BoardError),
}

impl RoomError {
    /// What to tell a client whose join was refused, if anything.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::RoomFull(_) => Some(Rejection::RoomFull),
            Self::InvalidState(_, SessionState::Finished) => {
                Some(Rejection::GameOver)
            }
            Self::InvalidState(..) => Some(Rejection::RoomFull),
            _ => None,
        }
    }
}
