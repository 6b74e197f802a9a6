//! Session lifecycle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The lifecycle state of a game.
///
/// Transitions are strictly ordered, no skipping states:
///
/// ```text
/// WaitingForPlayers → InProgress → Finished
/// ```
///
/// - **WaitingForPlayers**: the room exists but has fewer players than the
///   activation threshold. No board has been generated yet.
/// - **InProgress**: the board exists and clicks are resolved.
/// - **Finished**: someone hit a mine or revealed every safe cell. Results
///   have been decided; further clicks are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    WaitingForPlayers,
    InProgress,
    Finished,
}

impl SessionState {
    /// Returns `true` if new players may still join.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::WaitingForPlayers)
    }

    /// Returns `true` if clicks are being resolved.
    pub fn is_active(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// The state that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::WaitingForPlayers => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WaitingForPlayers"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
