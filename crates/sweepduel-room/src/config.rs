use serde::{Deserialize, Serialize};
use sweepduel_board::BoardConfig;

use crate::RoomError;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room a registry creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Players required before the game starts. The session is created the
    /// moment the roster reaches exactly this many.
    pub activation_threshold: usize,

    /// Maximum players allowed in the room.
    pub max_players: usize,

    /// The board each game in the room is played on.
    pub board: BoardConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 2,
            max_players: 2,
            board: BoardConfig::default(),
        }
    }
}

impl RoomConfig {
    /// Checks the settings can produce a game at all.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] if the threshold is zero or above
    /// `max_players`, or [`RoomError::Board`] if the board is unusable.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.activation_threshold == 0 {
            return Err(RoomError::InvalidConfig(
                "activation threshold must be at least 1".into(),
            ));
        }
        if self.activation_threshold > self.max_players {
            return Err(RoomError::InvalidConfig(format!(
                "activation threshold {} exceeds max players {}",
                self.activation_threshold, self.max_players
            )));
        }
        self.board.validate()?;
        Ok(())
    }
}
