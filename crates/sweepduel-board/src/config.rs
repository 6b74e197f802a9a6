//! Board configuration.

use serde::{Deserialize, Serialize};

use crate::{Board, BoardError};

/// Largest board, in cells, a room will generate.
pub const MAX_CELLS: usize = 1 << 20;

/// Dimensions, mine count and seed for the board a session plays on.
///
/// With `seed: None` every session draws a fresh seed; the seed actually
/// used is recorded on the [`Board`] so a game can be replayed from logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of columns.
    pub width: usize,

    /// Number of rows.
    pub height: usize,

    /// Number of mines. Must be less than `width * height`.
    pub mines: usize,

    /// Fixed seed for the mine layout, if any.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            mines: 10,
            seed: None,
        }
    }
}

impl BoardConfig {
    /// Checks that a board can be generated from this config.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.width == 0 || self.height == 0 {
            return Err(BoardError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }
        let cells = self
            .width
            .checked_mul(self.height)
            .filter(|&cells| cells <= MAX_CELLS)
            .ok_or(BoardError::TooLarge {
                width: self.width,
                height: self.height,
            })?;
        if self.mines >= cells {
            return Err(BoardError::TooManyMines {
                mines: self.mines,
                cells,
            });
        }
        Ok(())
    }

    /// Number of cells a player must reveal to win.
    pub fn safe_cells(&self) -> usize {
        self.width * self.height - self.mines
    }

    /// Generates a board from this config.
    ///
    /// # Panics
    /// If the config does not pass [`validate`](Self::validate).
    pub fn generate(&self) -> Board {
        Board::generate(self.width, self.height, self.mines, self.seed)
    }
}
