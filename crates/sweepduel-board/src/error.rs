//! Error types for board configuration.

/// Errors reported when a [`BoardConfig`](crate::BoardConfig) cannot
/// produce a playable board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// One of the dimensions is zero.
    #[error("board must have at least one cell, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },

    /// The dimensions overflow or exceed [`MAX_CELLS`](crate::MAX_CELLS).
    #[error("board of {width}x{height} is too large")]
    TooLarge { width: usize, height: usize },

    /// At least one safe cell is required.
    #[error("{mines} mines do not fit on a board of {cells} cells")]
    TooManyMines { mines: usize, cells: usize },
}
