//! Board generation and reveal for Sweepduel.
//!
//! This crate has no notion of players or networking. It provides:
//!
//! - [`Board`]: an immutable grid of [`Cell`]s with mines placed by a
//!   seeded uniform sample, and adjacency counts precomputed.
//! - [`reveal_from`]: the iterative flood fill that discloses a connected
//!   zero region plus its numbered border.
//! - [`BoardConfig`]: dimensions, mine count and optional seed, with
//!   validation for externally supplied values.

mod board;
mod config;
mod error;
mod reveal;

pub use board::{Board, Cell};
pub use config::{BoardConfig, MAX_CELLS};
pub use error::BoardError;
pub use reveal::{Revealed, reveal_from};
