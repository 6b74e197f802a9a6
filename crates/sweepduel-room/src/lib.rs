//! Room lifecycle management for Sweepduel.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! roster of connected players and, once enough have joined, one
//! [`GameSession`](sweepduel_session::GameSession).
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms on first join, discards them when empty
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomConfig`]: activation threshold, player limit, board settings
//! - [`PlayerSender`]: the channel a room uses to reach one player

mod config;
mod error;
mod registry;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{PlayerSender, RoomHandle, RoomInfo};
