//! Game session for Sweepduel.
//!
//! A [`GameSession`] owns one board and everything that changes while it
//! is played: who has revealed what, who is still in play, and who has
//! already received a result.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)     ← owns at most one session per room, serializes clicks
//!     ↕
//! Session Layer (this crate)  ← resolves clicks, decides win/lose
//!     ↕
//! Board Layer (below)    ← immutable mines + flood fill
//! ```
//!
//! The session is plain synchronous data. It does no locking of its own;
//! exclusivity comes from the room actor that owns it.

mod error;
mod session;
mod state;

pub use error::SessionError;
pub use session::{ClickOutcome, GameSession, PlayerResult};
pub use state::SessionState;
