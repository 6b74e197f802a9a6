//! Wire protocol for Sweepduel.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`RevealedCell`], …):
//!   the records that travel on the wire as UTF-8 JSON.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those records are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (raw frames) and the room
//! layer (game rules). It knows nothing about sockets or boards.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room (session state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, GameMessage, LobbyEvent, Outcome, PlayerId, Rejection,
    RevealedCell, RoomId, ServerMessage,
};
