//! Unified error type for Sweepduel.

use sweepduel_protocol::ProtocolError;
use sweepduel_room::RoomError;
use sweepduel_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SweepduelError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, invalid state), including a
    /// room configuration that cannot be played.
    #[error(transparent)]
    Room(#[from] RoomError),
}
