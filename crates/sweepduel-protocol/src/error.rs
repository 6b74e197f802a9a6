//! Error types for the protocol layer.
//!
//! Each crate in Sweepduel defines its own error enum. When you see a
//! `ProtocolError`, the problem is in turning records into bytes or back,
//! never in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// This is the "malformed message" case: invalid JSON, an unknown
    /// `type` tag, missing fields, or fields of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
