//! Error types for the protocol layer.
//!
//! Each Roundkeep crate defines its own error enum. A `ProtocolError` always
//! means the bytes on the wire were the problem, never the game state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a body that isn't JSON at all, or a layout request
    /// with a missing or non-integer field.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The body parsed, but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
