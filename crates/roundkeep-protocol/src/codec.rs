//! Codec trait and implementations for request and response bodies.
//!
//! The HTTP handlers never call `serde_json` directly. They go through a
//! [`Codec`], so body parsing errors surface as [`ProtocolError`] and the
//! handlers stay independent of the body format.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec lives in the shared server
/// state and is used from every request task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidMessage` for an empty body and
    /// `ProtocolError::Decode` if the bytes are malformed or don't match
    /// the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// The `Content-Type` this codec produces.
    fn content_type(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use roundkeep_protocol::{Codec, JsonCodec, Layout};
///
/// let codec = JsonCodec;
/// let layout = Layout {
///     open_exits: vec![0, 2],
///     monster_spawn: 1,
///     child_spawn: 0,
/// };
///
/// let bytes = codec.encode(&layout).unwrap();
/// let decoded: Layout = codec.decode(&bytes).unwrap();
/// assert_eq!(layout, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(ProtocolError::InvalidMessage(
                "request body is empty".into(),
            ));
        }
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LayoutRequest, PlayerState};

    #[test]
    fn test_decode_empty_body_returns_invalid_message() {
        let result: Result<PlayerState, _> = JsonCodec.decode(b"  \n");
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<PlayerState, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_layout_request_missing_field_returns_decode_error() {
        let result: Result<LayoutRequest, _> =
            JsonCodec.decode(br#"{"numExits": 5, "numOpenExits": 2}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_scalar_payload_is_accepted() {
        let state: PlayerState = JsonCodec.decode(b"\"hiding\"").unwrap();
        assert_eq!(state, PlayerState::Other(serde_json::json!("hiding")));
    }

    #[test]
    fn test_content_type_is_json() {
        assert_eq!(JsonCodec.content_type(), "application/json");
    }
}
