//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The controller never calls `serde_json` directly; it goes through a
//! [`Codec`]. The broker only speaks JSON today, so [`JsonCodec`] is the
//! one implementation, but tests can plug in their own.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `decode` takes `DeserializeOwned` so the result never borrows from the
/// frame buffer, which is dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the broker's wire format.
///
/// Output is compact: no whitespace, fields in declaration order.
///
/// ## Example
///
/// ```rust
/// use waycrate_protocol::{Codec, JsonCodec, Request, Response};
///
/// let codec = JsonCodec;
///
/// let bytes = codec
///     .encode(&Request::CreateSession { username: "alice".into() })
///     .unwrap();
/// assert_eq!(bytes, br#"{"type":"create_session","username":"alice"}"#);
///
/// let reply: Response = codec.decode(br#"{"type":"success"}"#).unwrap();
/// assert_eq!(reply, Response::Success);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
