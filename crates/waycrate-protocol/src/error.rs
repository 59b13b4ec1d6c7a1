//! Error types for the protocol layer.
//!
//! Each crate in WayCrate defines its own error enum. A `ProtocolError`
//! always means the bytes were fine as a frame but not as a message.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a request into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a response).
    ///
    /// Common causes: malformed JSON, an unknown `type` tag, or a field
    /// with the wrong JSON type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
