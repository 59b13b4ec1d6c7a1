//! Transport layer for WayCrate.
//!
//! Provides the [`Connection`] trait that the session controller talks
//! through, the length-prefixed framing used on the broker socket
//! ([`encode_frame`], [`FrameDecoder`]), and a Unix stream implementation.
//!
//! # Feature Flags
//!
//! - `unix` (default): broker connection over a Unix domain socket

#![allow(async_fn_in_trait)]

mod error;
mod frame;
#[cfg(feature = "unix")]
mod unix;

pub use error::TransportError;
pub use frame::{encode_frame, FrameDecoder, HEADER_LEN, MAX_FRAME_LEN};
#[cfg(feature = "unix")]
pub use unix::UnixConnection;

use std::fmt;

/// Process-local number of a broker connection, used to tell
/// connections apart in logs after a greeter restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "broker#{}", self.0)
    }
}

/// A duplex, message-oriented connection to the broker.
///
/// Implementations deliver whole payloads only: `send` writes one frame
/// atomically and `recv` never returns part of a frame.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one payload to the remote peer as a single frame.
    async fn send(&self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next complete payload from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
