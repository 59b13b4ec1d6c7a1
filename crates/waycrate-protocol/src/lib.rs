//! Wire protocol for WayCrate.
//!
//! This crate defines the messages exchanged with the login broker:
//!
//! - **Types** ([`Request`], [`Response`], [`AuthMessageType`],
//!   [`AuthReply`]): the JSON objects carried inside each frame.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → Protocol (Request/Response) → Session (state machine)
//! ```
//!
//! The protocol has no request ids. The broker answers each request with
//! exactly one response, and the caller is expected to keep a single request
//! in flight.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{AuthMessageType, AuthReply, Request, Response};
