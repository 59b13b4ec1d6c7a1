//! Error types for the session layer.

use waycrate_protocol::ProtocolError;

use crate::LoginStatus;

/// Errors that can occur while driving a login session.
///
/// The `Display` text of each variant is what the greeter shows the user,
/// so the wording is deliberately short.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No broker socket could be resolved or connected at construction.
    /// The controller stays inert for its whole life.
    #[error("Cannot connect to greetd")]
    ConnectionUnavailable,

    /// An empty secret was submitted. Nothing was sent to the broker.
    #[error("password is needed")]
    MissingCredential,

    /// The broker rejected the attempt. A `cancel_session` has already
    /// been sent on the caller's behalf.
    #[error("{error_type}: {description}")]
    BrokerError {
        error_type: String,
        description: String,
    },

    /// A frame arrived whose payload is not a valid broker response.
    /// Treated as a broken connection.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[source] ProtocolError),

    /// A request could not be serialized.
    #[error("cannot encode request: {0}")]
    Encode(#[source] ProtocolError),

    /// The connection failed or closed after construction.
    #[error("connection to greetd lost: {0}")]
    ConnectionLost(String),

    /// The operation is not allowed in the current state.
    #[error("cannot {action} while {status}")]
    InvalidState {
        action: &'static str,
        status: LoginStatus,
    },

    /// A request is still waiting for its reply. The broker protocol has
    /// no request ids, so a second request would make replies ambiguous.
    #[error("a {pending} request is still awaiting its reply")]
    RequestInFlight { pending: &'static str },
}

impl SessionError {
    /// Returns `true` if the controller can never make progress again
    /// after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionUnavailable | Self::MalformedFrame(_) | Self::ConnectionLost(_)
        )
    }
}
