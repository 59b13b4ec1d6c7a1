//! Unified error type for the WayCrate greeter.

use std::path::PathBuf;

use waycrate_protocol::ProtocolError;
use waycrate_session::SessionError;
use waycrate_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GreeterError {
    /// A transport-level error. The greeter records connect failures this
    /// way (see [`Greeter::connect_error`](crate::Greeter::connect_error)).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode). The greeter never builds
    /// this itself; it is a `?` target for callers that use the codec
    /// directly.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (broker rejection, bad state, lost link).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The preferences file exists but could not be read or parsed.
    #[error("preferences at {}: {source}", path.display())]
    Preferences {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The login manager refused or could not be reached.
    #[cfg(feature = "logind")]
    #[error("power off failed: {0}")]
    Power(#[from] zbus::Error),

    /// Built without the `logind` feature.
    #[error("power actions are not supported in this build")]
    PowerUnsupported,

    /// The lock surface could not be released.
    #[error("unlock failed: {0}")]
    Unlock(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let greeter_err: GreeterError = err.into();
        assert!(matches!(greeter_err, GreeterError::Transport(_)));
        assert!(greeter_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_session_error_keeps_user_facing_text() {
        let err = SessionError::BrokerError {
            error_type: "auth".into(),
            description: "bad password".into(),
        };
        let greeter_err: GreeterError = err.into();
        assert_eq!(greeter_err.to_string(), "auth: bad password");
    }
}
