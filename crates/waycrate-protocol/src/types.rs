//! Broker message types.
//!
//! Every message is a flat JSON object whose `type` field says what it is.
//! `#[serde(tag = "type", rename_all = "snake_case")]` gives exactly that
//! shape, so a variant can never be sent without its tag or with two.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// AuthMessageType
// ---------------------------------------------------------------------------

/// The kind of prompt carried by an `auth_message` response.
///
/// Only [`Secret`](Self::Secret) changes how the client answers; every
/// other kind is acknowledged without a response value. Unknown strings are
/// kept in [`Other`](Self::Other) rather than rejected, so a broker that
/// grows a new prompt kind does not break the stream. A missing kind
/// defaults to `Other("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthMessageType {
    /// A prompt whose answer may be echoed (e.g. a username).
    Visible,
    /// A prompt whose answer is a secret (e.g. a password).
    Secret,
    /// Informational text.
    Info,
    /// An error message from the authentication stack.
    Error,
    /// Anything else.
    Other(String),
}

impl AuthMessageType {
    /// Returns the wire name of this prompt kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Visible => "visible",
            Self::Secret => "secret",
            Self::Info => "info",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` for a secret challenge.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret)
    }
}

impl Default for AuthMessageType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for AuthMessageType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "visible" => Self::Visible,
            "secret" => Self::Secret,
            "info" => Self::Info,
            "error" => Self::Error,
            _ => Self::Other(s),
        }
    }
}

impl From<AuthMessageType> for String {
    fn from(kind: AuthMessageType) -> Self {
        match kind {
            AuthMessageType::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AuthMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuthReply
// ---------------------------------------------------------------------------

/// The `response` field of a `post_auth_message_response` request.
///
/// Three wire shapes exist, and they mean different things to the broker:
///
/// | Value | JSON |
/// |---|---|
/// | `Acknowledge` | field omitted |
/// | `Secret(None)` | `"response": null` |
/// | `Secret(Some(s))` | `"response": "s"` |
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum AuthReply {
    /// Acknowledge a non-secret prompt.
    #[default]
    Acknowledge,
    /// Answer a secret prompt, with `None` if no secret has been supplied.
    Secret(Option<String>),
}

impl AuthReply {
    /// Returns `true` if the `response` field should be left out.
    pub fn is_acknowledge(&self) -> bool {
        matches!(self, Self::Acknowledge)
    }
}

impl fmt::Debug for AuthReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acknowledge => f.write_str("Acknowledge"),
            Self::Secret(None) => f.write_str("Secret(None)"),
            Self::Secret(Some(_)) => f.write_str("Secret(<redacted>)"),
        }
    }
}

impl Serialize for AuthReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Acknowledge | Self::Secret(None) => serializer.serialize_none(),
            Self::Secret(Some(secret)) => serializer.serialize_some(secret),
        }
    }
}

impl<'de> Deserialize<'de> for AuthReply {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A present field is always a secret answer; a missing one falls
        // back to `Default` (acknowledge) through `#[serde(default)]`.
        Option::<String>::deserialize(deserializer).map(Self::Secret)
    }
}

// ---------------------------------------------------------------------------
// Request: client to broker
// ---------------------------------------------------------------------------

/// A message sent to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Start configuring a session for `username`.
    CreateSession { username: String },

    /// Answer the broker's latest `auth_message`.
    PostAuthMessageResponse {
        #[serde(default, skip_serializing_if = "AuthReply::is_acknowledge")]
        response: AuthReply,
    },

    /// Start the authenticated session with this command line and
    /// environment (`KEY=VALUE` entries).
    StartSession { cmd: Vec<String>, env: Vec<String> },

    /// Abandon the session being configured.
    CancelSession,
}

impl Request {
    /// Returns the wire `type` of this request, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateSession { .. } => "create_session",
            Self::PostAuthMessageResponse { .. } => "post_auth_message_response",
            Self::StartSession { .. } => "start_session",
            Self::CancelSession => "cancel_session",
        }
    }
}

// ---------------------------------------------------------------------------
// Response: broker to client
// ---------------------------------------------------------------------------

/// A message received from the broker.
///
/// Responses carry no correlation id. Which request a `Success` answers is
/// known only from the state of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The broker needs an answer to a prompt before it can continue.
    AuthMessage {
        #[serde(default)]
        auth_message_type: AuthMessageType,
        #[serde(default)]
        auth_message: String,
    },

    /// The last request failed.
    Error {
        #[serde(default)]
        error_type: String,
        #[serde(default)]
        description: String,
    },

    /// The last request succeeded.
    Success,
}

impl Response {
    /// Returns the wire `type` of this response, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthMessage { .. } => "auth_message",
            Self::Error { .. } => "error",
            Self::Success => "success",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! JSON shape tests. The broker is strict about field names and about
    //! `response` being absent vs `null`, so shapes are asserted exactly.

    use super::*;

    fn to_json(req: &Request) -> String {
        serde_json::to_string(req).unwrap()
    }

    // =====================================================================
    // Request
    // =====================================================================

    #[test]
    fn test_create_session_json_format() {
        let req = Request::CreateSession {
            username: "alice".into(),
        };
        assert_eq!(
            to_json(&req),
            r#"{"type":"create_session","username":"alice"}"#
        );
    }

    #[test]
    fn test_post_auth_acknowledge_omits_response() {
        let req = Request::PostAuthMessageResponse {
            response: AuthReply::Acknowledge,
        };
        assert_eq!(to_json(&req), r#"{"type":"post_auth_message_response"}"#);
    }

    #[test]
    fn test_post_auth_secret_carries_response() {
        let req = Request::PostAuthMessageResponse {
            response: AuthReply::Secret(Some("pw".into())),
        };
        assert_eq!(
            to_json(&req),
            r#"{"type":"post_auth_message_response","response":"pw"}"#
        );
    }

    #[test]
    fn test_post_auth_secret_without_credential_is_null() {
        let req = Request::PostAuthMessageResponse {
            response: AuthReply::Secret(None),
        };
        assert_eq!(
            to_json(&req),
            r#"{"type":"post_auth_message_response","response":null}"#
        );
    }

    #[test]
    fn test_post_auth_parses_back_into_all_three_shapes() {
        let parse = |s: &str| -> Request { serde_json::from_str(s).unwrap() };

        assert_eq!(
            parse(r#"{"type":"post_auth_message_response"}"#),
            Request::PostAuthMessageResponse {
                response: AuthReply::Acknowledge
            }
        );
        assert_eq!(
            parse(r#"{"type":"post_auth_message_response","response":null}"#),
            Request::PostAuthMessageResponse {
                response: AuthReply::Secret(None)
            }
        );
        assert_eq!(
            parse(r#"{"type":"post_auth_message_response","response":"pw"}"#),
            Request::PostAuthMessageResponse {
                response: AuthReply::Secret(Some("pw".into()))
            }
        );
    }

    #[test]
    fn test_start_session_json_format() {
        let req = Request::StartSession {
            cmd: vec!["/bin/sh".into(), "-c".into(), "start".into()],
            env: vec!["XDG_SESSION_TYPE=wayland".into()],
        };
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "start_session");
        assert_eq!(json["cmd"], serde_json::json!(["/bin/sh", "-c", "start"]));
        assert_eq!(json["env"], serde_json::json!(["XDG_SESSION_TYPE=wayland"]));
    }

    #[test]
    fn test_cancel_session_json_format() {
        assert_eq!(to_json(&Request::CancelSession), r#"{"type":"cancel_session"}"#);
    }

    #[test]
    fn test_request_debug_redacts_secret() {
        let req = Request::PostAuthMessageResponse {
            response: AuthReply::Secret(Some("hunter2".into())),
        };
        let dbg = format!("{req:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn test_request_kind_matches_wire_tag() {
        for req in [
            Request::CreateSession {
                username: "a".into(),
            },
            Request::PostAuthMessageResponse {
                response: AuthReply::Acknowledge,
            },
            Request::StartSession {
                cmd: vec![],
                env: vec![],
            },
            Request::CancelSession,
        ] {
            let json: serde_json::Value = serde_json::to_value(&req).unwrap();
            assert_eq!(json["type"], req.kind());
        }
    }

    // =====================================================================
    // Response
    // =====================================================================

    #[test]
    fn test_response_success() {
        let resp: Response = serde_json::from_str(r#"{"type":"success"}"#).unwrap();
        assert_eq!(resp, Response::Success);
    }

    #[test]
    fn test_response_error_fields() {
        let resp: Response = serde_json::from_str(
            r#"{"type":"error","error_type":"auth","description":"bad password"}"#,
        )
        .unwrap();
        assert_eq!(
            resp,
            Response::Error {
                error_type: "auth".into(),
                description: "bad password".into(),
            }
        );
    }

    #[test]
    fn test_response_error_missing_fields_default_to_empty() {
        let resp: Response = serde_json::from_str(r#"{"type":"error"}"#).unwrap();
        assert_eq!(
            resp,
            Response::Error {
                error_type: String::new(),
                description: String::new(),
            }
        );
    }

    #[test]
    fn test_response_auth_message_unknown_kind_is_preserved() {
        let resp: Response = serde_json::from_str(
            r#"{"type":"auth_message","auth_message_type":"fingerprint","auth_message":"touch"}"#,
        )
        .unwrap();
        match resp {
            Response::AuthMessage {
                auth_message_type, ..
            } => {
                assert_eq!(
                    auth_message_type,
                    AuthMessageType::Other("fingerprint".into())
                );
                assert!(!auth_message_type.is_secret());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_response_auth_message_defaults_text() {
        let resp: Response =
            serde_json::from_str(r#"{"type":"auth_message","auth_message_type":"visible"}"#)
                .unwrap();
        assert_eq!(
            resp,
            Response::AuthMessage {
                auth_message_type: AuthMessageType::Visible,
                auth_message: String::new(),
            }
        );
    }

    #[test]
    fn test_response_auth_message_missing_kind_is_not_secret() {
        let resp: Response =
            serde_json::from_str(r#"{"type":"auth_message","auth_message":"Hello"}"#).unwrap();
        assert_eq!(
            resp,
            Response::AuthMessage {
                auth_message_type: AuthMessageType::Other(String::new()),
                auth_message: "Hello".into(),
            }
        );
    }

    #[test]
    fn test_auth_message_type_round_trips_through_string() {
        for name in ["visible", "secret", "info", "error", "otp"] {
            let kind = AuthMessageType::from(name.to_string());
            assert_eq!(kind.as_str(), name);
            assert_eq!(String::from(kind), name);
        }
    }

    // =====================================================================
    // Error cases: malformed input
    // =====================================================================

    #[test]
    fn test_decode_unknown_response_type_returns_error() {
        let result: Result<Response, _> = serde_json::from_str(r#"{"type":"launch_rockets"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_type_returns_error() {
        let result: Result<Response, _> = serde_json::from_str(r#"{"description":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_non_object_returns_error() {
        let result: Result<Response, _> = serde_json::from_str(r#""success""#);
        assert!(result.is_err());
    }
}
