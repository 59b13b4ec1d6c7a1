//! Session types: launch configuration, login status, and the snapshot
//! published to the presentation layer.

use std::fmt;

// ---------------------------------------------------------------------------
// LaunchConfig
// ---------------------------------------------------------------------------

/// What to run once the user is authenticated.
///
/// Supplied by the presentation layer; read when `start_session` is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchConfig {
    /// The session command line, e.g. `"sway --unsupported-gpu"`.
    pub command: String,

    /// Environment entries in `KEY=VALUE` form, in order.
    pub env: Vec<String>,
}

impl LaunchConfig {
    /// Creates a launch config for `command` with an empty environment.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: Vec::new(),
        }
    }

    /// Replaces the environment entries.
    pub fn env<I, S>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env = env.into_iter().map(Into::into).collect();
        self
    }

    /// Splits the command on single spaces.
    ///
    /// No quoting or escaping is understood, and consecutive spaces yield
    /// empty arguments. The broker receives exactly these tokens.
    pub fn argv(&self) -> Vec<String> {
        self.command.split(' ').map(str::to_owned).collect()
    }
}

// ---------------------------------------------------------------------------
// LoginStatus
// ---------------------------------------------------------------------------

/// Where a login attempt stands.
///
/// ```text
///                 secret prompt            success              success
///   Start ───────────────────────→ TryToLoginSession ──→ TryToStartSession ──→ LoginSucceeded
///     │                                   │                     │
///     └──────────── error (any state) ────┴─────────────────────┘
///                         │
///                         ▼           success
///                      Errored ─────────────────→ CancelSessionSucceeded
/// ```
///
/// `ConnectionUnavailable` and `ConnectionLost` sit outside the table:
/// once entered, nothing leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoginStatus {
    /// Nothing sent yet, or a cancelled attempt was re-armed.
    #[default]
    Start,
    /// The secret has been posted; waiting for the broker's verdict.
    TryToLoginSession,
    /// Authentication passed; `start_session` has been sent.
    TryToStartSession,
    /// The broker accepted `start_session`. Terminal.
    LoginSucceeded,
    /// The broker reported an error; `cancel_session` has been sent.
    Errored,
    /// The broker acknowledged the cancellation.
    CancelSessionSucceeded,
    /// No broker connection could be made at construction. Terminal.
    ConnectionUnavailable,
    /// The connection broke or carried garbage. Terminal.
    ConnectionLost,
}

impl LoginStatus {
    /// Returns `true` if no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::LoginSucceeded | Self::ConnectionUnavailable | Self::ConnectionLost
        )
    }

    /// Returns `true` if the broker connection is gone for good.
    pub fn is_disconnected(self) -> bool {
        matches!(self, Self::ConnectionUnavailable | Self::ConnectionLost)
    }
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "Start",
            Self::TryToLoginSession => "TryToLoginSession",
            Self::TryToStartSession => "TryToStartSession",
            Self::LoginSucceeded => "LoginSucceeded",
            Self::Errored => "Errored",
            Self::CancelSessionSucceeded => "CancelSessionSucceeded",
            Self::ConnectionUnavailable => "ConnectionUnavailable",
            Self::ConnectionLost => "ConnectionLost",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// The observable state of a controller, as seen by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The user being logged in.
    pub username: String,
    /// The last error to show, if any.
    pub error_message: Option<String>,
    /// `true` between a secret prompt and the broker's verdict.
    pub is_authing: bool,
    /// Current state-machine position.
    pub status: LoginStatus,
}
