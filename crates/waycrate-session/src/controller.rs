//! The session controller: drives one login attempt against the broker.
//!
//! The broker protocol is ping-pong. Every request gets exactly one reply,
//! and replies say only `success`, `error`, or `auth_message` without
//! naming the request they answer. The controller's [`LoginStatus`] is the
//! only thing that ties a reply to its request, so requests are strictly
//! serialized: a new one is sent only after the previous reply has been
//! handled.
//!
//! # Concurrency note
//!
//! `SessionController` is driven by one task. It owns its connection and
//! takes `&mut self` everywhere, so state and the in-flight marker are
//! never touched concurrently. Observers read state through
//! [`subscribe`](SessionController::subscribe) instead of sharing the
//! controller.

use tokio::sync::watch;
use waycrate_protocol::{AuthReply, Codec, JsonCodec, Request, Response};
use waycrate_transport::Connection;

use crate::{Credential, LaunchConfig, LoginStatus, SessionError, SessionSnapshot};

/// Drives the create → authenticate → start handshake with the broker.
///
/// ## Lifecycle
///
/// ```text
/// submit_credential() ──→ create_session ──→ auth_message(secret) ──→ post_auth_message_response
///                                                                            │
///        LoginSucceeded ←── success ←── start_session ←── success ←──────────┘
/// ```
///
/// Any `error` reply sends `cancel_session` and parks the controller in
/// `Errored` until the broker acknowledges.
pub struct SessionController<C: Connection, K: Codec = JsonCodec> {
    /// `None` when no broker was reachable, or after the connection broke.
    conn: Option<C>,
    codec: K,
    launch: LaunchConfig,
    status: LoginStatus,
    username: String,
    /// Held for one attempt only; dropped once the attempt ends.
    credential: Option<Credential>,
    error_message: Option<String>,
    broker_error: Option<(String, String)>,
    is_authing: bool,
    /// Wire `type` of the request awaiting its reply.
    pending: Option<&'static str>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<C: Connection> SessionController<C, JsonCodec> {
    /// Creates a controller that talks JSON over `conn`.
    pub fn new(conn: C, launch: LaunchConfig) -> Self {
        Self::with_codec(Some(conn), JsonCodec, launch)
    }

    /// Creates a controller with no broker connection.
    ///
    /// It starts in [`LoginStatus::ConnectionUnavailable`], reports
    /// "Cannot connect to greetd", and ignores `begin`/`submit_credential`.
    pub fn unavailable(launch: LaunchConfig) -> Self {
        Self::with_codec(None, JsonCodec, launch)
    }
}

impl<C: Connection, K: Codec> SessionController<C, K> {
    /// Creates a controller with an explicit codec.
    ///
    /// Passing `None` for `conn` builds an inert controller, as
    /// [`unavailable`](SessionController::unavailable) does.
    pub fn with_codec(conn: Option<C>, codec: K, launch: LaunchConfig) -> Self {
        let (status, error_message) = match conn {
            Some(_) => (LoginStatus::Start, None),
            None => {
                tracing::warn!("no broker connection, controller is inert");
                (
                    LoginStatus::ConnectionUnavailable,
                    Some(SessionError::ConnectionUnavailable.to_string()),
                )
            }
        };

        let snapshot = SessionSnapshot {
            username: String::new(),
            error_message: error_message.clone(),
            is_authing: false,
            status,
        };
        let (snapshot_tx, _) = watch::channel(snapshot);

        Self {
            conn,
            codec,
            launch,
            status,
            username: String::new(),
            credential: None,
            error_message,
            broker_error: None,
            is_authing: false,
            pending: None,
            snapshot_tx,
        }
    }

    // -- Observable state -------------------------------------------------

    /// Current state-machine position.
    pub fn status(&self) -> LoginStatus {
        self.status
    }

    /// The user being logged in.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The last error to show the user, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// `true` between a secret prompt and the broker's verdict on it.
    pub fn is_authing(&self) -> bool {
        self.is_authing
    }

    /// `true` while a request is waiting for its reply.
    pub fn has_pending_request(&self) -> bool {
        self.pending.is_some()
    }

    /// The launch settings used for `start_session`.
    pub fn launch(&self) -> &LaunchConfig {
        &self.launch
    }

    /// Returns a copy of the observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            username: self.username.clone(),
            error_message: self.error_message.clone(),
            is_authing: self.is_authing,
            status: self.status,
        }
    }

    /// Subscribes to snapshot updates. The receiver always holds the
    /// latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    // -- Caller configuration ---------------------------------------------

    /// Sets the user to log in without contacting the broker, e.g. to
    /// pre-fill a remembered username.
    pub fn set_username(&mut self, username: impl Into<String>) {
        let username = username.into();
        if self.username != username {
            self.username = username;
            self.publish();
        }
    }

    /// Replaces the command and environment used for `start_session`.
    pub fn set_launch(&mut self, launch: LaunchConfig) {
        self.launch = launch;
    }

    // -- Entry points -----------------------------------------------------

    /// Starts a login attempt for `username` by sending `create_session`.
    ///
    /// The status does not change here; it changes when the reply arrives.
    /// Does nothing if the broker connection is unavailable or lost.
    ///
    /// # Errors
    /// - [`SessionError::RequestInFlight`] if a reply is still pending
    /// - [`SessionError::InvalidState`] unless in `Start` (or a cancelled
    ///   attempt, which is re-armed to `Start`)
    /// - [`SessionError::ConnectionLost`] if the write fails
    pub async fn begin(&mut self, username: impl Into<String>) -> Result<(), SessionError> {
        if self.status.is_disconnected() {
            tracing::debug!(status = %self.status, "begin ignored, no broker connection");
            return Ok(());
        }
        self.ensure_can_create("begin")?;
        self.set_username(username);
        self.create_session().await
    }

    /// Stores `secret` and (re)starts the attempt for the current username
    /// by sending `create_session`, exactly like [`begin`](Self::begin).
    ///
    /// The secret is answered to the broker once it sends a secret prompt.
    ///
    /// # Errors
    /// - [`SessionError::MissingCredential`] if `secret` is empty; nothing
    ///   is sent and the error message is updated
    /// - otherwise as for [`begin`](Self::begin)
    pub async fn submit_credential(
        &mut self,
        secret: impl Into<String>,
    ) -> Result<(), SessionError> {
        let credential = Credential::new(secret);
        if credential.is_empty() {
            let err = SessionError::MissingCredential;
            self.error_message = Some(err.to_string());
            self.publish();
            return Err(err);
        }

        if self.status.is_disconnected() {
            tracing::debug!(status = %self.status, "credential ignored, no broker connection");
            return Ok(());
        }
        self.ensure_can_create("submit a credential")?;
        self.credential = Some(credential);
        self.create_session().await
    }

    // -- Inbound ----------------------------------------------------------

    /// Waits for the next broker reply and decodes it.
    ///
    /// # Errors
    /// - [`SessionError::ConnectionLost`] on I/O failure or EOF
    /// - [`SessionError::MalformedFrame`] if the payload is not a response
    ///
    /// Both leave the controller in [`LoginStatus::ConnectionLost`].
    pub async fn next_response(&mut self) -> Result<Response, SessionError> {
        let Some(conn) = self.conn.as_ref() else {
            return Err(self.inert_error());
        };

        let received = conn.recv().await;
        let frame = match received {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                return Err(self.lose_connection("broker closed the connection".into()));
            }
            Err(e) => return Err(self.lose_connection(e.to_string())),
        };

        match self.codec.decode::<Response>(&frame) {
            Ok(response) => Ok(response),
            Err(e) => {
                self.lose_connection(format!("malformed frame: {e}"));
                Err(SessionError::MalformedFrame(e))
            }
        }
    }

    /// Applies one broker reply and sends the follow-up request, if any.
    ///
    /// Returns the status after the transition.
    ///
    /// # Errors
    /// Only fails if the follow-up request cannot be sent.
    pub async fn handle_response(
        &mut self,
        response: Response,
    ) -> Result<LoginStatus, SessionError> {
        tracing::debug!(
            response = response.kind(),
            status = %self.status,
            "handling broker reply"
        );
        self.pending = None;

        match response {
            Response::AuthMessage {
                auth_message_type,
                auth_message,
            } => {
                if auth_message_type.is_secret() {
                    self.set_status(LoginStatus::TryToLoginSession);
                    self.is_authing = true;
                    self.publish();
                    if self.credential.is_none() {
                        tracing::warn!("secret prompt before any credential was submitted");
                    }
                    let reply = AuthReply::Secret(
                        self.credential.as_ref().map(|c| c.expose().to_owned()),
                    );
                    self.send(Request::PostAuthMessageResponse { response: reply })
                        .await?;
                } else {
                    tracing::info!(
                        kind = %auth_message_type,
                        message = %auth_message,
                        "acknowledging broker prompt"
                    );
                    self.send(Request::PostAuthMessageResponse {
                        response: AuthReply::Acknowledge,
                    })
                    .await?;
                }
            }

            Response::Error {
                error_type,
                description,
            } => {
                tracing::warn!(%error_type, %description, "broker reported an error");
                self.error_message = Some(format!("{error_type}: {description}"));
                self.broker_error = Some((error_type, description));
                self.credential = None;
                self.set_status(LoginStatus::Errored);
                self.send(Request::CancelSession).await?;
                self.is_authing = false;
            }

            Response::Success => match self.status {
                LoginStatus::Errored => {
                    self.credential = None;
                    self.set_status(LoginStatus::CancelSessionSucceeded);
                }
                LoginStatus::TryToLoginSession => {
                    self.set_status(LoginStatus::TryToStartSession);
                    self.publish();
                    let cmd = self.launch.argv();
                    let env = self.launch.env.clone();
                    self.send(Request::StartSession { cmd, env }).await?;
                }
                LoginStatus::TryToStartSession => {
                    self.credential = None;
                    self.set_status(LoginStatus::LoginSucceeded);
                    self.is_authing = false;
                }
                LoginStatus::Start
                | LoginStatus::LoginSucceeded
                | LoginStatus::CancelSessionSucceeded
                | LoginStatus::ConnectionUnavailable
                | LoginStatus::ConnectionLost => {
                    tracing::debug!(status = %self.status, "success ignored");
                }
            },
        }

        self.publish();
        Ok(self.status)
    }

    /// Receives one reply and applies it.
    ///
    /// # Errors
    /// See [`next_response`](Self::next_response) and
    /// [`handle_response`](Self::handle_response).
    pub async fn step(&mut self) -> Result<LoginStatus, SessionError> {
        let response = self.next_response().await?;
        self.handle_response(response).await
    }

    /// Keeps stepping until no request is awaiting a reply.
    ///
    /// # Errors
    /// Returns [`SessionError::BrokerError`] if the attempt ended in a
    /// (now acknowledged) cancellation, or any error from
    /// [`step`](Self::step).
    pub async fn run_until_idle(&mut self) -> Result<LoginStatus, SessionError> {
        while self.pending.is_some() {
            self.step().await?;
        }

        match (&self.broker_error, self.status) {
            (Some((error_type, description)), LoginStatus::CancelSessionSucceeded) => {
                Err(SessionError::BrokerError {
                    error_type: error_type.clone(),
                    description: description.clone(),
                })
            }
            _ => Ok(self.status),
        }
    }

    // -- Internals --------------------------------------------------------

    fn ensure_can_create(&mut self, action: &'static str) -> Result<(), SessionError> {
        if let Some(pending) = self.pending {
            return Err(SessionError::RequestInFlight { pending });
        }
        match self.status {
            LoginStatus::Start => Ok(()),
            LoginStatus::CancelSessionSucceeded => {
                tracing::info!("cancelled attempt re-armed for a new login");
                self.broker_error = None;
                self.credential = None;
                self.set_status(LoginStatus::Start);
                self.publish();
                Ok(())
            }
            status => Err(SessionError::InvalidState { action, status }),
        }
    }

    async fn create_session(&mut self) -> Result<(), SessionError> {
        tracing::info!(username = %self.username, "creating session");
        let request = Request::CreateSession {
            username: self.username.clone(),
        };
        self.send(request).await
    }

    /// Encodes and sends one request, marking it as awaiting a reply.
    async fn send(&mut self, request: Request) -> Result<(), SessionError> {
        if let Some(pending) = self.pending {
            return Err(SessionError::RequestInFlight { pending });
        }
        let Some(conn) = self.conn.as_ref() else {
            return Err(self.inert_error());
        };

        let bytes = self.codec.encode(&request).map_err(SessionError::Encode)?;
        let sent = conn.send(&bytes).await;
        if let Err(e) = sent {
            return Err(self.lose_connection(e.to_string()));
        }

        self.pending = Some(request.kind());
        tracing::debug!(request = request.kind(), "request sent");
        Ok(())
    }

    fn set_status(&mut self, status: LoginStatus) {
        if self.status != status {
            tracing::info!(from = %self.status, to = %status, "login status changed");
            self.status = status;
        }
    }

    fn inert_error(&self) -> SessionError {
        match self.status {
            LoginStatus::ConnectionUnavailable => SessionError::ConnectionUnavailable,
            _ => SessionError::ConnectionLost("connection already closed".into()),
        }
    }

    /// Drops the connection and makes the controller permanently inert.
    fn lose_connection(&mut self, reason: String) -> SessionError {
        tracing::error!(%reason, "broker connection lost");
        self.conn = None;
        self.pending = None;
        self.credential = None;
        self.is_authing = false;
        self.set_status(LoginStatus::ConnectionLost);
        let err = SessionError::ConnectionLost(reason);
        self.error_message = Some(err.to_string());
        self.publish();
        err
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

// =========================================================================
// Tests
// =========================================================================
