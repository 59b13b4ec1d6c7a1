//! The `Greeter`: what a presentation layer holds on to.
//!
//! It wires socket lookup, transport, and the session controller
//! together, and adds the desktop glue (last user, avatar, power,
//! unlock) that the controller itself knows nothing about.

use tokio::sync::watch;
use waycrate_session::{LoginStatus, SessionController, SessionSnapshot};
use waycrate_transport::UnixConnection;

use crate::avatar::{self, Avatar};
use crate::{GreeterConfig, GreeterError, LockSurface, NoLock, Preferences};

/// A greeter bound to one broker connection.
///
/// Construction never fails: if the broker cannot be reached the greeter
/// still comes up, reporting "Cannot connect to greetd", so the user can
/// at least see the error and power off.
pub struct Greeter<L: LockSurface = NoLock> {
    config: GreeterConfig,
    lock: L,
    preferences: Preferences,
    controller: SessionController<UnixConnection>,
    connect_error: Option<GreeterError>,
}

impl<L: LockSurface> Greeter<L> {
    /// Builds a greeter, reading the socket path from the process
    /// environment.
    pub async fn connect(config: GreeterConfig, lock: L) -> Self {
        Self::connect_with(config, lock, |key| std::env::var(key).ok()).await
    }

    /// Builds a greeter with an explicit environment lookup.
    pub async fn connect_with<F>(config: GreeterConfig, lock: L, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let preferences = load_preferences(&config);
        let (mut controller, connect_error) = open_controller(&config, lookup).await;
        if let Some(user) = preferences.last_user() {
            tracing::debug!(%user, "remembered user restored");
            controller.set_username(user);
        }

        Self {
            config,
            lock,
            preferences,
            controller,
            connect_error,
        }
    }

    /// Throws the current controller away and connects a fresh one,
    /// keeping the username.
    pub async fn restart(&mut self) {
        self.restart_with(|key| std::env::var(key).ok()).await;
    }

    /// [`restart`](Self::restart) with an explicit environment lookup.
    pub async fn restart_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = self.controller.username().to_owned();
        (self.controller, self.connect_error) = open_controller(&self.config, lookup).await;
        self.controller.set_username(username);
    }

    // -- Session ----------------------------------------------------------

    /// The underlying session controller.
    pub fn controller(&self) -> &SessionController<UnixConnection> {
        &self.controller
    }

    /// Mutable access for callers that drive the controller step by step.
    pub fn controller_mut(&mut self) -> &mut SessionController<UnixConnection> {
        &mut self.controller
    }

    /// Why the last connect attempt failed, if the socket path resolved
    /// but the broker could not be reached.
    pub fn connect_error(&self) -> Option<&GreeterError> {
        self.connect_error.as_ref()
    }

    /// Current login status.
    pub fn status(&self) -> LoginStatus {
        self.controller.status()
    }

    /// Current observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    /// Subscribes to state changes, for redrawing the UI.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.controller.subscribe()
    }

    /// Sets the user to log in.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.controller.set_username(username);
    }

    /// Submits `password` and sends `create_session` without waiting for
    /// any reply. Follow with [`drive`](Self::drive).
    ///
    /// # Errors
    /// As for [`SessionController::submit_credential`].
    pub async fn submit_password(&mut self, password: &str) -> Result<(), GreeterError> {
        Ok(self.controller.submit_credential(password).await?)
    }

    /// Handles broker replies until none is outstanding.
    ///
    /// # Errors
    /// As for [`SessionController::run_until_idle`].
    pub async fn drive(&mut self) -> Result<LoginStatus, GreeterError> {
        Ok(self.controller.run_until_idle().await?)
    }

    /// Submits `password` for the current user and drives the handshake
    /// until the broker stops asking for anything.
    ///
    /// Returns `LoginSucceeded` on success. With no broker connection this
    /// returns the inert status without error.
    ///
    /// # Errors
    /// - `MissingCredential` for an empty password
    /// - `BrokerError` after a rejected attempt (already cancelled)
    /// - `ConnectionLost` / `MalformedFrame` on transport failure
    pub async fn login(&mut self, password: &str) -> Result<LoginStatus, GreeterError> {
        self.submit_password(password).await?;
        self.drive().await
    }

    // -- Desktop glue -----------------------------------------------------

    /// The preferences read at construction.
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Stores the current username as the last user.
    ///
    /// # Errors
    /// Returns [`GreeterError::Preferences`] if the file cannot be written.
    pub fn remember_user(&mut self) -> Result<(), GreeterError> {
        let Some(path) = self.config.preferences_path.as_deref() else {
            return Ok(());
        };
        self.preferences.user = Some(self.controller.username().to_owned());
        self.preferences.save(path)
    }

    /// The avatar for the current username.
    pub fn avatar(&self) -> Avatar {
        avatar::resolve(&self.config.icons_dir, self.controller.username())
    }

    /// Releases the lock surface. Not gated on the login status.
    ///
    /// # Errors
    /// Whatever the [`LockSurface`] reports.
    pub fn unlock(&self) -> Result<(), GreeterError> {
        tracing::info!(status = %self.controller.status(), "unlocking");
        self.lock.unlock()
    }

    /// Requests a power-off without waiting for it. Failures are logged.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn request_power_off(&self) {
        tokio::spawn(async {
            if let Err(e) = crate::power::power_off().await {
                tracing::warn!(error = %e, "Cannot PowerOff");
            }
        });
    }
}

fn load_preferences(config: &GreeterConfig) -> Preferences {
    let Some(path) = config.preferences_path.as_deref() else {
        return Preferences::default();
    };
    match Preferences::load(path) {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable preferences");
            Preferences::default()
        }
    }
}

async fn open_controller<F>(
    config: &GreeterConfig,
    lookup: F,
) -> (SessionController<UnixConnection>, Option<GreeterError>)
where
    F: Fn(&str) -> Option<String>,
{
    let launch = config.launch.clone();
    let Some(path) = config.resolve_socket(lookup) else {
        tracing::warn!(var = %config.socket_env, "Unable to retrieve broker socket path");
        return (SessionController::unavailable(launch), None);
    };

    match UnixConnection::connect(&path).await {
        Ok(conn) => (SessionController::new(conn, launch), None),
        Err(e) => {
            tracing::warn!(error = %e, "cannot connect to broker");
            (SessionController::unavailable(launch), Some(e.into()))
        }
    }
}
