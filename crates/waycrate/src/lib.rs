//! # Waycrate
//!
//! Core of a greetd greeter: everything except the pixels.
//!
//! A presentation layer (a lock-screen surface, a TUI, a test) builds a
//! [`Greeter`], feeds it a username and password, and watches the
//! [`LoginStatus`] it publishes. The layers underneath are separate crates:
//!
//! - `waycrate-transport`: length-prefixed frames over the broker socket
//! - `waycrate-protocol`: the JSON request/response messages
//! - `waycrate-session`: the login state machine
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use waycrate::prelude::*;
//!
//! # async fn run() -> Result<(), GreeterError> {
//! let config = GreeterConfig::default().command("sway");
//! let mut greeter = Greeter::connect(config, NoLock).await;
//!
//! greeter.set_username("alice");
//! if greeter.login("hunter2").await? == LoginStatus::LoginSucceeded {
//!     greeter.remember_user()?;
//!     greeter.unlock()?;
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod greeter;
mod lock;
mod preferences;

pub mod avatar;
pub mod power;

pub use config::{DEFAULT_ICONS_DIR, GreeterConfig, SOCKET_ENV};
pub use error::GreeterError;
pub use greeter::Greeter;
pub use lock::{LockSurface, NoLock};
pub use preferences::Preferences;

pub use waycrate_protocol::{AuthMessageType, ProtocolError, Request, Response};
pub use waycrate_session::{
    LaunchConfig, LoginStatus, SessionController, SessionError, SessionSnapshot,
};
pub use waycrate_transport::TransportError;

/// Everything a presentation layer usually needs.
pub mod prelude {
    pub use crate::avatar::Avatar;
    pub use crate::{
        Greeter, GreeterConfig, GreeterError, LaunchConfig, LockSurface, LoginStatus, NoLock,
        SessionSnapshot,
    };
}
