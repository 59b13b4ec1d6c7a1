//! Login session management for WayCrate.
//!
//! This crate turns the broker's request/reply protocol into a small state
//! machine:
//!
//! 1. **Controller**: [`SessionController`] sequences `create_session`,
//!    secret prompts, `start_session`, and cancellation
//! 2. **State**: [`LoginStatus`] and the observable [`SessionSnapshot`]
//! 3. **Inputs**: [`LaunchConfig`] (what to start) and [`Credential`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Greeter facade (above)  ← connects, loads preferences, exposes the UI API
//!     ↕
//! Session Layer (this crate)  ← decides the next request from each reply
//!     ↕
//! Protocol + Transport (below)  ← JSON messages in length-prefixed frames
//! ```

mod controller;
mod credential;
mod error;
mod session;

pub use controller::SessionController;
pub use credential::Credential;
pub use error::SessionError;
pub use session::{LaunchConfig, LoginStatus, SessionSnapshot};
