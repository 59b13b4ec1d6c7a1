//! Hook for releasing the session lock surface.
//!
//! The greeter does not draw anything itself. Whatever owns the screen
//! (a session-lock client, a compositor shell, a test double) implements
//! [`LockSurface`], and the greeter calls it when asked to unlock.

use crate::GreeterError;

/// Something that can dismiss the greeter's lock surface.
///
/// Unlocking is not gated on the login state; the caller decides when.
pub trait LockSurface: Send + Sync + 'static {
    /// Releases the lock and lets the presentation process exit.
    ///
    /// # Errors
    /// Returns [`GreeterError::Unlock`] if the surface refuses.
    fn unlock(&self) -> Result<(), GreeterError>;
}

/// A [`LockSurface`] for headless use: unlocking does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLock;

impl LockSurface for NoLock {
    fn unlock(&self) -> Result<(), GreeterError> {
        Ok(())
    }
}
