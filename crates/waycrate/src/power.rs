//! Power actions through the systemd login manager.
//!
//! Unrelated to the login state machine: a power-off can be requested at
//! any time, from any state.

use crate::GreeterError;

/// Asks logind to power the machine off.
///
/// Calls `org.freedesktop.login1.Manager.PowerOff(interactive = true)` on
/// the system bus, so polkit may prompt or refuse.
///
/// # Errors
/// Returns [`GreeterError::Power`] if the bus is unreachable or the call
/// is refused.
#[cfg(feature = "logind")]
pub async fn power_off() -> Result<(), GreeterError> {
    let connection = zbus::Connection::system().await?;
    connection
        .call_method(
            Some("org.freedesktop.login1"),
            "/org/freedesktop/login1",
            Some("org.freedesktop.login1.Manager"),
            "PowerOff",
            &(true,),
        )
        .await?;
    tracing::info!("power off requested");
    Ok(())
}

/// Power actions are compiled out without the `logind` feature.
///
/// # Errors
/// Always returns [`GreeterError::PowerUnsupported`].
#[cfg(not(feature = "logind"))]
pub async fn power_off() -> Result<(), GreeterError> {
    Err(GreeterError::PowerUnsupported)
}
