use std::fmt;

/// A secret typed by the user, held in memory for one login attempt.
///
/// `Debug` is redacted so the secret cannot leak into logs through a
/// stray `{:?}`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret text.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let c = Credential::new("hunter2");
        assert_eq!(format!("{c:?}"), "Credential(<redacted>)");
        assert_eq!(c.expose(), "hunter2");
    }
}
