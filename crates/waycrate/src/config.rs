//! Greeter configuration.

use std::path::{Path, PathBuf};

use waycrate_session::LaunchConfig;

/// Environment variable holding the broker socket path.
pub const SOCKET_ENV: &str = "GREETD_SOCK";

/// Where AccountsService keeps per-user avatar images.
pub const DEFAULT_ICONS_DIR: &str = "/var/lib/AccountsService/icons";

/// Configuration for a [`Greeter`](crate::Greeter).
///
/// Start from `GreeterConfig::default()` and override what you need with
/// the builder methods.
#[derive(Debug, Clone)]
pub struct GreeterConfig {
    /// Name of the environment variable that holds the broker socket path.
    pub socket_env: String,

    /// Command and environment handed to `start_session`.
    pub launch: LaunchConfig,

    /// JSON file holding the last logged-in user. `None` disables it.
    pub preferences_path: Option<PathBuf>,

    /// Directory searched for `<username>` avatar images.
    pub icons_dir: PathBuf,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            socket_env: SOCKET_ENV.to_string(),
            launch: LaunchConfig::default(),
            preferences_path: default_preferences_path(),
            icons_dir: PathBuf::from(DEFAULT_ICONS_DIR),
        }
    }
}

impl GreeterConfig {
    /// Sets the session command line.
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.launch.command = command.into();
        self
    }

    /// Sets the session environment (`KEY=VALUE` entries).
    pub fn env<I, S>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.launch = self.launch.env(env);
        self
    }

    /// Sets (or clears) the preferences file.
    pub fn preferences_path(mut self, path: Option<PathBuf>) -> Self {
        self.preferences_path = path;
        self
    }

    /// Sets the avatar directory.
    pub fn icons_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.icons_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets the environment variable consulted for the socket path.
    pub fn socket_env(mut self, name: impl Into<String>) -> Self {
        self.socket_env = name.into();
        self
    }

    /// Resolves the broker socket path through `lookup`.
    ///
    /// `lookup` is normally `|k| std::env::var(k).ok()`; tests pass a
    /// closure. A missing or empty value yields `None`.
    pub fn resolve_socket<F>(&self, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&self.socket_env)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}

/// `$XDG_CONFIG_HOME/waycrate/greeter.json`, falling back to
/// `$HOME/.config/waycrate/greeter.json`.
fn default_preferences_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
    };
    Some(base.join("waycrate").join("greeter.json"))
}
