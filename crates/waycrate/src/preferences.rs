//! The remembered last user.
//!
//! Stored as a small JSON object, e.g. `{"user":"alice"}`. The greeter
//! reads it once at startup; writing it back is up to the caller.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::GreeterError;

/// Persisted greeter preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// The last user who logged in successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Preferences {
    /// Loads preferences from `path`. A missing file gives the defaults.
    ///
    /// # Errors
    /// Returns [`GreeterError::Preferences`] if the file cannot be read or
    /// is not valid JSON.
    pub fn load(path: &Path) -> Result<Self, GreeterError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(GreeterError::Preferences {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| GreeterError::Preferences {
            path: path.to_path_buf(),
            source: std::io::Error::new(ErrorKind::InvalidData, e),
        })
    }

    /// Writes preferences to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns [`GreeterError::Preferences`] on any I/O failure.
    pub fn save(&self, path: &Path) -> Result<(), GreeterError> {
        let wrap = |source: std::io::Error| GreeterError::Preferences {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(wrap)?;
        }
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| wrap(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        std::fs::write(path, json).map_err(wrap)
    }

    /// The remembered user, if one is set and non-empty.
    pub fn last_user(&self) -> Option<&str> {
        self.user.as_deref().filter(|u| !u.is_empty())
    }
}
