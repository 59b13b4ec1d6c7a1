//! Avatar lookup in the AccountsService icon directory.

use std::path::{Path, PathBuf};

/// Which picture to show for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    /// The user has their own icon at this path.
    Custom(PathBuf),
    /// Use the bundled generic account icon.
    Default,
}

/// Looks up `<icons_dir>/<username>`.
///
/// Usernames containing a path separator (or `..`) never match, so the
/// lookup cannot escape `icons_dir`.
pub fn resolve(icons_dir: &Path, username: &str) -> Avatar {
    if username.is_empty() || username.contains('/') || username == ".." || username == "." {
        return Avatar::Default;
    }
    let path = icons_dir.join(username);
    if path.is_file() {
        Avatar::Custom(path)
    } else {
        Avatar::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_icon_is_custom() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alice"), b"png").unwrap();
        assert_eq!(
            resolve(dir.path(), "alice"),
            Avatar::Custom(dir.path().join("alice"))
        );
    }

    #[test]
    fn test_missing_icon_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(dir.path(), "bob"), Avatar::Default);
    }

    #[test]
    fn test_traversal_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(dir.path(), "../etc/passwd"), Avatar::Default);
        assert_eq!(resolve(dir.path(), ".."), Avatar::Default);
        assert_eq!(resolve(dir.path(), ""), Avatar::Default);
    }
}
