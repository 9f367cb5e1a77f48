//! File-backed storage.
//!
//! Each key is one file inside the storage directory. Files are written with
//! owner-only permissions on Unix since the session record carries a bearer
//! token.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{SessionStorage, StorageError};

/// Directory name used under the home directory when no explicit location
/// is configured.
pub const DEFAULT_DIR_NAME: &str = ".onlyconfig";

/// A storage medium that keeps one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the storage directory at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::Open {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(path = %dir.display(), "file storage opened");
        Ok(Self { dir })
    }

    /// Open the default location, `$HOME/.onlyconfig`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the home directory is unknown or the
    /// directory cannot be created.
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(home_dir()?.join(DEFAULT_DIR_NAME))
    }

    /// The directory holding the stored keys.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_owned(),
            });
        }
        Ok(self.dir.join(key))
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::write(&path, value).map_err(|e| StorageError::Write {
            key: key.to_owned(),
            reason: e.to_string(),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, perms).map_err(|e| StorageError::Write {
                key: key.to_owned(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Delete {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }
}

fn home_dir() -> Result<PathBuf, StorageError> {
    #[cfg(windows)]
    let var = "USERPROFILE";
    #[cfg(not(windows))]
    let var = "HOME";

    std::env::var(var)
        .map(PathBuf::from)
        .map_err(|_| StorageError::Open {
            path: format!("${var}"),
            reason: format!("{var} not set"),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("store");
        let storage = FileStorage::open(&dir).unwrap();
        assert!(storage.dir().is_dir());
    }

    #[test]
    fn set_get_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();

        assert_eq!(storage.get_item("onlyconfig.user").unwrap(), None);
        storage.set_item("onlyconfig.user", r#"{"is_login":true}"#).unwrap();
        assert_eq!(
            storage.get_item("onlyconfig.user").unwrap().as_deref(),
            Some(r#"{"is_login":true}"#)
        );

        storage.remove_item("onlyconfig.user").unwrap();
        assert_eq!(storage.get_item("onlyconfig.user").unwrap(), None);
        storage.remove_item("onlyconfig.user").unwrap();
    }

    #[test]
    fn values_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        FileStorage::open(tmp.path())
            .unwrap()
            .set_item("k", "persisted")
            .unwrap();
        let reopened = FileStorage::open(tmp.path()).unwrap();
        assert_eq!(reopened.get_item("k").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(
                matches!(storage.set_item(key, "x"), Err(StorageError::InvalidKey { .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();
        storage.set_item("secret", "token").unwrap();
        let mode = std::fs::metadata(tmp.path().join("secret"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
