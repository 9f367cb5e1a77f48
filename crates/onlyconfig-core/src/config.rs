//! Console configuration.
//!
//! Loads configuration from environment variables; every setting is optional.

use std::path::PathBuf;

use onlyconfig_storage::{FileStorage, StorageError};

use crate::endpoint::{ApiEndpoint, BuildProfile, PAGE_ORIGIN};

/// Console configuration.
#[derive(Debug, Clone, Default)]
pub struct ConsoleConfig {
    /// Explicit backend origin. When unset the build profile decides.
    pub addr: Option<String>,
    /// Directory holding the session record.
    pub home: Option<PathBuf>,
    /// Log filter (e.g. `warn`, `onlyconfig_core=debug`).
    pub log_level: String,
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// - `ONLYCONFIG_ADDR`: backend origin (default: build profile decides)
    /// - `ONLYCONFIG_HOME`: session directory (default: `$HOME/.onlyconfig`)
    /// - `ONLYCONFIG_LOG`: log filter (default: `warn`)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            addr: non_empty_var("ONLYCONFIG_ADDR"),
            home: non_empty_var("ONLYCONFIG_HOME").map(PathBuf::from),
            log_level: non_empty_var("ONLYCONFIG_LOG").unwrap_or_else(|| "warn".to_owned()),
        }
    }

    /// Backend origin: the explicit address if given, otherwise the
    /// development origin in debug builds and [`PAGE_ORIGIN`] in release.
    pub fn endpoint(&self) -> ApiEndpoint {
        match &self.addr {
            Some(addr) => ApiEndpoint::new(addr.as_str()),
            None => ApiEndpoint::for_profile(BuildProfile::current(), PAGE_ORIGIN),
        }
    }

    /// Open the session storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory cannot be created or
    /// no home directory is known.
    pub fn storage(&self) -> Result<FileStorage, StorageError> {
        match &self.home {
            Some(dir) => FileStorage::open(dir),
            None => FileStorage::open_default(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
