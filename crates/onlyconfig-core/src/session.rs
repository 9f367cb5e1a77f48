//! The persisted login session.
//!
//! One JSON record `{ "is_login": bool, "token": string }` is kept under
//! [`SESSION_KEY`]. Reads never fail: a missing, unreadable, or malformed
//! record simply means "not logged in".

use std::fmt;
use std::sync::Arc;

use onlyconfig_storage::{SessionStorage, StorageError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fixed key of the session record.
pub const SESSION_KEY: &str = "onlyconfig.user";

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(default)]
    is_login: bool,
    #[serde(default)]
    token: String,
}

/// Login flag and bearer token over a pluggable storage medium.
///
/// Cheap to clone; clones share the medium.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Wrap a storage medium.
    pub fn new(storage: impl SessionStorage) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// True iff a record exists, parses, and has `is_login == true`.
    pub fn is_logged_in(&self) -> bool {
        self.record().is_some_and(|r| r.is_login)
    }

    /// Persist `{ is_login: true, token }`, replacing any prior record.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the record cannot be written.
    pub fn set_logged_in(&self, token: &str) -> Result<(), StorageError> {
        let record = SessionRecord {
            is_login: true,
            token: token.to_owned(),
        };
        let value = serde_json::to_string(&record).map_err(|e| StorageError::Write {
            key: SESSION_KEY.to_owned(),
            reason: e.to_string(),
        })?;
        self.storage.set_item(SESSION_KEY, &value)?;
        debug!("session stored");
        Ok(())
    }

    /// Remove the record. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the record exists but cannot be removed.
    pub fn set_logged_out(&self) -> Result<(), StorageError> {
        self.storage.remove_item(SESSION_KEY)?;
        debug!("session cleared");
        Ok(())
    }

    /// The persisted token, or `""` when there is none.
    pub fn token(&self) -> String {
        self.record().map(|r| r.token).unwrap_or_default()
    }

    fn record(&self) -> Option<SessionRecord> {
        let raw = match self.storage.get_item(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "session record unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "session record malformed");
                None
            }
        }
    }
}
