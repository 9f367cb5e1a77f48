//! Persisted storage for the `OnlyConfig` console.
//!
//! This crate defines the [`SessionStorage`] trait: a synchronous string
//! key-value interface shaped like browser `localStorage`. It knows nothing
//! about sessions or tokens; the session store in `onlyconfig-core` decides
//! what record lives under which key.
//!
//! Two implementations are provided:
//!
//! - [`FileStorage`]: one file per key inside a directory, survives restarts
//! - [`MemoryStorage`]: in-memory, for testing only

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A pluggable string key-value storage medium.
///
/// Operations are synchronous and last-write-wins. Implementations must be
/// safe to share between the pages of a console (`Send + Sync`).
pub trait SessionStorage: Send + Sync + 'static {
    /// Retrieve the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying medium fails.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying medium fails.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the underlying medium fails.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}
