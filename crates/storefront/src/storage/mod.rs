//! Durable key/value storage for client-side state.
//!
//! The session credential, the user profile and the wishlist live outside the
//! server in a small key/value store. Everything that persists state depends
//! on the [`KeyValueStore`] trait, so the file-backed store used by the CLI
//! can be swapped for the in-memory store in tests or any other backend.
//!
//! Every key is independent and optional: readers must tolerate a missing,
//! empty or malformed value.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Keys for persisted client state.
pub mod keys {
    /// Bearer credential issued by the storefront API.
    pub const ACCESS_TOKEN: &str = "accessToken";

    /// Serialized profile of the signed-in user.
    pub const USER_INFO: &str = "userInfo";

    /// Serialized wishlist entries.
    pub const WISHLIST: &str = "wishlist";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The key contains characters the backend cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// A value could not be serialized for storage.
    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A durable string key/value store.
///
/// Mirrors the browser storage contract: `get` returns `None` for an absent
/// key, `set` overwrites, `clear` removes a key and succeeds if it was absent.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Read `key` and deserialize it, treating absent, empty or malformed values as `None`.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read persisted value");
            return None;
        }
    };

    if raw.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed persisted value");
            None
        }
    }
}

/// Serialize `value` and store it under `key`.
pub(crate) fn write_json<T: serde::Serialize>(
    storage: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    storage.set(key, &raw)
}
