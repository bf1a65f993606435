//! Persistence port for the registries.
//!
//! Every registry mirrors its whole collection to a [`StateStore`] under a
//! fixed key after each mutation. Backends only move opaque JSON blobs, so a
//! file directory, an in-memory map or a database table can be swapped in
//! without touching registry logic.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

/// Storage keys for each registry.
pub mod keys {
    /// Product catalog.
    pub const PRODUCTS: &str = "products";
    /// Admin accounts.
    pub const ADMINS: &str = "admins";
    /// Visitor records.
    pub const VISITORS: &str = "visitors";
}

/// A synchronous key/value blob store.
pub trait StateStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store backed by a `HashMap`.
///
/// Nothing survives a restart; used by tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Load a collection stored under `key`.
///
/// Returns `None` when nothing is stored, when the backend fails, or when the
/// blob does not parse; the last two are logged and treated as "nothing
/// stored" so callers fall back to their defaults.
pub fn load_collection<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<Vec<T>> {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored collection, using defaults");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::warn!(key, error = %e, "Stored collection is malformed, using defaults");
            None
        }
    }
}

/// Serialize `items` and store them under `key`.
///
/// # Errors
///
/// Returns `StorageError` if serialization or the backend write fails.
pub fn save_collection<T: Serialize>(
    store: &dyn StateStore,
    key: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(items).map_err(|source| StorageError::Serialize {
        key: key.to_owned(),
        source,
    })?;
    store.save(key, &raw)
}
