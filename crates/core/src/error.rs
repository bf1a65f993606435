//! Error types shared by the registries.

use thiserror::Error;

use crate::types::PriceError;

/// A persistence backend failed to read or write a blob.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure (file backends).
    #[error("I/O error on key {key}: {source}")]
    Io {
        /// Storage key being accessed.
        key: String,
        /// Original I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A collection could not be serialized for saving.
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        /// Storage key being written.
        key: String,
        /// Original serde error.
        #[source]
        source: serde_json::Error,
    },
    /// The backend is unusable (poisoned lock, bad configuration).
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// A product failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// Name is empty or whitespace.
    #[error("product name is required")]
    MissingName,
    /// Neither an image nor a link was given.
    #[error("product needs an image or a link")]
    MissingImageAndLink,
    /// Price is not strictly positive.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Errors returned by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Persisting the updated collection failed; in-memory state is unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Product input was rejected.
    #[error("invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    /// Every product ID up to `i64::MAX` is taken.
    #[error("product IDs exhausted")]
    IdsExhausted,

    /// Admin input was rejected.
    #[error("invalid admin: {0}")]
    InvalidAdmin(String),
}

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
