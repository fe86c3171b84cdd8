//! Error types for the storage layer.

use mesh_model::StoreError;
use mesh_types::ObjectId;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Object not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// A previous holder of the connection lock panicked.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Serialization(e) => StoreError::Serialization(e),
            StorageError::NotFound(id) => StoreError::NotFound(id),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
