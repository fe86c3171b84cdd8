//! Error types for the entity layer.

use mesh_types::ObjectId;
use std::fmt;
use thiserror::Error;

/// Result type for entity operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// A validation failure raised by a property setter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct MeshDataError {
    pub code: String,
    pub message: String,
}

impl MeshDataError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Every setter failure collected by a bulk `set_props` call, in the order
/// the fields were visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataErrors {
    errors: Vec<MeshDataError>,
}

impl DataErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: MeshDataError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Distinct error codes, first occurrence order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::new();
        for e in &self.errors {
            if !codes.contains(&e.code.as_str()) {
                codes.push(&e.code);
            }
        }
        codes
    }

    /// All messages recorded under `code`.
    pub fn messages(&self, code: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.code == code)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeshDataError> {
        self.errors.iter()
    }
}

impl fmt::Display for DataErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for DataErrors {}

/// Errors reported by a [`DataStore`](crate::DataStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed (connection, query, lock).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The entity has no data store attached.
    #[error("no data store attached")]
    Unavailable,

    /// The addressed object does not exist.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Top-level error for entity operations.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("validation failed: {0}")]
    Validation(#[from] MeshDataError),

    #[error("invalid properties: {0}")]
    Invalid(#[from] DataErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("object {id} is a {found}, expected {expected}")]
    TypeMismatch {
        id: ObjectId,
        expected: String,
        found: String,
    },
}
