//! Core type definitions for Mesh.
//!
//! Identifiers for stored objects (sections, blocks) and their meta rows.
//! Object ids follow the host CMS convention: positive integers, with `0`
//! meaning "not yet persisted".

mod ids;

pub use ids::{MetaId, ObjectId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid meta id: {0}")]
    InvalidMetaId(String),
}
