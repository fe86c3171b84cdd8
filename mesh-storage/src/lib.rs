//! Storage backends for Mesh entities.
//!
//! Both backends implement [`mesh_model::DataStore`]:
//!
//! - [`SqliteStore`] keeps objects as JSON blobs in `mesh_objects` and meta
//!   rows in `mesh_meta`, with `parent`/`menu_order` lifted into columns so
//!   child lookups stay indexed
//! - [`MemoryStore`] keeps everything in process; used by tests and dry runs

mod error;
mod memory;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde_json::{Map, Value};

/// `(parent, menu_order)` of an object, 0 when absent.
pub(crate) fn ordering(data: &Map<String, Value>) -> (u64, i64) {
    let parent = data.get("parent").and_then(Value::as_u64).unwrap_or(0);
    let menu_order = data.get("menu_order").and_then(Value::as_i64).unwrap_or(0);
    (parent, menu_order)
}

/// Decodes a stored meta value. Text that is not JSON comes back as a
/// plain string, so rows written by other tools stay readable.
pub(crate) fn decode_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
