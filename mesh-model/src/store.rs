//! The storage collaborator an entity delegates persistence to.

use crate::error::StoreError;
use mesh_types::{MetaId, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A meta row as the store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeta {
    pub meta_id: MetaId,
    pub meta_key: String,
    pub meta_value: Value,
}

/// An object row as the store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: ObjectId,
    pub object_type: String,
    pub data: Map<String, Value>,
}

/// Persistence backend for entities and their meta.
///
/// `parent` and `menu_order` are read out of the object data when present so
/// that backends can answer [`children`](DataStore::children) queries.
pub trait DataStore: Send + Sync {
    /// Inserts a new object and returns its id.
    fn create_object(&self, object_type: &str, data: &Map<String, Value>) -> Result<ObjectId, StoreError>;

    /// Replaces the stored data of an existing object.
    fn update_object(&self, id: ObjectId, object_type: &str, data: &Map<String, Value>) -> Result<(), StoreError>;

    fn read_object(&self, id: ObjectId) -> Result<Option<StoredObject>, StoreError>;

    /// Deletes the object and all of its meta. Returns false if it did not exist.
    fn delete_object(&self, id: ObjectId) -> Result<bool, StoreError>;

    /// Ids of objects of `object_type` whose parent is `parent`, by
    /// `menu_order` then id.
    fn children(&self, parent: ObjectId, object_type: &str) -> Result<Vec<ObjectId>, StoreError>;

    /// All meta rows of an object, in insertion order.
    fn read_meta(&self, id: ObjectId) -> Result<Vec<RawMeta>, StoreError>;

    fn add_meta(&self, id: ObjectId, key: &str, value: &Value) -> Result<MetaId, StoreError>;

    fn update_meta(&self, id: ObjectId, meta_id: MetaId, key: &str, value: &Value) -> Result<(), StoreError>;

    fn delete_meta(&self, id: ObjectId, meta_id: MetaId) -> Result<(), StoreError>;
}
