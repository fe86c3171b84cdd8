//! In-process store.

use crate::error::{StorageError, StorageResult};
use crate::ordering;
use mesh_model::{DataStore, RawMeta, StoreError, StoredObject};
use mesh_types::{MetaId, ObjectId};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    last_id: u64,
    last_meta_id: u64,
    objects: BTreeMap<ObjectId, StoredObject>,
    /// Rows in insertion order.
    meta: Vec<(ObjectId, RawMeta)>,
}

/// A thread-safe in-memory store. Ids are never reused.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.state().map(|s| s.objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> StorageResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl DataStore for MemoryStore {
    fn create_object(&self, object_type: &str, data: &Map<String, Value>) -> Result<ObjectId, StoreError> {
        let mut s = self.state()?;
        s.last_id += 1;
        let id = ObjectId::new(s.last_id);
        s.objects.insert(
            id,
            StoredObject {
                id,
                object_type: object_type.to_string(),
                data: data.clone(),
            },
        );
        Ok(id)
    }

    fn update_object(&self, id: ObjectId, _object_type: &str, data: &Map<String, Value>) -> Result<(), StoreError> {
        let mut s = self.state()?;
        let object = s.objects.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        object.data = data.clone();
        Ok(())
    }

    fn read_object(&self, id: ObjectId) -> Result<Option<StoredObject>, StoreError> {
        Ok(self.state()?.objects.get(&id).cloned())
    }

    fn delete_object(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut s = self.state()?;
        s.meta.retain(|(owner, _)| *owner != id);
        Ok(s.objects.remove(&id).is_some())
    }

    fn children(&self, parent: ObjectId, object_type: &str) -> Result<Vec<ObjectId>, StoreError> {
        let s = self.state()?;
        let mut found: Vec<(i64, ObjectId)> = s
            .objects
            .values()
            .filter(|o| o.object_type == object_type)
            .filter_map(|o| {
                let (p, menu_order) = ordering(&o.data);
                (p == parent.get()).then_some((menu_order, o.id))
            })
            .collect();
        found.sort();
        Ok(found.into_iter().map(|(_, id)| id).collect())
    }

    fn read_meta(&self, id: ObjectId) -> Result<Vec<RawMeta>, StoreError> {
        Ok(self
            .state()?
            .meta
            .iter()
            .filter(|(owner, _)| *owner == id)
            .map(|(_, m)| m.clone())
            .collect())
    }

    fn add_meta(&self, id: ObjectId, key: &str, value: &Value) -> Result<MetaId, StoreError> {
        let mut s = self.state()?;
        s.last_meta_id += 1;
        let meta_id = MetaId::new(s.last_meta_id);
        s.meta.push((
            id,
            RawMeta {
                meta_id,
                meta_key: key.to_string(),
                meta_value: value.clone(),
            },
        ));
        Ok(meta_id)
    }

    fn update_meta(&self, id: ObjectId, meta_id: MetaId, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut s = self.state()?;
        if let Some((_, row)) = s
            .meta
            .iter_mut()
            .find(|(owner, m)| *owner == id && m.meta_id == meta_id)
        {
            row.meta_key = key.to_string();
            row.meta_value = value.clone();
        }
        Ok(())
    }

    fn delete_meta(&self, id: ObjectId, meta_id: MetaId) -> Result<(), StoreError> {
        self.state()?
            .meta
            .retain(|(owner, m)| !(*owner == id && m.meta_id == meta_id));
        Ok(())
    }
}
