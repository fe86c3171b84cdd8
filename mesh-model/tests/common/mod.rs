//! Shared test helpers for entity tests.

#![allow(dead_code)]

use mesh_model::{
    DataSchema, DataStore, MeshData, MeshDataError, MeshObject, MeshResult, RawMeta, Setter,
    StoreError, StoredObject,
};
use mesh_types::{MetaId, ObjectId};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// A storage operation as the recording store saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    CreateObject(String),
    UpdateObject(ObjectId),
    DeleteObject(ObjectId),
    ReadMeta(ObjectId),
    AddMeta(ObjectId, String),
    UpdateMeta(ObjectId, MetaId),
    DeleteMeta(ObjectId, MetaId),
}

#[derive(Default)]
struct State {
    next_id: u64,
    next_meta_id: u64,
    objects: HashMap<ObjectId, StoredObject>,
    meta: Vec<(ObjectId, RawMeta)>,
    ops: Vec<Op>,
    fail_meta_writes: bool,
}

/// In-memory store that logs every call.
#[derive(Default)]
pub struct RecordingStore {
    state: Mutex<State>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.lock().unwrap().ops.clear();
    }

    /// Makes `add_meta` fail until switched back off.
    pub fn fail_meta_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_meta_writes = fail;
    }

    pub fn meta_reads(&self) -> usize {
        self.ops().iter().filter(|op| matches!(op, Op::ReadMeta(_))).count()
    }

    /// Seeds a stored object with meta rows, returning its id.
    pub fn seed(&self, object_type: &str, data: Value, meta: &[(&str, Value)]) -> ObjectId {
        let data = data.as_object().cloned().unwrap_or_default();
        let id = self.create_object(object_type, &data).unwrap();
        for (key, value) in meta {
            self.add_meta(id, key, value).unwrap();
        }
        self.clear_ops();
        id
    }

    pub fn stored(&self, id: ObjectId) -> Option<StoredObject> {
        self.state.lock().unwrap().objects.get(&id).cloned()
    }

    pub fn stored_meta(&self, id: ObjectId) -> Vec<RawMeta> {
        self.state
            .lock()
            .unwrap()
            .meta
            .iter()
            .filter(|(owner, _)| *owner == id)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl DataStore for RecordingStore {
    fn create_object(&self, object_type: &str, data: &Map<String, Value>) -> Result<ObjectId, StoreError> {
        let mut s = self.state.lock().unwrap();
        s.next_id += 1;
        let id = ObjectId::new(s.next_id);
        s.objects.insert(
            id,
            StoredObject { id, object_type: object_type.into(), data: data.clone() },
        );
        s.ops.push(Op::CreateObject(object_type.into()));
        Ok(id)
    }

    fn update_object(&self, id: ObjectId, _object_type: &str, data: &Map<String, Value>) -> Result<(), StoreError> {
        let mut s = self.state.lock().unwrap();
        let obj = s.objects.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        obj.data = data.clone();
        s.ops.push(Op::UpdateObject(id));
        Ok(())
    }

    fn read_object(&self, id: ObjectId) -> Result<Option<StoredObject>, StoreError> {
        Ok(self.state.lock().unwrap().objects.get(&id).cloned())
    }

    fn delete_object(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut s = self.state.lock().unwrap();
        let removed = s.objects.remove(&id).is_some();
        s.meta.retain(|(owner, _)| *owner != id);
        s.ops.push(Op::DeleteObject(id));
        Ok(removed)
    }

    fn children(&self, parent: ObjectId, object_type: &str) -> Result<Vec<ObjectId>, StoreError> {
        let s = self.state.lock().unwrap();
        let mut ids: Vec<ObjectId> = s
            .objects
            .values()
            .filter(|o| o.object_type == object_type)
            .filter(|o| o.data.get("parent").and_then(Value::as_u64) == Some(parent.get()))
            .map(|o| o.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn read_meta(&self, id: ObjectId) -> Result<Vec<RawMeta>, StoreError> {
        self.state.lock().unwrap().ops.push(Op::ReadMeta(id));
        Ok(self.stored_meta(id))
    }

    fn add_meta(&self, id: ObjectId, key: &str, value: &Value) -> Result<MetaId, StoreError> {
        let mut s = self.state.lock().unwrap();
        if s.fail_meta_writes {
            return Err(StoreError::Backend("meta writes disabled".into()));
        }
        s.next_meta_id += 1;
        let meta_id = MetaId::new(s.next_meta_id);
        s.meta.push((
            id,
            RawMeta { meta_id, meta_key: key.into(), meta_value: value.clone() },
        ));
        s.ops.push(Op::AddMeta(id, key.into()));
        Ok(meta_id)
    }

    fn update_meta(&self, id: ObjectId, meta_id: MetaId, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut s = self.state.lock().unwrap();
        if let Some((_, m)) = s.meta.iter_mut().find(|(_, m)| m.meta_id == meta_id) {
            m.meta_key = key.into();
            m.meta_value = value.clone();
        }
        s.ops.push(Op::UpdateMeta(id, meta_id));
        Ok(())
    }

    fn delete_meta(&self, id: ObjectId, meta_id: MetaId) -> Result<(), StoreError> {
        let mut s = self.state.lock().unwrap();
        s.meta.retain(|(_, m)| m.meta_id != meta_id);
        s.ops.push(Op::DeleteMeta(id, meta_id));
        Ok(())
    }
}

// ── A minimal concrete entity ────────────────────────────────────

pub fn note_schema() -> Arc<DataSchema> {
    static SCHEMA: OnceLock<Arc<DataSchema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Arc::new(
                DataSchema::new("note")
                    .data_type("note")
                    .prop("title", "")
                    .prop("status", "draft")
                    .prop("count", 0)
                    .extra("color", "plain"),
            )
        })
        .clone()
}

#[derive(Debug)]
pub struct Note {
    data: MeshData,
}

impl Note {
    pub fn new() -> Self {
        Self { data: MeshData::new(note_schema()) }
    }

    pub fn with_store(store: Arc<RecordingStore>) -> Self {
        Self { data: MeshData::new(note_schema()).with_store(store) }
    }

    pub fn from_data(data: MeshData) -> Self {
        Self { data }
    }

    pub fn set_title(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value {
            Value::String(s) => {
                self.data.set_prop("title", s);
                Ok(())
            }
            _ => MeshData::error("invalid_title", "title must be a string"),
        }
    }

    pub fn set_status(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value.as_str() {
            Some("draft") | Some("publish") => {
                self.data.set_prop("status", value);
                Ok(())
            }
            _ => MeshData::error("invalid_status", format!("unknown status {value}")),
        }
    }

    pub fn set_count(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value.as_u64() {
            Some(n) => {
                self.data.set_prop("count", n);
                Ok(())
            }
            None => MeshData::error("invalid_count", "count must be a non-negative integer"),
        }
    }

    pub fn set_color(&mut self, value: Value) -> Result<(), MeshDataError> {
        self.data.set_prop("color", value);
        Ok(())
    }
}

const NOTE_SETTERS: &[(&str, Setter<Note>)] = &[
    ("title", Note::set_title),
    ("status", Note::set_status),
    ("count", Note::set_count),
    ("color", Note::set_color),
];

impl MeshObject for Note {
    fn mesh_data(&self) -> &MeshData {
        &self.data
    }

    fn mesh_data_mut(&mut self) -> &mut MeshData {
        &mut self.data
    }

    fn setters() -> &'static [(&'static str, Setter<Self>)] {
        NOTE_SETTERS
    }

    fn create(&mut self) -> MeshResult<()> {
        self.data.insert_into_store()?;
        Ok(())
    }

    fn update(&mut self) -> MeshResult<()> {
        self.data.update_in_store()
    }
}
