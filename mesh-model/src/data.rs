use crate::error::{MeshDataError, MeshResult, StoreError};
use crate::handler::DataHooks;
use crate::meta::{MetaEntry, MetaState};
use crate::schema::DataSchema;
use crate::store::{DataStore, RawMeta};
use mesh_types::{MetaId, ObjectId};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Which write path property setters take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// Being populated (fresh object or reading from storage). Writes go
    /// straight into the data map.
    #[default]
    Loading,
    /// Read and handed out. Writes are buffered as pending changes.
    Live,
}

/// What a value is read for. `View` reads pass through the read filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Context {
    #[default]
    View,
    Edit,
}

/// State shared by every stored entity: identity, declared props with
/// change tracking, and the lazily loaded meta cache.
pub struct MeshData {
    id: ObjectId,
    schema: Arc<DataSchema>,
    data: Map<String, Value>,
    default_data: Map<String, Value>,
    changes: Map<String, Value>,
    lifecycle: Lifecycle,
    /// `None` until the first meta access.
    meta_data: Option<Vec<MetaEntry>>,
    store: Option<Arc<dyn DataStore>>,
    hooks: Option<Arc<dyn DataHooks>>,
}

impl MeshData {
    pub fn new(schema: Arc<DataSchema>) -> Self {
        let default_data = schema.defaults();
        Self {
            id: ObjectId::UNSAVED,
            data: default_data.clone(),
            default_data,
            schema,
            changes: Map::new(),
            lifecycle: Lifecycle::Loading,
            meta_data: None,
            store: None,
            hooks: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn DataHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn schema(&self) -> &DataSchema {
        &self.schema
    }

    pub fn store(&self) -> Option<&Arc<dyn DataStore>> {
        self.store.as_ref()
    }

    pub fn hooks(&self) -> Option<&Arc<dyn DataHooks>> {
        self.hooks.as_ref()
    }

    // ── Identity ─────────────────────────────────────────────────

    pub fn get_id(&self) -> ObjectId {
        self.id
    }

    /// Sets the id, coercing negatives to their absolute value.
    pub fn set_id(&mut self, id: i64) {
        self.id = ObjectId::absint(id);
    }

    pub fn set_object_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    // ── Aggregate views ──────────────────────────────────────────

    /// Id, declared props and live meta as one mapping.
    pub fn get_data(&mut self) -> MeshResult<Map<String, Value>> {
        let mut out = Map::new();
        out.insert("id".into(), Value::from(self.id.get()));
        for (k, v) in &self.data {
            out.insert(k.clone(), v.clone());
        }
        let meta = serde_json::to_value(self.get_meta_data()?).map_err(StoreError::from)?;
        out.insert("meta_data".into(), meta);
        Ok(out)
    }

    pub fn to_json(&mut self) -> MeshResult<String> {
        let data = self.get_data()?;
        Ok(serde_json::to_string(&data).map_err(StoreError::from)?)
    }

    /// Every settable prop name, core and extra.
    pub fn get_data_keys(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    pub fn get_extra_data_keys(&self) -> Vec<&str> {
        self.schema.extra_data.keys().map(String::as_str).collect()
    }

    /// Stored prop values, without pending changes.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Stored prop values overlaid with pending changes.
    pub fn merged_data(&self) -> Map<String, Value> {
        let mut merged = self.data.clone();
        for (k, v) in &self.changes {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }

    // ── Props and change tracking ────────────────────────────────

    /// Reads a declared prop, preferring a pending change. Undeclared props
    /// read as `None`.
    pub fn get_prop(&self, prop: &str, context: Context) -> Option<Value> {
        let stored = self.data.get(prop)?;
        let value = match self.changes.get(prop) {
            Some(change) if !change.is_null() => change.clone(),
            _ => stored.clone(),
        };

        Some(match context {
            Context::View => self.filter(prop, value),
            Context::Edit => value,
        })
    }

    /// Writes a declared prop. Undeclared props are ignored.
    pub fn set_prop(&mut self, prop: &str, value: impl Into<Value>) {
        let value = value.into();
        let Some(stored) = self.data.get(prop) else {
            return;
        };

        match self.lifecycle {
            Lifecycle::Loading => {
                self.data.insert(prop.to_string(), value);
            }
            Lifecycle::Live => {
                if *stored != value || self.changes.contains_key(prop) {
                    self.changes.insert(prop.to_string(), value);
                }
            }
        }
    }

    pub fn get_changes(&self) -> &Map<String, Value> {
        &self.changes
    }

    /// Folds pending changes into the stored data and clears the buffer.
    pub fn apply_changes(&mut self) {
        for (k, v) in std::mem::take(&mut self.changes) {
            self.data.insert(k, v);
        }
    }

    /// Restores default values and returns to the loading phase.
    pub fn set_defaults(&mut self) {
        self.data = self.default_data.clone();
        self.changes.clear();
        self.set_object_read(false);
    }

    pub fn set_object_read(&mut self, read: bool) {
        self.lifecycle = if read { Lifecycle::Live } else { Lifecycle::Loading };
    }

    pub fn get_object_read(&self) -> bool {
        self.lifecycle == Lifecycle::Live
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Builds the validation error a setter returns for bad input.
    pub fn error<T>(code: &str, message: impl Into<String>) -> Result<T, MeshDataError> {
        Err(MeshDataError::new(code, message))
    }

    fn filter(&self, name: &str, value: Value) -> Value {
        match &self.hooks {
            Some(hooks) => {
                let hook = format!("{}{}", self.schema.hook_prefix(), name);
                hooks.filter_value(&hook, value, self)
            }
            None => value,
        }
    }

    // ── Meta ─────────────────────────────────────────────────────

    /// Live (not pending-delete) meta entries.
    pub fn get_meta_data(&mut self) -> MeshResult<Vec<&MetaEntry>> {
        self.maybe_read_meta_data()?;
        Ok(self.live_meta().collect())
    }

    /// First live value stored under `key`.
    pub fn get_meta(&mut self, key: &str, context: Context) -> MeshResult<Option<Value>> {
        self.maybe_read_meta_data()?;
        let Some(value) = self.live_meta().find(|m| m.key == key).map(|m| m.value.clone()) else {
            return Ok(None);
        };

        Ok(Some(match context {
            Context::View => self.filter(key, value),
            Context::Edit => value,
        }))
    }

    /// Every live entry stored under `key`.
    pub fn get_meta_all(&mut self, key: &str) -> MeshResult<Vec<MetaEntry>> {
        self.maybe_read_meta_data()?;
        Ok(self.live_meta().filter(|m| m.key == key).cloned().collect())
    }

    /// Appends already-stored rows to the cache.
    pub fn set_meta_data(&mut self, rows: Vec<RawMeta>) -> MeshResult<()> {
        self.maybe_read_meta_data()?;
        self.meta_mut().extend(rows.into_iter().map(MetaEntry::from));
        Ok(())
    }

    /// Adds an entry. With `unique`, existing entries under `key` are
    /// deleted first.
    pub fn add_meta_data(&mut self, key: &str, value: impl Into<Value>, unique: bool) -> MeshResult<()> {
        self.maybe_read_meta_data()?;
        if unique {
            self.delete_meta_data(key)?;
        }
        self.meta_mut().push(MetaEntry::unsaved(key, value.into()));
        Ok(())
    }

    /// Replaces the entry with `meta_id` when it is cached, otherwise adds
    /// `key` as a unique entry.
    pub fn update_meta_data(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        meta_id: Option<MetaId>,
    ) -> MeshResult<()> {
        self.maybe_read_meta_data()?;
        let value = value.into();

        if let Some(mid) = meta_id {
            if let Some(entry) = self.meta_mut().iter_mut().find(|m| m.id() == Some(mid)) {
                *entry = MetaEntry::persisted(mid, key, value);
                return Ok(());
            }
        }

        self.add_meta_data(key, value, true)
    }

    /// Marks every entry under `key` for deletion.
    pub fn delete_meta_data(&mut self, key: &str) -> MeshResult<()> {
        self.maybe_read_meta_data()?;
        self.meta_mut()
            .iter_mut()
            .filter(|m| m.key == key)
            .for_each(MetaEntry::mark_deleted);
        Ok(())
    }

    /// Marks the entry backed by row `mid` for deletion.
    pub fn delete_meta_data_by_mid(&mut self, mid: MetaId) -> MeshResult<()> {
        self.maybe_read_meta_data()?;
        self.meta_mut()
            .iter_mut()
            .filter(|m| m.id() == Some(mid))
            .for_each(MetaEntry::mark_deleted);
        Ok(())
    }

    /// Loads meta from the store. Without `force` this is a no-op once the
    /// cache is populated.
    pub fn read_meta_data(&mut self, force: bool) -> MeshResult<()> {
        if self.meta_data.is_some() && !force {
            return Ok(());
        }

        let mut entries = Vec::new();
        if let (true, Some(store)) = (self.id.is_saved(), &self.store) {
            let rows = store.read_meta(self.id)?;
            debug!("Read {} meta rows for {} {}", rows.len(), self.schema.object_type, self.id);
            entries.extend(rows.into_iter().map(MetaEntry::from));
        }
        self.meta_data = Some(entries);
        Ok(())
    }

    /// Flushes the meta cache: deletes pending-delete rows, inserts unsaved
    /// entries, updates the rest, then re-reads from the store.
    pub fn save_meta_data(&mut self) -> MeshResult<()> {
        let Some(store) = self.store.clone() else {
            return Ok(());
        };
        if self.meta_data.is_none() {
            return Ok(());
        }
        if !self.id.is_saved() {
            warn!("Skipping meta save for unsaved {}", self.schema.object_type);
            return Ok(());
        }

        let id = self.id;
        for entry in self.meta_mut().iter_mut() {
            match entry.state {
                MetaState::PendingDelete(Some(mid)) => store.delete_meta(id, mid)?,
                MetaState::PendingDelete(None) => {}
                MetaState::Unsaved => {
                    let mid = store.add_meta(id, &entry.key, &entry.value)?;
                    entry.state = MetaState::Persisted(mid);
                }
                MetaState::Persisted(mid) => store.update_meta(id, mid, &entry.key, &entry.value)?,
            }
        }
        debug!("Saved meta for {} {}", self.schema.object_type, id);

        self.read_meta_data(true)
    }

    /// Returns true once meta has been read into the cache.
    pub fn meta_loaded(&self) -> bool {
        self.meta_data.is_some()
    }

    pub(crate) fn clear_meta_cache(&mut self) {
        self.meta_data = None;
    }

    fn maybe_read_meta_data(&mut self) -> MeshResult<()> {
        self.read_meta_data(false)
    }

    fn live_meta(&self) -> impl Iterator<Item = &MetaEntry> {
        self.meta_data
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|m| !m.is_pending_delete())
    }

    fn meta_mut(&mut self) -> &mut Vec<MetaEntry> {
        self.meta_data.get_or_insert_with(Vec::new)
    }
}

impl fmt::Debug for MeshData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshData")
            .field("id", &self.id)
            .field("object_type", &self.schema.object_type)
            .field("data", &self.data)
            .field("changes", &self.changes)
            .field("lifecycle", &self.lifecycle)
            .field("meta_data", &self.meta_data)
            .field("has_store", &self.store.is_some())
            .field("has_hooks", &self.hooks.is_some())
            .finish()
    }
}
