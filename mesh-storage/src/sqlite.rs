//! SQLite-backed store.

use crate::error::{StorageError, StorageResult};
use crate::{decode_value, ordering};
use mesh_model::{DataStore, RawMeta, StoreError, StoredObject};
use mesh_types::{MetaId, ObjectId};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS mesh_objects (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    object_type TEXT    NOT NULL,
    parent      INTEGER NOT NULL DEFAULT 0,
    menu_order  INTEGER NOT NULL DEFAULT 0,
    data        TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_mesh_objects_parent
    ON mesh_objects (parent, object_type, menu_order);

CREATE TABLE IF NOT EXISTS mesh_meta (
    meta_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    object_id  INTEGER NOT NULL,
    meta_key   TEXT    NOT NULL,
    meta_value TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_mesh_meta_object ON mesh_meta (object_id);
";

/// SQLite integer for an object id. Ids past `i64::MAX` cannot name a row.
fn object_key(id: ObjectId) -> StorageResult<i64> {
    i64::try_from(id.get()).map_err(|_| StorageError::NotFound(id))
}

/// SQLite integer for a meta row of `owner`.
fn meta_key(owner: ObjectId, meta_id: MetaId) -> StorageResult<i64> {
    i64::try_from(meta_id.get()).map_err(|_| StorageError::NotFound(owner))
}

/// Objects and meta in a single SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> StorageResult<Self> {
        info!("Opening mesh store at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn insert_object(&self, object_type: &str, data: &Map<String, Value>) -> StorageResult<ObjectId> {
        let (parent, menu_order) = ordering(data);
        let parent = object_key(ObjectId::new(parent))?;
        let json = serde_json::to_string(data)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO mesh_objects (object_type, parent, menu_order, data) VALUES (?1, ?2, ?3, ?4)",
            params![object_type, parent, menu_order, json],
        )?;
        let id = ObjectId::new(conn.last_insert_rowid() as u64);
        debug!("Inserted {} {}", object_type, id);
        Ok(id)
    }

    fn write_object(&self, id: ObjectId, data: &Map<String, Value>) -> StorageResult<()> {
        let key = object_key(id)?;
        let (parent, menu_order) = ordering(data);
        let parent = object_key(ObjectId::new(parent))?;
        let json = serde_json::to_string(data)?;
        let changed = self.conn()?.execute(
            "UPDATE mesh_objects SET parent = ?2, menu_order = ?3, data = ?4 WHERE id = ?1",
            params![key, parent, menu_order, json],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    fn select_object(&self, id: ObjectId) -> StorageResult<Option<StoredObject>> {
        let key = object_key(id)?;
        let row = self
            .conn()?
            .query_row(
                "SELECT object_type, data FROM mesh_objects WHERE id = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((object_type, json)) => Ok(Some(StoredObject {
                id,
                object_type,
                data: serde_json::from_str(&json)?,
            })),
            None => Ok(None),
        }
    }

    fn remove_object(&self, id: ObjectId) -> StorageResult<bool> {
        let key = object_key(id)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM mesh_meta WHERE object_id = ?1", params![key])?;
        let removed = tx.execute("DELETE FROM mesh_objects WHERE id = ?1", params![key])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn select_children(&self, parent: ObjectId, object_type: &str) -> StorageResult<Vec<ObjectId>> {
        let parent = object_key(parent)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id FROM mesh_objects WHERE parent = ?1 AND object_type = ?2 ORDER BY menu_order, id",
        )?;
        let ids = stmt
            .query_map(params![parent, object_type], |row| row.get::<_, i64>(0))?
            .map(|id| id.map(|id| ObjectId::new(id as u64)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn select_meta(&self, id: ObjectId) -> StorageResult<Vec<RawMeta>> {
        let key = object_key(id)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT meta_id, meta_key, meta_value FROM mesh_meta WHERE object_id = ?1 ORDER BY meta_id",
        )?;
        let rows = stmt
            .query_map(params![key], |row| {
                Ok(RawMeta {
                    meta_id: MetaId::new(row.get::<_, i64>(0)? as u64),
                    meta_key: row.get(1)?,
                    meta_value: decode_value(&row.get::<_, String>(2)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert_meta(&self, id: ObjectId, key: &str, value: &Value) -> StorageResult<MetaId> {
        let owner = object_key(id)?;
        let json = serde_json::to_string(value)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO mesh_meta (object_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
            params![owner, key, json],
        )?;
        Ok(MetaId::new(conn.last_insert_rowid() as u64))
    }

    fn write_meta(&self, id: ObjectId, meta_id: MetaId, key: &str, value: &Value) -> StorageResult<()> {
        let (row, owner) = (meta_key(id, meta_id)?, object_key(id)?);
        let json = serde_json::to_string(value)?;
        self.conn()?.execute(
            "UPDATE mesh_meta SET meta_key = ?3, meta_value = ?4 WHERE meta_id = ?1 AND object_id = ?2",
            params![row, owner, key, json],
        )?;
        Ok(())
    }

    fn remove_meta(&self, id: ObjectId, meta_id: MetaId) -> StorageResult<()> {
        let (row, owner) = (meta_key(id, meta_id)?, object_key(id)?);
        self.conn()?.execute(
            "DELETE FROM mesh_meta WHERE meta_id = ?1 AND object_id = ?2",
            params![row, owner],
        )?;
        Ok(())
    }
}

impl DataStore for SqliteStore {
    fn create_object(&self, object_type: &str, data: &Map<String, Value>) -> Result<ObjectId, StoreError> {
        Ok(self.insert_object(object_type, data)?)
    }

    fn update_object(&self, id: ObjectId, _object_type: &str, data: &Map<String, Value>) -> Result<(), StoreError> {
        Ok(self.write_object(id, data)?)
    }

    fn read_object(&self, id: ObjectId) -> Result<Option<StoredObject>, StoreError> {
        Ok(self.select_object(id)?)
    }

    fn delete_object(&self, id: ObjectId) -> Result<bool, StoreError> {
        Ok(self.remove_object(id)?)
    }

    fn children(&self, parent: ObjectId, object_type: &str) -> Result<Vec<ObjectId>, StoreError> {
        Ok(self.select_children(parent, object_type)?)
    }

    fn read_meta(&self, id: ObjectId) -> Result<Vec<RawMeta>, StoreError> {
        Ok(self.select_meta(id)?)
    }

    fn add_meta(&self, id: ObjectId, key: &str, value: &Value) -> Result<MetaId, StoreError> {
        Ok(self.insert_meta(id, key, value)?)
    }

    fn update_meta(&self, id: ObjectId, meta_id: MetaId, key: &str, value: &Value) -> Result<(), StoreError> {
        Ok(self.write_meta(id, meta_id, key, value)?)
    }

    fn delete_meta(&self, id: ObjectId, meta_id: MetaId) -> Result<(), StoreError> {
        Ok(self.remove_meta(id, meta_id)?)
    }
}
