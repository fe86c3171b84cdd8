use mesh_model::{DataStore, StoreError};
use mesh_types::ObjectId;
use mesh_storage::{MemoryStore, SqliteStore};
use rusqlite::{params, Connection};
use serde_json::{json, Map};
use tempfile::TempDir;

#[test]
fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mesh.db");

    let (id, mid) = {
        let store = SqliteStore::open(&path).unwrap();
        let mut data = Map::new();
        data.insert("title".into(), json!("Persisted"));
        let id = store.create_object("section", &data).unwrap();
        let mid = store.add_meta(id, "_mcs_collapse", &json!("1")).unwrap();
        (id, mid)
    };

    let store = SqliteStore::open(&path).unwrap();
    let stored = store.read_object(id).unwrap().unwrap();
    assert_eq!(stored.data["title"], json!("Persisted"));
    let meta = store.read_meta(id).unwrap();
    assert_eq!(meta[0].meta_id, mid);
    assert_eq!(meta[0].meta_value, json!("1"));
}

#[test]
fn non_json_meta_reads_as_string() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mesh.db");
    let store = SqliteStore::open(&path).unwrap();
    let id = store.create_object("block", &Map::new()).unwrap();

    // A row written by something other than this crate.
    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO mesh_meta (object_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
        params![id.get() as i64, "_mcs_css_class", "plain text"],
    )
    .unwrap();

    let meta = store.read_meta(id).unwrap();
    assert_eq!(meta[0].meta_value, json!("plain text"));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let store = SqliteStore::open_in_memory().unwrap();
    let a = store.create_object("block", &Map::new()).unwrap();
    store.delete_object(a).unwrap();
    let b = store.create_object("block", &Map::new()).unwrap();
    assert!(b > a);

    let memory = MemoryStore::new();
    let a = memory.create_object("block", &Map::new()).unwrap();
    memory.delete_object(a).unwrap();
    assert!(memory.create_object("block", &Map::new()).unwrap() > a);
    assert_eq!(memory.len(), 1);
}

#[test]
fn ids_past_sqlite_range_are_not_found() {
    let store = SqliteStore::open_in_memory().unwrap();
    let existing = store.create_object("block", &Map::new()).unwrap();
    let huge = ObjectId::absint(i64::MIN);
    assert_eq!(huge.get(), 1u64 << 63);

    let not_found = |e: StoreError| matches!(e, StoreError::NotFound(id) if id == huge);
    assert!(not_found(store.read_object(huge).unwrap_err()));
    assert!(not_found(store.update_object(huge, "block", &Map::new()).unwrap_err()));
    assert!(not_found(store.delete_object(huge).unwrap_err()));
    assert!(not_found(store.read_meta(huge).unwrap_err()));
    assert!(not_found(store.add_meta(huge, "_mcs_k", &json!(1)).unwrap_err()));

    let mut data = Map::new();
    data.insert("parent".into(), json!(huge.get()));
    assert!(not_found(store.create_object("block", &data).unwrap_err()));

    // Nothing wrapped around onto a real row.
    assert!(store.read_object(existing).unwrap().is_some());
    assert!(store.read_meta(existing).unwrap().is_empty());
}
