mod common;

use common::{note_schema, Note, RecordingStore};
use mesh_model::{Context, DataHooks, MeshData, MeshObject};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

// ── Default implementations ──────────────────────────────────────

struct NoOpHooks;
impl DataHooks for NoOpHooks {}

#[test]
fn default_filter_returns_value_unchanged() {
    let data = MeshData::new(note_schema());
    let hooks = NoOpHooks;
    assert_eq!(hooks.filter_value("mesh_get_note_title", json!("x"), &data), json!("x"));
}

#[test]
fn default_before_save_leaves_data_alone() {
    let mut data = MeshData::new(note_schema());
    NoOpHooks.before_save("mesh_before_note_object_save", &mut data);
    assert_eq!(data.data()["title"], json!(""));
}

// ── Read filters ─────────────────────────────────────────────────

struct UppercaseTitle;
impl DataHooks for UppercaseTitle {
    fn filter_value(&self, hook: &str, value: Value, _data: &MeshData) -> Value {
        match (hook, value.as_str()) {
            ("mesh_get_note_title", Some(s)) => json!(s.to_uppercase()),
            _ => value,
        }
    }
}

#[test]
fn view_reads_are_filtered() {
    let mut data = MeshData::new(note_schema()).with_hooks(Arc::new(UppercaseTitle));
    data.set_prop("title", "quiet");
    assert_eq!(data.get_prop("title", Context::View), Some(json!("QUIET")));
    assert_eq!(data.get_prop("status", Context::View), Some(json!("draft")));
}

#[test]
fn edit_reads_bypass_filter() {
    let mut data = MeshData::new(note_schema()).with_hooks(Arc::new(UppercaseTitle));
    data.set_prop("title", "quiet");
    assert_eq!(data.get_prop("title", Context::Edit), Some(json!("quiet")));
}

struct MetaDefault;
impl DataHooks for MetaDefault {
    fn filter_value(&self, hook: &str, value: Value, _data: &MeshData) -> Value {
        if hook == "mesh_get_note__mcs_css_class" && value == json!("") {
            json!("default-class")
        } else {
            value
        }
    }
}

#[test]
fn meta_view_reads_are_filtered_by_key() {
    let mut data = MeshData::new(note_schema()).with_hooks(Arc::new(MetaDefault));
    data.add_meta_data("_mcs_css_class", "", false).unwrap();
    assert_eq!(data.get_meta("_mcs_css_class", Context::View).unwrap(), Some(json!("default-class")));
    assert_eq!(data.get_meta("_mcs_css_class", Context::Edit).unwrap(), Some(json!("")));
}

// ── Pre-save ─────────────────────────────────────────────────────

#[derive(Default)]
struct StampBeforeSave {
    seen: Mutex<Vec<String>>,
}

impl DataHooks for StampBeforeSave {
    fn before_save(&self, hook: &str, data: &mut MeshData) {
        self.seen.lock().unwrap().push(hook.to_string());
        data.set_prop("status", "publish");
    }
}

#[test]
fn before_save_fires_with_hook_name_and_can_mutate() {
    let store = RecordingStore::new();
    let hooks = Arc::new(StampBeforeSave::default());
    let data = MeshData::new(note_schema())
        .with_store(store.clone())
        .with_hooks(hooks.clone());
    let mut note = Note::from_data(data);

    let id = note.save().unwrap();

    assert_eq!(*hooks.seen.lock().unwrap(), vec!["mesh_before_note_object_save".to_string()]);
    assert_eq!(store.stored(id).unwrap().data["status"], json!("publish"));
}

#[test]
fn before_save_fires_on_every_save() {
    let store = RecordingStore::new();
    let hooks = Arc::new(StampBeforeSave::default());
    let mut note = Note::from_data(
        MeshData::new(note_schema()).with_store(store).with_hooks(hooks.clone()),
    );
    note.save().unwrap();
    note.save().unwrap();
    assert_eq!(hooks.seen.lock().unwrap().len(), 2);
}

// ── Trait object safety ──────────────────────────────────────────

#[test]
fn hooks_work_as_trait_objects() {
    let all: Vec<Arc<dyn DataHooks>> = vec![Arc::new(NoOpHooks), Arc::new(UppercaseTitle)];
    let data = MeshData::new(note_schema());
    let out: Vec<Value> = all
        .iter()
        .map(|h| h.filter_value("mesh_get_note_title", json!("a"), &data))
        .collect();
    assert_eq!(out, vec![json!("a"), json!("A")]);
}
