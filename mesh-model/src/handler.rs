use crate::MeshData;
use serde_json::Value;

/// Optional interceptor an entity is given at construction.
///
/// Most entities do NOT need one. Hooks receive the computed hook name so a
/// single implementation can serve several object types:
/// - `mesh_before_{data_type}_object_save` fires from `save()`
/// - `mesh_get_{object_type}_{prop}` fires on every view-context read of a
///   property or meta value
pub trait DataHooks: Send + Sync {
    /// Called before an entity is persisted. May adjust props or meta.
    fn before_save(&self, hook: &str, data: &mut MeshData) {
        let _ = (hook, data);
    }

    /// Called with the value a view-context read is about to return.
    fn filter_value(&self, hook: &str, value: Value, data: &MeshData) -> Value {
        let _ = (hook, data);
        value
    }
}
