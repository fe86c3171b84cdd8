use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declares an entity type: its hook names and its properties with defaults.
///
/// `data` holds the core properties; `extra_data` the ones a specialised
/// type adds on top. Both become settable props of the entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSchema {
    pub object_type: String,
    /// Used in the pre-save hook name. Defaults to `"data"`.
    #[serde(default = "default_data_type")]
    pub data_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub extra_data: Map<String, Value>,
}

fn default_data_type() -> String {
    "data".to_string()
}

impl DataSchema {
    pub fn new(object_type: &str) -> Self {
        Self {
            object_type: object_type.into(),
            data_type: default_data_type(),
            data: Map::new(),
            extra_data: Map::new(),
        }
    }

    /// Sets the name used in `mesh_before_{data_type}_object_save`.
    pub fn data_type(mut self, data_type: &str) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Declares a core property with its default.
    pub fn prop(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.data.insert(name.into(), default.into());
        self
    }

    /// Declares an extra property with its default.
    pub fn extra(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.extra_data.insert(name.into(), default.into());
        self
    }

    /// Core and extra defaults merged, extra winning on a shared key.
    pub fn defaults(&self) -> Map<String, Value> {
        let mut merged = self.data.clone();
        for (k, v) in &self.extra_data {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }

    /// Prefix of the read filter hooks, `mesh_get_{object_type}_`.
    pub fn hook_prefix(&self) -> String {
        format!("mesh_get_{}_", self.object_type)
    }

    /// Name of the pre-save hook.
    pub fn before_save_hook(&self) -> String {
        format!("mesh_before_{}_object_save", self.data_type)
    }
}
