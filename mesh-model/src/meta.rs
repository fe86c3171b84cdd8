use crate::store::RawMeta;
use mesh_types::MetaId;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Where a cached meta entry stands relative to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaState {
    /// Added in memory, no row yet.
    Unsaved,
    /// Backed by a stored row.
    Persisted(MetaId),
    /// Logically deleted; the row (if any) goes on the next meta save.
    PendingDelete(Option<MetaId>),
}

/// A key/value pair attached to an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaEntry {
    pub key: String,
    pub value: Value,
    pub state: MetaState,
}

impl MetaEntry {
    pub fn unsaved(key: &str, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
            state: MetaState::Unsaved,
        }
    }

    pub fn persisted(id: MetaId, key: &str, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
            state: MetaState::Persisted(id),
        }
    }

    /// The backing row id, kept through a pending delete.
    pub fn id(&self) -> Option<MetaId> {
        match self.state {
            MetaState::Unsaved => None,
            MetaState::Persisted(id) => Some(id),
            MetaState::PendingDelete(id) => id,
        }
    }

    pub fn is_pending_delete(&self) -> bool {
        matches!(self.state, MetaState::PendingDelete(_))
    }

    /// Marks the entry for deletion on the next flush.
    pub fn mark_deleted(&mut self) {
        self.state = MetaState::PendingDelete(self.id());
    }
}

impl From<RawMeta> for MetaEntry {
    fn from(raw: RawMeta) -> Self {
        Self {
            key: raw.meta_key,
            value: raw.meta_value,
            state: MetaState::Persisted(raw.meta_id),
        }
    }
}

// Serialized as `{id, key, value}`; `id` is null until the entry is stored.
impl Serialize for MetaEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("MetaEntry", 3)?;
        s.serialize_field("id", &self.id())?;
        s.serialize_field("key", &self.key)?;
        s.serialize_field("value", &self.value)?;
        s.end()
    }
}
