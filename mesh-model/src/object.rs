use crate::data::MeshData;
use crate::error::{DataErrors, MeshDataError, MeshError, MeshResult, StoreError};
use mesh_types::ObjectId;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// A public setter reachable from [`MeshObject::set_props`].
pub type Setter<T> = fn(&mut T, Value) -> Result<(), MeshDataError>;

/// A concrete stored entity built on [`MeshData`].
///
/// Implementors supply the setter table and the two persistence steps;
/// saving, bulk assignment, loading and deletion are shared.
pub trait MeshObject: Sized + 'static {
    fn mesh_data(&self) -> &MeshData;

    fn mesh_data_mut(&mut self) -> &mut MeshData;

    /// Setters `set_props` may dispatch to, keyed by prop name.
    fn setters() -> &'static [(&'static str, Setter<Self>)];

    /// Writes a new object to storage and assigns its id.
    fn create(&mut self) -> MeshResult<()>;

    /// Writes pending changes of an existing object to storage.
    fn update(&mut self) -> MeshResult<()>;

    /// Checks rules spanning several props, against their pending values.
    /// Runs after `set_props` and before `save`.
    fn validate(&self) -> Result<(), MeshDataError> {
        Ok(())
    }

    fn get_id(&self) -> ObjectId {
        self.mesh_data().get_id()
    }

    /// Fires the pre-save hook, then creates or updates depending on
    /// whether the object already has an id. Returns the id.
    fn save(&mut self) -> MeshResult<ObjectId> {
        let data = self.mesh_data_mut();
        if let Some(hooks) = data.hooks().cloned() {
            let hook = data.schema().before_save_hook();
            hooks.before_save(&hook, data);
        }
        self.validate()?;

        if self.get_id().is_saved() {
            debug!("Updating {} {}", self.mesh_data().schema().object_type, self.get_id());
            self.update()?;
        } else {
            self.create()?;
            debug!("Created {} {}", self.mesh_data().schema().object_type, self.get_id());
        }

        Ok(self.get_id())
    }

    /// Assigns many props through their setters. Null values, `meta_data`
    /// and names without a setter are skipped. Every setter runs; failures
    /// are collected rather than stopping the batch. `validate` runs once
    /// all setters have.
    fn set_props(&mut self, props: &Map<String, Value>) -> Result<(), DataErrors> {
        let mut errors = DataErrors::new();

        for (prop, value) in props {
            if prop == "meta_data" || value.is_null() {
                continue;
            }
            let Some((_, setter)) = Self::setters().iter().find(|(name, _)| *name == prop.as_str()) else {
                continue;
            };
            if let Err(e) = setter(self, value.clone()) {
                errors.add(e);
            }
        }
        if let Err(e) = self.validate() {
            errors.add(e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Replaces this object's state with the stored object `id` and marks
    /// it read.
    fn read(&mut self, id: ObjectId) -> MeshResult<()> {
        let store = self
            .mesh_data()
            .store()
            .cloned()
            .ok_or(StoreError::Unavailable)?;
        let stored = store.read_object(id)?.ok_or(StoreError::NotFound(id))?;

        let expected = &self.mesh_data().schema().object_type;
        if &stored.object_type != expected {
            return Err(MeshError::TypeMismatch {
                id,
                expected: expected.clone(),
                found: stored.object_type,
            });
        }

        let data = self.mesh_data_mut();
        data.set_defaults();
        data.clear_meta_cache();
        data.set_object_id(stored.id);

        // Stored values that no longer validate are kept out rather than
        // failing the whole read.
        if let Err(errors) = self.set_props(&stored.data) {
            warn!("Ignored invalid stored props on {}: {}", id, errors);
        }

        self.mesh_data_mut().set_object_read(true);
        Ok(())
    }

    /// Deletes the object and its meta from storage and resets the id.
    /// Returns false when there was nothing stored to delete.
    fn delete(&mut self) -> MeshResult<bool> {
        let id = self.get_id();
        if !id.is_saved() {
            return Ok(false);
        }
        let Some(store) = self.mesh_data().store().cloned() else {
            return Ok(false);
        };

        let removed = store.delete_object(id)?;
        let data = self.mesh_data_mut();
        data.set_object_id(ObjectId::UNSAVED);
        data.clear_meta_cache();
        debug!("Deleted {} {}", data.schema().object_type, id);
        Ok(removed)
    }
}

impl MeshData {
    /// Inserts the object with its pending changes, then flushes meta.
    /// Shared body for `MeshObject::create` implementations.
    pub fn insert_into_store(&mut self) -> MeshResult<ObjectId> {
        let store = self.store().cloned().ok_or(StoreError::Unavailable)?;
        let id = store.create_object(&self.schema().object_type, &self.merged_data())?;
        self.set_object_id(id);
        self.apply_changes();
        // Live before the meta flush so a retry after a meta failure updates.
        self.set_object_read(true);
        self.save_meta_data()?;
        Ok(id)
    }

    /// Writes pending changes of a stored object, then flushes meta.
    /// An object still loading (id assigned but never read) has its writes
    /// in `data` rather than `changes`, so it is always written in full.
    /// Shared body for `MeshObject::update` implementations.
    pub fn update_in_store(&mut self) -> MeshResult<()> {
        let store = self.store().cloned().ok_or(StoreError::Unavailable)?;
        let id = self.get_id();
        if !self.get_object_read() || !self.get_changes().is_empty() {
            store.update_object(id, &self.schema().object_type, &self.merged_data())?;
        }
        self.apply_changes();
        self.set_object_read(true);
        self.save_meta_data()?;
        Ok(())
    }
}
