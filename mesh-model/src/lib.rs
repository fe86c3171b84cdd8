//! Entity base for Mesh sections and blocks.
//!
//! - [`MeshData`]: identity, declared props with deferred-write change
//!   tracking, and a lazily loaded meta cache
//! - [`MeshObject`]: the trait concrete entities implement (setter table,
//!   create/update) and that provides save, bulk set, read and delete
//! - [`DataStore`]: the storage collaborator all persistence goes through
//! - [`DataHooks`]: optional pre-save and read-filter interceptor
//!
//! Props and meta values are JSON values. Nothing here touches a database
//! directly; see `mesh-storage` for backends.

mod data;
mod error;
mod handler;
mod meta;
mod object;
mod schema;
mod store;

pub use data::{Context, Lifecycle, MeshData};
pub use error::{DataErrors, MeshDataError, MeshError, MeshResult, StoreError};
pub use handler::DataHooks;
pub use meta::{MetaEntry, MetaState};
pub use object::{MeshObject, Setter};
pub use schema::DataSchema;
pub use store::{DataStore, RawMeta, StoredObject};
