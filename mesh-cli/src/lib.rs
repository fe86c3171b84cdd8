//! Shared pieces of the `mesh` binary: config loading and the commands it
//! runs against a store.

pub mod commands;
pub mod config;

pub use commands::{create_section, delete_meta, set_meta, show, Entity};
pub use config::{LoggingConfig, MeshConfig, StorageConfig};
