//! Operations behind the `mesh` subcommands.

use anyhow::{anyhow, bail, Result};
use mesh_model::{Context, DataStore, MeshData, MeshObject, MeshResult};
use mesh_sections::{ensure_section_blocks, Block, Section, BLOCK_TYPE, SECTION_TYPE};
use mesh_types::ObjectId;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

/// A stored object loaded as its concrete entity type.
#[derive(Debug)]
pub enum Entity {
    Section(Section),
    Block(Block),
}

impl Entity {
    pub fn load(store: Arc<dyn DataStore>, id: ObjectId) -> Result<Self> {
        let stored = store
            .read_object(id)?
            .ok_or_else(|| anyhow!("no object with id {id}"))?;

        match stored.object_type.as_str() {
            SECTION_TYPE => Ok(Self::Section(Section::load(store, id)?)),
            BLOCK_TYPE => Ok(Self::Block(Block::load(store, id)?)),
            other => bail!("object {id} has unsupported type {other:?}"),
        }
    }

    pub fn data_mut(&mut self) -> &mut MeshData {
        match self {
            Self::Section(section) => section.mesh_data_mut(),
            Self::Block(block) => block.mesh_data_mut(),
        }
    }
}

/// The aggregate data of an object. Sections carry their blocks under
/// `blocks`.
pub fn show(store: Arc<dyn DataStore>, id: ObjectId) -> Result<Value> {
    match Entity::load(store, id)? {
        Entity::Section(mut section) => {
            let mut out = section.mesh_data_mut().get_data()?;
            let blocks = section
                .blocks()?
                .into_iter()
                .map(|mut block| block.mesh_data_mut().get_data().map(Value::Object))
                .collect::<MeshResult<Vec<_>>>()?;
            out.insert("blocks".into(), Value::Array(blocks));
            Ok(Value::Object(out))
        }
        Entity::Block(mut block) => Ok(Value::Object(block.mesh_data_mut().get_data()?)),
    }
}

/// Creates a section on `page` along with the blocks its template needs.
pub fn create_section(
    store: Arc<dyn DataStore>,
    page: ObjectId,
    title: &str,
    template: &str,
) -> Result<(Section, Vec<Block>)> {
    let mut props = Map::new();
    props.insert("title".into(), Value::from(title));
    props.insert("parent".into(), Value::from(page.get()));
    props.insert("template".into(), Value::from(template));

    let mut section = Section::new(store);
    section.set_props(&props)?;
    let blocks = ensure_section_blocks(&mut section)?;
    info!("Created section {} on page {}", section.get_id(), page);
    Ok((section, blocks))
}

/// Sets `key` on an object, replacing earlier values. `raw` is stored as
/// JSON when it parses as JSON, else as a string.
pub fn set_meta(store: Arc<dyn DataStore>, id: ObjectId, key: &str, raw: &str) -> Result<()> {
    let mut entity = Entity::load(store, id)?;
    let data = entity.data_mut();
    data.update_meta_data(key, parse_meta_value(raw), None)?;
    data.save_meta_data()?;
    Ok(())
}

/// Removes every value under `key`. Returns false when there was none.
pub fn delete_meta(store: Arc<dyn DataStore>, id: ObjectId, key: &str) -> Result<bool> {
    let mut entity = Entity::load(store, id)?;
    let data = entity.data_mut();
    if data.get_meta(key, Context::Edit)?.is_none() {
        return Ok(false);
    }
    data.delete_meta_data(key)?;
    data.save_meta_data()?;
    Ok(true)
}

fn parse_meta_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
