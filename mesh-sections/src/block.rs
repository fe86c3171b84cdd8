use crate::GRID_COLUMNS;
use mesh_model::{
    Context, DataSchema, DataStore, MeshData, MeshDataError, MeshObject, MeshResult, Setter,
};
use mesh_types::ObjectId;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

pub const BLOCK_TYPE: &str = "block";

fn block_schema() -> Arc<DataSchema> {
    static SCHEMA: OnceLock<Arc<DataSchema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Arc::new(
                DataSchema::new(BLOCK_TYPE)
                    .data_type(BLOCK_TYPE)
                    .prop("title", "")
                    .prop("content", "")
                    .prop("parent", 0)
                    .prop("menu_order", 0)
                    .prop("column_width", GRID_COLUMNS)
                    .prop("offset", 0)
                    .prop("css_class", ""),
            )
        })
        .clone()
}

/// A column of content inside a section.
#[derive(Debug)]
pub struct Block {
    data: MeshData,
}

impl Block {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self::from_data(MeshData::new(block_schema()).with_store(store))
    }

    /// Wraps prepared entity state, e.g. one carrying hooks.
    pub fn from_data(data: MeshData) -> Self {
        Self { data }
    }

    /// Entity state for a block with the given store.
    pub fn data_with_store(store: Arc<dyn DataStore>) -> MeshData {
        MeshData::new(block_schema()).with_store(store)
    }

    pub fn load(store: Arc<dyn DataStore>, id: ObjectId) -> MeshResult<Self> {
        let mut block = Self::new(store);
        block.read(id)?;
        Ok(block)
    }

    pub fn title(&self) -> String {
        self.str_prop("title")
    }

    pub fn content(&self) -> String {
        self.str_prop("content")
    }

    /// The owning section.
    pub fn section(&self) -> ObjectId {
        ObjectId::new(self.u64_prop("parent"))
    }

    pub fn menu_order(&self) -> i64 {
        self.data
            .get_prop("menu_order", Context::View)
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    pub fn column_width(&self) -> u8 {
        self.u64_prop("column_width") as u8
    }

    pub fn offset(&self) -> u8 {
        self.u64_prop("offset") as u8
    }

    pub fn css_class(&self) -> String {
        self.str_prop("css_class")
    }

    pub fn set_title(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value {
            Value::String(s) => {
                self.data.set_prop("title", s);
                Ok(())
            }
            other => MeshData::error("invalid_block_title", format!("block title must be text, got {other}")),
        }
    }

    pub fn set_content(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value {
            Value::String(s) => {
                self.data.set_prop("content", s);
                Ok(())
            }
            other => MeshData::error("invalid_block_content", format!("block content must be text, got {other}")),
        }
    }

    pub fn set_section(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value.as_u64() {
            Some(id) => {
                self.data.set_prop("parent", id);
                Ok(())
            }
            None => MeshData::error("invalid_block_section", format!("section id must be a non-negative integer, got {value}")),
        }
    }

    pub fn set_menu_order(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value.as_i64() {
            Some(order) => {
                self.data.set_prop("menu_order", order);
                Ok(())
            }
            None => MeshData::error("invalid_menu_order", format!("menu order must be an integer, got {value}")),
        }
    }

    /// Width in grid columns, 1 through 12.
    pub fn set_column_width(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value.as_u64() {
            Some(width) if (1..=u64::from(GRID_COLUMNS)).contains(&width) => {
                self.data.set_prop("column_width", width);
                Ok(())
            }
            _ => MeshData::error(
                "invalid_column_width",
                format!("column width must be between 1 and {GRID_COLUMNS}, got {value}"),
            ),
        }
    }

    /// Leading offset in grid columns. Must stay below the column width;
    /// that is checked by `validate` so both can change in one `set_props`.
    pub fn set_offset(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value.as_u64() {
            Some(offset) if offset < u64::from(GRID_COLUMNS) => {
                self.data.set_prop("offset", offset);
                Ok(())
            }
            _ => MeshData::error(
                "invalid_block_offset",
                format!("offset must be below {GRID_COLUMNS}, got {value}"),
            ),
        }
    }

    pub fn set_css_class(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value {
            Value::String(s) => {
                self.data.set_prop("css_class", s.trim().to_string());
                Ok(())
            }
            other => MeshData::error("invalid_css_class", format!("css class must be text, got {other}")),
        }
    }

    fn str_prop(&self, prop: &str) -> String {
        self.data
            .get_prop(prop, Context::View)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    fn u64_prop(&self, prop: &str) -> u64 {
        self.data
            .get_prop(prop, Context::Edit)
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }
}

const BLOCK_SETTERS: &[(&str, Setter<Block>)] = &[
    ("title", Block::set_title),
    ("content", Block::set_content),
    ("parent", Block::set_section),
    ("menu_order", Block::set_menu_order),
    ("column_width", Block::set_column_width),
    ("offset", Block::set_offset),
    ("css_class", Block::set_css_class),
];

impl MeshObject for Block {
    fn mesh_data(&self) -> &MeshData {
        &self.data
    }

    fn mesh_data_mut(&mut self) -> &mut MeshData {
        &mut self.data
    }

    fn setters() -> &'static [(&'static str, Setter<Self>)] {
        BLOCK_SETTERS
    }

    /// The offset must leave at least one column of the block's width.
    fn validate(&self) -> Result<(), MeshDataError> {
        let (width, offset) = (self.column_width(), self.offset());
        if offset >= width {
            return MeshData::error(
                "invalid_block_offset",
                format!("offset {offset} must be below the column width {width}"),
            );
        }
        Ok(())
    }

    fn create(&mut self) -> MeshResult<()> {
        self.data.insert_into_store()?;
        Ok(())
    }

    fn update(&mut self) -> MeshResult<()> {
        self.data.update_in_store()
    }
}
