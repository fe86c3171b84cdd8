use crate::block::{Block, BLOCK_TYPE};
use crate::template::ColumnTemplate;
use mesh_model::{
    Context, DataSchema, DataStore, MeshData, MeshDataError, MeshObject, MeshResult, Setter,
    StoreError,
};
use mesh_types::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

pub const SECTION_TYPE: &str = "section";

const META_PUSH_PULL: &str = "_mcs_push_pull";
const META_COLLAPSE: &str = "_mcs_collapse";
const META_EQUAL_HEIGHTS: &str = "_mcs_lp_equal";
const META_TITLE_DISPLAY: &str = "_mcs_title_display";

fn section_schema() -> Arc<DataSchema> {
    static SCHEMA: OnceLock<Arc<DataSchema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Arc::new(
                DataSchema::new(SECTION_TYPE)
                    .data_type(SECTION_TYPE)
                    .prop("title", "")
                    .prop("status", SectionStatus::Draft.as_str())
                    .prop("template", ColumnTemplate::default().file())
                    .prop("css_class", "")
                    .prop("parent", 0)
                    .prop("menu_order", 0)
                    .prop("featured_image", 0),
            )
        })
        .clone()
}

/// Publication state of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    #[default]
    Draft,
    Publish,
}

impl SectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "publish" => Some(Self::Publish),
            _ => None,
        }
    }
}

/// A horizontal band of a page holding one row of blocks.
#[derive(Debug)]
pub struct Section {
    data: MeshData,
}

impl Section {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self::from_data(Self::data_with_store(store))
    }

    /// Wraps prepared entity state, e.g. one carrying hooks.
    pub fn from_data(data: MeshData) -> Self {
        Self { data }
    }

    /// Entity state for a section with the given store.
    pub fn data_with_store(store: Arc<dyn DataStore>) -> MeshData {
        MeshData::new(section_schema()).with_store(store)
    }

    pub fn load(store: Arc<dyn DataStore>, id: ObjectId) -> MeshResult<Self> {
        let mut section = Self::new(store);
        section.read(id)?;
        Ok(section)
    }

    // ── Props ────────────────────────────────────────────────────

    pub fn title(&self) -> String {
        self.data
            .get_prop("title", Context::View)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn status(&self) -> SectionStatus {
        self.edit_str("status")
            .and_then(|s| SectionStatus::parse(&s))
            .unwrap_or_default()
    }

    pub fn template(&self) -> ColumnTemplate {
        self.edit_str("template")
            .and_then(|s| ColumnTemplate::parse(&s))
            .unwrap_or_default()
    }

    pub fn css_class(&self) -> String {
        self.data
            .get_prop("css_class", Context::View)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    /// The page this section belongs to.
    pub fn page(&self) -> ObjectId {
        ObjectId::new(self.edit_u64("parent"))
    }

    pub fn menu_order(&self) -> i64 {
        self.data
            .get_prop("menu_order", Context::Edit)
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    /// Background image attachment, if one is set.
    pub fn featured_image(&self) -> Option<ObjectId> {
        Some(ObjectId::new(self.edit_u64("featured_image"))).filter(ObjectId::is_saved)
    }

    pub fn set_title(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value {
            Value::String(s) => {
                self.data.set_prop("title", s);
                Ok(())
            }
            other => MeshData::error("invalid_section_title", format!("section title must be text, got {other}")),
        }
    }

    pub fn set_status(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value.as_str().and_then(SectionStatus::parse) {
            Some(status) => {
                self.data.set_prop("status", status.as_str());
                Ok(())
            }
            None => MeshData::error(
                "invalid_section_status",
                format!("section status must be draft or publish, got {value}"),
            ),
        }
    }

    /// Accepts a template file name, its stem, or a column count.
    pub fn set_template(&mut self, value: Value) -> Result<(), MeshDataError> {
        let parsed = match &value {
            Value::String(s) => ColumnTemplate::parse(s),
            Value::Number(n) => n.as_u64().and_then(|n| ColumnTemplate::parse(&n.to_string())),
            _ => None,
        };
        match parsed {
            Some(template) => {
                self.data.set_prop("template", template.file());
                Ok(())
            }
            None => MeshData::error("invalid_section_template", format!("unknown section template {value}")),
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

    pub fn set_page(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value.as_u64() {
            Some(id) => {
                self.data.set_prop("parent", id);
                Ok(())
            }
            None => MeshData::error("invalid_section_page", format!("page id must be a non-negative integer, got {value}")),
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

    /// Attachment id of the background image; 0 clears it.
    pub fn set_featured_image(&mut self, value: Value) -> Result<(), MeshDataError> {
        match value.as_u64() {
            Some(id) => {
                self.data.set_prop("featured_image", id);
                Ok(())
            }
            None => MeshData::error(
                "invalid_featured_image",
                format!("featured image must be an attachment id, got {value}"),
            ),
        }
    }

    // ── Display flags (meta) ─────────────────────────────────────

    /// Whether the first two blocks swap places on wide screens.
    pub fn push_pull(&mut self) -> MeshResult<bool> {
        self.flag(META_PUSH_PULL)
    }

    pub fn set_push_pull(&mut self, on: bool) -> MeshResult<()> {
        self.set_flag(META_PUSH_PULL, on)
    }

    /// Whether column gutters are collapsed.
    pub fn collapse(&mut self) -> MeshResult<bool> {
        self.flag(META_COLLAPSE)
    }

    pub fn set_collapse(&mut self, on: bool) -> MeshResult<()> {
        self.set_flag(META_COLLAPSE, on)
    }

    /// Whether the section title is shown above its blocks.
    pub fn title_display(&mut self) -> MeshResult<bool> {
        self.flag(META_TITLE_DISPLAY)
    }

    pub fn set_title_display(&mut self, on: bool) -> MeshResult<()> {
        self.set_flag(META_TITLE_DISPLAY, on)
    }

    /// Row attribute that equalizes block heights, when set.
    pub fn equal_heights(&mut self) -> MeshResult<Option<String>> {
        Ok(self
            .data
            .get_meta(META_EQUAL_HEIGHTS, Context::View)?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.is_empty()))
    }

    pub fn set_equal_heights(&mut self, attribute: Option<&str>) -> MeshResult<()> {
        match attribute {
            Some(attr) => self.data.update_meta_data(META_EQUAL_HEIGHTS, attr, None),
            None => self.data.delete_meta_data(META_EQUAL_HEIGHTS),
        }
    }

    fn flag(&mut self, key: &str) -> MeshResult<bool> {
        Ok(match self.data.get_meta(key, Context::View)? {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => !s.is_empty() && s != "0",
            Some(Value::Number(n)) => n.as_i64() != Some(0),
            _ => false,
        })
    }

    fn set_flag(&mut self, key: &str, on: bool) -> MeshResult<()> {
        if on {
            self.data.update_meta_data(key, "1", None)
        } else {
            self.data.delete_meta_data(key)
        }
    }

    // ── Blocks ───────────────────────────────────────────────────

    /// The section's blocks in display order. Empty for an unsaved section.
    pub fn blocks(&self) -> MeshResult<Vec<Block>> {
        if !self.get_id().is_saved() {
            return Ok(Vec::new());
        }
        let store = self.store()?;
        store
            .children(self.get_id(), BLOCK_TYPE)?
            .into_iter()
            .map(|id| Block::load(store.clone(), id))
            .collect()
    }

    fn store(&self) -> MeshResult<Arc<dyn DataStore>> {
        Ok(self.data.store().cloned().ok_or(StoreError::Unavailable)?)
    }

    fn edit_str(&self, prop: &str) -> Option<String> {
        self.data
            .get_prop(prop, Context::Edit)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    fn edit_u64(&self, prop: &str) -> u64 {
        self.data
            .get_prop(prop, Context::Edit)
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }
}

const SECTION_SETTERS: &[(&str, Setter<Section>)] = &[
    ("title", Section::set_title),
    ("status", Section::set_status),
    ("template", Section::set_template),
    ("css_class", Section::set_css_class),
    ("parent", Section::set_page),
    ("menu_order", Section::set_menu_order),
    ("featured_image", Section::set_featured_image),
];

impl MeshObject for Section {
    fn mesh_data(&self) -> &MeshData {
        &self.data
    }

    fn mesh_data_mut(&mut self) -> &mut MeshData {
        &mut self.data
    }

    fn setters() -> &'static [(&'static str, Setter<Self>)] {
        SECTION_SETTERS
    }

    fn create(&mut self) -> MeshResult<()> {
        self.data.insert_into_store()?;
        Ok(())
    }

    fn update(&mut self) -> MeshResult<()> {
        self.data.update_in_store()
    }
}

/// Sections of a page in display order.
pub fn sections_for_page(store: Arc<dyn DataStore>, page: ObjectId) -> MeshResult<Vec<Section>> {
    store
        .children(page, SECTION_TYPE)?
        .into_iter()
        .map(|id| Section::load(store.clone(), id))
        .collect()
}

/// Makes sure `section` has at least as many blocks as its template lays
/// out, creating the missing ones. Saves the section first if needed.
/// Returns every block, existing ones first. Blocks beyond the template's
/// count are kept.
pub fn ensure_section_blocks(section: &mut Section) -> MeshResult<Vec<Block>> {
    if !section.get_id().is_saved() {
        section.save()?;
    }

    let template = section.template();
    let mut blocks = section.blocks()?;
    let existing = blocks.len();
    if existing >= template.block_count() {
        debug!("Section {} already has {} blocks", section.get_id(), existing);
        return Ok(blocks);
    }

    let store = section.store()?;
    for i in existing..template.block_count() {
        let mut block = Block::new(store.clone());
        block.set_section(Value::from(section.get_id().get()))?;
        block.set_menu_order(Value::from(i as i64))?;
        block.set_column_width(Value::from(template.default_column_width()))?;
        block.set_title(Value::from(format!("Column {}", i + 1)))?;
        block.save()?;
        blocks.push(block);
    }

    info!(
        "Created {} blocks for section {} ({})",
        template.block_count() - existing,
        section.get_id(),
        template
    );
    Ok(blocks)
}
