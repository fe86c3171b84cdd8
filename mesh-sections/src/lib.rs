//! Sections and blocks: the two stored entities a Mesh page is built from.
//!
//! A page owns ordered [`Section`]s; each section owns ordered [`Block`]s and
//! picks a [`ColumnTemplate`] that says how many blocks it lays out.

mod block;
mod section;
mod template;

pub use block::{Block, BLOCK_TYPE};
pub use section::{ensure_section_blocks, sections_for_page, Section, SectionStatus, SECTION_TYPE};
pub use template::ColumnTemplate;

/// Width of a full row, in grid columns.
pub const GRID_COLUMNS: u8 = 12;
