use crate::GRID_COLUMNS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column layout of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnTemplate {
    #[default]
    One,
    Two,
    Three,
}

impl ColumnTemplate {
    pub const ALL: [ColumnTemplate; 3] = [Self::One, Self::Two, Self::Three];

    /// Template file name, as stored on a section.
    pub fn file(&self) -> &'static str {
        match self {
            Self::One => "mcs-columns-1.php",
            Self::Two => "mcs-columns-2.php",
            Self::Three => "mcs-columns-3.php",
        }
    }

    /// Number of blocks the template lays out.
    pub fn block_count(&self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Column width a new block gets under this template.
    pub fn default_column_width(&self) -> u8 {
        GRID_COLUMNS / self.block_count() as u8
    }

    /// Accepts a file name (`mcs-columns-2.php`), its stem, or a bare count.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let count = s
            .strip_suffix(".php")
            .unwrap_or(s)
            .strip_prefix("mcs-columns-")
            .unwrap_or(s);
        match count {
            "1" => Some(Self::One),
            "2" => Some(Self::Two),
            "3" => Some(Self::Three),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file())
    }
}

impl FromStr for ColumnTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown column template: {s}"))
    }
}

impl TryFrom<String> for ColumnTemplate {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ColumnTemplate> for String {
    fn from(t: ColumnTemplate) -> Self {
        t.file().to_string()
    }
}
