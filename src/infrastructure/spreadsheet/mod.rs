// ============================================================
// SPREADSHEET INFRASTRUCTURE LAYER
// ============================================================
// Row-window access to workbook sheets

mod workbook;

pub use workbook::CalamineSheet;

use crate::domain::error::Result;

/// One sheet row; `None` marks an empty cell
pub type SheetRow = Vec<Option<String>>;

/// Which sheet of a workbook to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl SheetSelector {
    /// Digits select by zero-based index, anything else by name
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSelector::Index(index) => write!(f, "#{}", index),
            SheetSelector::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Source of header and data rows for the spreadsheet importer
pub trait SheetSource {
    /// First row of the sheet
    fn header(&mut self) -> Result<Vec<String>>;

    /// Up to `limit` data rows starting at data row `offset` (header excluded).
    /// An empty result means the sheet is exhausted.
    fn fetch_rows(&mut self, offset: usize, limit: usize) -> Result<Vec<SheetRow>>;
}
