use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};

use super::{SheetRow, SheetSelector, SheetSource};
use crate::domain::error::{AppError, Result};

/// `SheetSource` reading xlsx/xls/ods files through calamine.
///
/// Every fetch reopens the workbook, so no sheet data is held between
/// batches.
pub struct CalamineSheet {
    path: PathBuf,
    sheet: SheetSelector,
}

impl CalamineSheet {
    pub fn new(path: &Path, sheet: SheetSelector) -> Self {
        Self {
            path: path.to_path_buf(),
            sheet,
        }
    }

    fn read_range(&self) -> Result<Range<Data>> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            AppError::SpreadsheetError(format!(
                "Failed to open workbook {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let index = match &self.sheet {
            SheetSelector::Index(index) => *index,
            SheetSelector::Name(name) => workbook
                .sheet_names()
                .iter()
                .position(|candidate| candidate == name)
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Sheet '{}' not found in {}",
                        name,
                        self.path.display()
                    ))
                })?,
        };

        workbook
            .worksheet_range_at(index)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Sheet {} not found in {}",
                    self.sheet,
                    self.path.display()
                ))
            })?
            .map_err(|e| {
                AppError::SpreadsheetError(format!("Failed to read sheet {}: {}", self.sheet, e))
            })
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl SheetSource for CalamineSheet {
    fn header(&mut self) -> Result<Vec<String>> {
        let range = self.read_range()?;
        let header = range.rows().next().ok_or_else(|| {
            AppError::ValidationError(format!("Sheet {} is empty", self.sheet))
        })?;

        Ok(header
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default().trim().to_string())
            .collect())
    }

    fn fetch_rows(&mut self, offset: usize, limit: usize) -> Result<Vec<SheetRow>> {
        let range = self.read_range()?;
        Ok(range
            .rows()
            .skip(1)
            .skip(offset)
            .take(limit)
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }
}
