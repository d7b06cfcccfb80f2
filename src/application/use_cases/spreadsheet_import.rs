// ============================================================
// SPREADSHEET IMPORT USE CASE
// ============================================================
// Probe a row sample for the schema, then load a sheet in full or in chunks

use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::error::{AppError, Result};
use crate::domain::import_config::{ImportConfig, ImportOverrides};
use crate::domain::table::{normalize_header, ColumnSchema, ColumnType, Table};
use crate::infrastructure::spreadsheet::{CalamineSheet, SheetRow, SheetSelector, SheetSource};
use crate::infrastructure::storage::{FileStore, LocalFileStore};
use crate::shared::timing::timed;

/// Data rows read (after the header) to probe the schema
pub const SAMPLE_ROWS: usize = 10;

/// A verified workbook with its probed schema
#[derive(Debug, Clone)]
pub struct PreparedSheet {
    pub resolved_path: PathBuf,
    pub sheet: SheetSelector,
    pub schema: ColumnSchema,
}

/// Spreadsheet import orchestrator
pub struct SpreadsheetImportUseCase {
    config: ImportConfig,
    store: Box<dyn FileStore>,
}

impl SpreadsheetImportUseCase {
    pub fn new(config: ImportConfig, store: Box<dyn FileStore>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid import config: {}", e)))?;
        Ok(Self { config, store })
    }

    pub fn with_local_store(config: ImportConfig) -> Result<Self> {
        Self::new(config, Box::new(LocalFileStore))
    }

    pub fn prepare(&self, input_file: &str, overrides: &ImportOverrides) -> Result<PreparedSheet> {
        let config = self.config.with_overrides(overrides);
        let full_path = self.store.join_path(&config.input_path, input_file);
        self.store.check_if_file_exists(&full_path)?;

        let sheet = SheetSelector::parse(&config.input_sheet);
        let mut source = CalamineSheet::new(&full_path, sheet.clone());
        let schema = probe_schema(&mut source, &config.type_hints)?;

        Ok(PreparedSheet {
            resolved_path: full_path,
            sheet,
            schema,
        })
    }

    pub fn load_full(&self, input_file: &str, overrides: &ImportOverrides) -> Result<Table> {
        timed("<import from excel>", || -> Result<Table> {
            let prepared = self.prepare(input_file, overrides)?;
            let mut source = CalamineSheet::new(&prepared.resolved_path, prepared.sheet.clone());
            let table = read_full(&mut source, &prepared.schema)?;

            tracing::info!(
                path = %prepared.resolved_path.display(),
                sheet = %prepared.sheet,
                rows = table.len(),
                "[IMPORT EXCEL] data is fully imported"
            );
            Ok(table)
        })
    }

    pub fn load_chunked(
        &self,
        input_file: &str,
        overrides: &ImportOverrides,
    ) -> Result<SheetChunks<CalamineSheet>> {
        timed("<excel reading generator created>", || -> Result<SheetChunks<CalamineSheet>> {
            let prepared = self.prepare(input_file, overrides)?;
            let source = CalamineSheet::new(&prepared.resolved_path, prepared.sheet.clone());

            tracing::info!(
                path = %prepared.resolved_path.display(),
                sheet = %prepared.sheet,
                chunksize = self.config.chunksize,
                "[IMPORT EXCEL] data is imported as a chunk reader"
            );
            Ok(SheetChunks::new(source, &prepared.schema, self.config.chunksize))
        })
    }
}

/// Header plus a small row sample; every column starts as text and is then
/// narrowed by `hints`. Blank header cells are named `Unnamed: <index>` and
/// repeated names get a numeric suffix.
pub fn probe_schema<S: SheetSource>(
    source: &mut S,
    hints: &HashMap<String, ColumnType>,
) -> Result<ColumnSchema> {
    let columns = normalize_header(source.header()?);

    let sample = source.fetch_rows(0, SAMPLE_ROWS)?;
    if let Some(widest) = sample.iter().map(Vec::len).max() {
        if widest > columns.len() {
            tracing::debug!(
                columns = columns.len(),
                widest,
                "Sample rows are wider than the header; extra cells will be ignored"
            );
        }
    }

    Ok(ColumnSchema::provisional(columns)?.refine(hints))
}

/// Every data row of the sheet in one table
pub fn read_full<S: SheetSource>(source: &mut S, schema: &ColumnSchema) -> Result<Table> {
    let rows = source.fetch_rows(0, usize::MAX)?;
    let mut table = Table::new(schema);
    append_rows(&mut table, rows, 0);
    Ok(table)
}

fn append_rows(table: &mut Table, rows: Vec<SheetRow>, first_row: usize) {
    let width = table.columns.len();
    for (i, mut row) in rows.into_iter().enumerate() {
        row.resize(width, None);
        let fields: Vec<Option<&str>> = row.iter().map(|cell| cell.as_deref()).collect();

        match table.convert_row(&fields) {
            Ok(converted) => table.push_row(converted),
            Err(reason) => {
                tracing::warn!(row = first_row + i, reason = %reason, "Skipping non-conforming row");
            }
        }
    }
}

/// Paged reader over a sheet: each batch is fetched when requested by
/// advancing a data-row offset; iteration ends at the first empty fetch.
pub struct SheetChunks<S: SheetSource> {
    source: S,
    template: Table,
    offset: usize,
    chunksize: usize,
    finished: bool,
}

impl<S: SheetSource> SheetChunks<S> {
    pub fn new(source: S, schema: &ColumnSchema, chunksize: usize) -> Self {
        Self {
            source,
            template: Table::new(schema),
            offset: 0,
            chunksize: chunksize.max(1),
            finished: false,
        }
    }
}

impl<S: SheetSource> Iterator for SheetChunks<S> {
    type Item = Result<Table>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let rows = match self.source.fetch_rows(self.offset, self.chunksize) {
            Ok(rows) => rows,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };
        if rows.is_empty() {
            self.finished = true;
            return None;
        }

        let mut table = self.template.clone();
        append_rows(&mut table, rows, self.offset);
        self.offset += self.chunksize;
        Some(Ok(table))
    }
}
