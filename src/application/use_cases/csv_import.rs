// ============================================================
// CSV IMPORT USE CASE
// ============================================================
// Probe, pre-check, quarantine, then load a CSV file into tables

use std::path::PathBuf;

use encoding_rs::Encoding;

use crate::domain::error::{AppError, Result};
use crate::domain::import_config::{ImportConfig, ImportOverrides, QuotingMode};
use crate::domain::table::{ColumnSchema, Table};
use crate::infrastructure::csv::{
    resolve_encoding, CsvChunks, LineTokenizer, LineValidator, QuarantineReport,
    QuarantineWriter, SchemaProber, TableReader,
};
use crate::infrastructure::storage::{FileStore, LocalFileStore};
use crate::shared::timing::timed;

/// A CSV file that has been checked and is safe to bulk-load
#[derive(Debug, Clone)]
pub struct PreparedCsv {
    /// The input itself, or its clean partition when lines were quarantined
    pub resolved_path: PathBuf,

    /// Provisional schema refined with the configured type hints
    pub schema: ColumnSchema,

    pub separator: char,
    pub quoting: QuotingMode,
    pub encoding: &'static Encoding,

    /// Present when the strict pre-check failed and quarantine ran
    pub quarantine: Option<QuarantineReport>,
}

/// CSV import orchestrator
pub struct CsvImportUseCase {
    config: ImportConfig,
    store: Box<dyn FileStore>,
}

impl CsvImportUseCase {
    pub fn new(config: ImportConfig, store: Box<dyn FileStore>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid import config: {}", e)))?;
        Ok(Self { config, store })
    }

    /// Create with the local file system as the file store
    pub fn with_local_store(config: ImportConfig) -> Result<Self> {
        Self::new(config, Box::new(LocalFileStore))
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Resolve and verify the input, then quarantine defective lines if the
    /// strict pre-check fails.
    pub fn prepare(&self, input_file: &str, overrides: &ImportOverrides) -> Result<PreparedCsv> {
        let config = self.config.with_overrides(overrides);
        config
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid import options: {}", e)))?;

        let full_path = self.store.join_path(&config.input_path, input_file);
        self.store.check_if_file_exists(&full_path)?;

        let encoding = resolve_encoding(&config.input_encoding)?;
        let schema = SchemaProber::new(config.input_sep, encoding)
            .provisional_schema(&full_path, &config.type_hints)?;
        let quoting = config.quoting_mode();

        let validator = LineValidator::new(
            LineTokenizer::new(config.input_sep, quoting),
            schema.len(),
            encoding,
        );

        let quarantine = match validator.strict_precheck(&full_path) {
            Ok(()) => None,
            Err(reason @ AppError::MalformedLine { .. }) => {
                let report = timed("<error lines extraction>", || {
                    QuarantineWriter::new(self.store.as_ref(), &validator).run(&full_path, &reason)
                })?;
                Some(report)
            }
            Err(other) => return Err(other),
        };

        let resolved_path = quarantine
            .as_ref()
            .map(|report| report.resolved_path.clone())
            .unwrap_or(full_path);

        Ok(PreparedCsv {
            resolved_path,
            schema,
            separator: config.input_sep,
            quoting,
            encoding,
            quarantine,
        })
    }

    /// Load the whole file into one table
    pub fn load_full(&self, input_file: &str, overrides: &ImportOverrides) -> Result<Table> {
        timed("<import from csv>", || -> Result<Table> {
            let prepared = self.prepare(input_file, overrides)?;
            let reader = self.table_reader(&prepared);
            let table = reader.read_all(&prepared.resolved_path)?;

            tracing::info!(
                path = %prepared.resolved_path.display(),
                rows = table.len(),
                "[IMPORT CSV] data is fully imported"
            );
            Ok(table)
        })
    }

    /// Lazy sequence of tables of `chunksize` rows. Each call starts a new pass.
    pub fn load_chunked(&self, input_file: &str, overrides: &ImportOverrides) -> Result<CsvChunks> {
        timed("<csv reading generator created>", || -> Result<CsvChunks> {
            let prepared = self.prepare(input_file, overrides)?;
            let reader = self.table_reader(&prepared);
            let chunks = reader.chunks(&prepared.resolved_path, self.config.chunksize)?;

            tracing::info!(
                path = %prepared.resolved_path.display(),
                chunksize = self.config.chunksize,
                "[IMPORT CSV] data is imported as a chunk reader"
            );
            Ok(chunks)
        })
    }

    fn table_reader(&self, prepared: &PreparedCsv) -> TableReader {
        TableReader::new(
            LineTokenizer::new(prepared.separator, prepared.quoting),
            prepared.encoding,
            prepared.schema.clone(),
        )
    }
}
