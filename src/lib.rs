pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use crate::application::{
    CsvImportUseCase, PreparedCsv, PreparedSheet, SheetChunks, SpreadsheetImportUseCase,
};
pub use crate::domain::error::{AppError, Result};
pub use crate::domain::import_config::{ImportConfig, ImportOverrides, QuotingMode};
pub use crate::domain::table::{ColumnSchema, ColumnType, Table, Value};
pub use crate::infrastructure::config::ConfigService;
pub use crate::infrastructure::csv::{CsvChunks, QuarantineReport};
pub use crate::infrastructure::storage::{FileStore, LocalFileStore};
