pub mod use_cases;

pub use use_cases::csv_import::{CsvImportUseCase, PreparedCsv};
pub use use_cases::spreadsheet_import::{PreparedSheet, SheetChunks, SpreadsheetImportUseCase};
