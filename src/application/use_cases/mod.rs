pub mod csv_import;
pub mod spreadsheet_import;
