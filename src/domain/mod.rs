pub mod error;
pub mod import_config;

// Tabular import types
pub mod table;
