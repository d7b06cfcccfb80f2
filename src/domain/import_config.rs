// ============================================================
// IMPORT CONFIGURATION
// ============================================================
// Reader options shared by the CSV and spreadsheet importers

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::table::ColumnType;

/// How quote characters are treated while tokenizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotingMode {
    /// Quotes delimit content that may contain the separator
    Honor,

    /// Quotes are ordinary content
    Ignore,
}

/// Configuration for tabular import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Base directory that input file names are joined onto (default: ".")
    pub input_path: PathBuf,

    /// Charset label understood by encoding_rs (default: "utf-8")
    pub input_encoding: String,

    /// Field delimiter (default: ',')
    pub input_sep: char,

    /// true: quotes are content; false: quotes are structure (default: false)
    pub quote_none: bool,

    /// Rows per chunk for chunked loads (default: 10000)
    pub chunksize: usize,

    /// Sheet name, or zero-based sheet index written as digits (default: "0").
    /// A bare integer (`input_sheet = 2`) is read as an index.
    #[serde(deserialize_with = "sheet_name_or_index")]
    pub input_sheet: String,

    /// Declared types for columns that should not stay as text
    pub type_hints: HashMap<String, ColumnType>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("."),
            input_encoding: "utf-8".to_string(),
            input_sep: ',',
            quote_none: false,
            chunksize: 10_000,
            input_sheet: "0".to_string(),
            type_hints: HashMap::new(),
        }
    }
}

impl ImportConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quoting_mode(&self) -> QuotingMode {
        if self.quote_none {
            QuotingMode::Ignore
        } else {
            QuotingMode::Honor
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.chunksize == 0 {
            return Err("chunksize must be > 0".to_string());
        }
        if self.input_sep == '"' {
            return Err("input_sep cannot be the quote character".to_string());
        }
        if self.input_sep == '\n' || self.input_sep == '\r' {
            return Err("input_sep cannot be a line terminator".to_string());
        }
        if !self.input_sep.is_ascii() {
            return Err("input_sep must be a single ASCII character".to_string());
        }
        if self.input_encoding.trim().is_empty() {
            return Err("input_encoding must not be empty".to_string());
        }
        Ok(())
    }

    /// Apply per-call overrides on top of this configuration
    pub fn with_overrides(&self, overrides: &ImportOverrides) -> Self {
        let mut config = self.clone();
        if let Some(path) = &overrides.input_path {
            config.input_path = path.clone();
        }
        if let Some(sep) = overrides.input_sep {
            config.input_sep = sep;
        }
        if let Some(encoding) = &overrides.input_encoding {
            config.input_encoding = encoding.clone();
        }
        if let Some(sheet) = &overrides.input_sheet {
            config.input_sheet = sheet.clone();
        }
        config
    }
}

fn sheet_name_or_index<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SheetValue {
        Index(u64),
        Name(String),
    }

    Ok(match SheetValue::deserialize(deserializer)? {
        SheetValue::Index(index) => index.to_string(),
        SheetValue::Name(name) => name,
    })
}

/// Per-call replacements for configured reader options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOverrides {
    pub input_path: Option<PathBuf>,
    pub input_sep: Option<char>,
    pub input_encoding: Option<String>,
    pub input_sheet: Option<String>,
}
