// ============================================================
// SCHEMA PROBER
// ============================================================
// Read the header line to establish expected columns

use std::collections::HashMap;
use std::path::Path;

use encoding_rs::Encoding;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{normalize_header, ColumnSchema, ColumnType};

use super::line_reader::EncodedLines;
use super::line_tokenizer::QUOTE;

/// Reads column names from the first line of a delimited file
pub struct SchemaProber {
    separator: char,
    encoding: &'static Encoding,
}

impl SchemaProber {
    pub fn new(separator: char, encoding: &'static Encoding) -> Self {
        Self {
            separator,
            encoding,
        }
    }

    /// Column names from the header. Quoting is ignored for this probe;
    /// surrounding quotes and then spaces are trimmed from each name, and
    /// blank or repeated names are made unique.
    pub fn read_columns(&self, path: &Path) -> Result<Vec<String>> {
        let header = EncodedLines::open(path, self.encoding)?
            .next()
            .transpose()?
            .ok_or_else(|| {
                AppError::ValidationError(format!("File {} is empty", path.display()))
            })?;

        Ok(self.split_header(&header.text))
    }

    pub fn split_header(&self, header: &str) -> Vec<String> {
        normalize_header(
            header
                .split(self.separator)
                .map(|name| name.trim_matches(QUOTE).trim_matches(' ').to_string()),
        )
    }

    /// Every column declared as text, then narrowed by `hints`
    pub fn provisional_schema(
        &self,
        path: &Path,
        hints: &HashMap<String, ColumnType>,
    ) -> Result<ColumnSchema> {
        let columns = self.read_columns(path)?;
        Ok(ColumnSchema::provisional(columns)?.refine(hints))
    }
}
