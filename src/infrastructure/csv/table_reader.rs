// ============================================================
// TABLE READER
// ============================================================
// Bulk-parse a resolved CSV file into typed tables, in full or in chunks

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use encoding_rs::Encoding;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{ColumnSchema, Table, TokenizedLine};

use super::line_reader::EncodedLines;
use super::line_tokenizer::LineTokenizer;

/// Bulk parser bound to a schema. Lines are split with the same tokenizer
/// the validator uses, one physical line per row.
pub struct TableReader {
    tokenizer: LineTokenizer,
    encoding: &'static Encoding,
    schema: ColumnSchema,
}

impl TableReader {
    pub fn new(tokenizer: LineTokenizer, encoding: &'static Encoding, schema: ColumnSchema) -> Self {
        Self {
            tokenizer,
            encoding,
            schema,
        }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Parse every data row of `path` into one table
    pub fn read_all(&self, path: &Path) -> Result<Table> {
        let mut chunks = self.chunks(path, usize::MAX)?;
        let table = chunks.fill()?;

        if chunks.dropped_rows() > 0 {
            tracing::warn!(
                path = %path.display(),
                dropped = chunks.dropped_rows(),
                "Some rows did not conform and were skipped"
            );
        }
        Ok(table)
    }

    /// Lazy sequence of tables with at most `chunksize` rows each
    pub fn chunks(&self, path: &Path, chunksize: usize) -> Result<CsvChunks> {
        if chunksize == 0 {
            return Err(AppError::ValidationError("chunksize must be > 0".to_string()));
        }

        let mut lines = EncodedLines::open(path, self.encoding)?;

        // Column names come from the schema; the header line is only consumed
        lines.next().transpose()?;

        Ok(CsvChunks {
            lines,
            tokenizer: self.tokenizer,
            template: Table::new(&self.schema),
            chunksize,
            dropped: 0,
            finished: false,
        })
    }
}

/// Iterator of table batches over one pass of a file
pub struct CsvChunks {
    lines: EncodedLines<BufReader<File>>,
    tokenizer: LineTokenizer,
    template: Table,
    chunksize: usize,
    dropped: usize,
    finished: bool,
}

impl CsvChunks {
    /// Rows skipped so far because they did not conform
    pub fn dropped_rows(&self) -> usize {
        self.dropped
    }

    /// Read up to `chunksize` conforming rows
    fn fill(&mut self) -> Result<Table> {
        let mut table = self.template.clone();

        while table.len() < self.chunksize {
            let line = match self.lines.next() {
                None => {
                    self.finished = true;
                    break;
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Err(e);
                }
                Some(Ok(line)) => line,
            };

            if line.text.is_empty() {
                tracing::debug!(line = line.index, "Skipping blank line");
                continue;
            }

            let fields = match self.tokenizer.tokenize(&line.text) {
                TokenizedLine::Fields(fields) => fields,
                TokenizedLine::Unbalanced { quote_count } => {
                    self.dropped += 1;
                    tracing::warn!(line = line.index, quote_count, "Skipping row with unbalanced quotes");
                    continue;
                }
            };
            let fields: Vec<Option<&str>> = fields.iter().map(|f| f.as_deref()).collect();

            match table.convert_row(&fields) {
                Ok(row) => table.push_row(row),
                Err(reason) => {
                    self.dropped += 1;
                    tracing::warn!(line = line.index, reason = %reason, "Skipping non-conforming row");
                }
            }
        }

        Ok(table)
    }
}

impl Iterator for CsvChunks {
    type Item = Result<Table>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.fill() {
            Ok(table) if table.is_empty() => {
                self.finished = true;
                None
            }
            Ok(table) => Some(Ok(table)),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import_config::QuotingMode;
    use crate::domain::table::{ColumnType, Value};
    use crate::infrastructure::csv::line_reader::resolve_encoding;
    use crate::infrastructure::csv::line_validator::LineValidator;
    use std::collections::HashMap;

    fn schema(columns: &[&str], hints: HashMap<String, ColumnType>) -> ColumnSchema {
        ColumnSchema::provisional(columns.iter().map(|c| c.to_string()).collect())
            .unwrap()
            .refine(&hints)
    }

    fn reader(columns: &[&str], hints: HashMap<String, ColumnType>, quoting: QuotingMode) -> TableReader {
        TableReader::new(
            LineTokenizer::new(',', quoting),
            resolve_encoding("utf-8").unwrap(),
            schema(columns, hints),
        )
    }

    #[test]
    fn test_read_all_keeps_text_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "id,name\n007,\"Smith, J\"\n008,\n").unwrap();

        let table = reader(&["id", "name"], HashMap::new(), QuotingMode::Honor)
            .read_all(&path)
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "id"), Some(&Value::Text("007".to_string())));
        assert_eq!(table.get(0, "name"), Some(&Value::Text("Smith, J".to_string())));
        assert_eq!(table.get(1, "name"), Some(&Value::Null));
    }

    #[test]
    fn test_non_conforming_rows_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "id,qty\n1,5\n2\n3,lots\n4,6,extra\n5,7\n").unwrap();

        let mut hints = HashMap::new();
        hints.insert("qty".to_string(), ColumnType::Integer);
        let reader = reader(&["id", "qty"], hints, QuotingMode::Honor);

        let mut chunks = reader.chunks(&path, 100).unwrap();
        let table = chunks.next().unwrap().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "qty"), Some(&Value::Integer(7)));
        assert_eq!(chunks.dropped_rows(), 3);
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_unbalanced_row_does_not_swallow_following_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "a,b\n1,\"open\n2,3\n").unwrap();

        let mut chunks = reader(&["a", "b"], HashMap::new(), QuotingMode::Honor)
            .chunks(&path, 10)
            .unwrap();
        let table = chunks.next().unwrap().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "b"), Some(&Value::Text("3".to_string())));
        assert_eq!(chunks.dropped_rows(), 1);
    }

    #[test]
    fn test_escaped_looking_quotes_keep_neighbour_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "a,b\n\"x\"\",1\n2,3\n4,5\n").unwrap();

        let table = reader(&["a", "b"], HashMap::new(), QuotingMode::Honor)
            .read_all(&path)
            .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0, "a"), Some(&Value::Text("x\"".to_string())));
        assert_eq!(table.get(1, "a"), Some(&Value::Text("2".to_string())));
        assert_eq!(table.get(2, "b"), Some(&Value::Text("5".to_string())));
    }

    #[test]
    fn test_loaded_rows_match_lines_the_validator_passes() {
        let encoding = resolve_encoding("utf-8").unwrap();
        let tokenizer = LineTokenizer::new(',', QuotingMode::Honor);
        let validator = LineValidator::new(tokenizer, 2, encoding);
        let dir = tempfile::tempdir().unwrap();

        for edge in ["\"x\"\",1", "\"a\"\"b\",c", "\"he said \"\"hi\"\"\",2"] {
            let path = dir.path().join("edge.csv");
            std::fs::write(&path, format!("a,b\n{}\n2,3\n4,5\n", edge)).unwrap();

            let summary = validator.scan(&path).unwrap();
            assert_eq!(summary.defective_lines, 0, "line {:?}", edge);

            let table = TableReader::new(tokenizer, encoding, schema(&["a", "b"], HashMap::new()))
                .read_all(&path)
                .unwrap();
            assert_eq!(table.len(), summary.total_lines - 1, "line {:?}", edge);
            assert_eq!(table.get(2, "a"), Some(&Value::Text("4".to_string())));
        }
    }

    #[test]
    fn test_quotes_are_content_when_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "a,b\n\"x,y\"\n").unwrap();

        let table = reader(&["a", "b"], HashMap::new(), QuotingMode::Ignore)
            .read_all(&path)
            .unwrap();
        assert_eq!(table.get(0, "a"), Some(&Value::Text("\"x".to_string())));
        assert_eq!(table.get(0, "b"), Some(&Value::Text("y\"".to_string())));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "a\n1\n\n2\n").unwrap();

        let mut chunks = reader(&["a"], HashMap::new(), QuotingMode::Honor)
            .chunks(&path, 10)
            .unwrap();
        assert_eq!(chunks.next().unwrap().unwrap().len(), 2);
        assert_eq!(chunks.dropped_rows(), 0);
    }

    #[test]
    fn test_chunks_split_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "a\n1\n2\n3\n4\n5\n").unwrap();

        let sizes: Vec<usize> = reader(&["a"], HashMap::new(), QuotingMode::Honor)
            .chunks(&path, 2)
            .unwrap()
            .map(|chunk| chunk.unwrap().len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_zero_chunksize_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "a\n1\n").unwrap();

        let result = reader(&["a"], HashMap::new(), QuotingMode::Honor).chunks(&path, 0);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
