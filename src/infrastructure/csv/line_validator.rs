// ============================================================
// LINE VALIDATOR
// ============================================================
// Classify each line of a file as clean or defective

use std::path::Path;

use encoding_rs::Encoding;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{LineDefect, LineVerdict, TokenizedLine};

use super::line_reader::EncodedLines;
use super::line_tokenizer::LineTokenizer;

/// Line counts from a full, non-failing scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total_lines: usize,
    pub defective_lines: usize,
    /// 0-based index of the first defective line
    pub first_defect: Option<usize>,
}

/// Compares tokenized lines against the expected column count
pub struct LineValidator {
    tokenizer: LineTokenizer,
    expected_columns: usize,
    encoding: &'static Encoding,
}

impl LineValidator {
    pub fn new(
        tokenizer: LineTokenizer,
        expected_columns: usize,
        encoding: &'static Encoding,
    ) -> Self {
        Self {
            tokenizer,
            expected_columns,
            encoding,
        }
    }

    pub fn expected_columns(&self) -> usize {
        self.expected_columns
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn classify(&self, line: &str) -> LineVerdict {
        match self.tokenizer.tokenize(line) {
            TokenizedLine::Unbalanced { quote_count } => {
                LineVerdict::Defective(LineDefect::UnbalancedQuotes { quote_count })
            }
            TokenizedLine::Fields(fields) if fields.len() != self.expected_columns => {
                LineVerdict::Defective(LineDefect::FieldCount {
                    expected: self.expected_columns,
                    found: fields.len(),
                })
            }
            TokenizedLine::Fields(_) => LineVerdict::Clean,
        }
    }

    /// Fail on the first defective line, header included
    pub fn strict_precheck(&self, path: &Path) -> Result<()> {
        for line in EncodedLines::open(path, self.encoding)? {
            let line = line?;
            if let LineVerdict::Defective(defect) = self.classify(&line.text) {
                let message = defect.describe(line.index);
                tracing::info!(
                    path = %path.display(),
                    line = line.index,
                    defect = %defect,
                    "Strict pre-check found a defective line"
                );
                return Err(AppError::MalformedLine {
                    position: line.index,
                    message,
                });
            }
        }
        Ok(())
    }

    /// Count defective lines without stopping
    pub fn scan(&self, path: &Path) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();
        for line in EncodedLines::open(path, self.encoding)? {
            let line = line?;
            summary.total_lines += 1;
            if !self.classify(&line.text).is_clean() {
                summary.defective_lines += 1;
                summary.first_defect.get_or_insert(line.index);
            }
        }
        Ok(summary)
    }
}
