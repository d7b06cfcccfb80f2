// ============================================================
// QUARANTINE WRITER
// ============================================================
// Split a file into clean and error partitions in one streaming pass

use std::path::{Path, PathBuf};

use crate::domain::error::{AppError, Result};
use crate::domain::table::LineRecord;
use crate::infrastructure::storage::FileStore;

use super::line_reader::EncodedLines;
use super::line_validator::LineValidator;

/// Buffered characters per partition before a flush to disk
pub const FLUSH_THRESHOLD_CHARS: usize = 5_000_000;

pub const ERROR_LINES_SUFFIX: &str = "_error_lines.csv";
pub const CLEAN_LINES_SUFFIX: &str = "_originalcsv(error_deleted).csv";

/// Outcome of a quarantine pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineReport {
    /// Path that is safe to load: the input itself when nothing was
    /// quarantined, the clean partition otherwise
    pub resolved_path: PathBuf,

    /// Error partition, kept only when defective lines were found
    pub error_file: Option<PathBuf>,

    /// Clean partition, kept only when defective lines were found
    pub clean_file: Option<PathBuf>,

    /// Data lines routed to the clean partition (header excluded)
    pub clean_lines: usize,

    /// Data lines routed to the error partition (header excluded)
    pub error_lines: usize,
}

impl QuarantineReport {
    pub fn quarantined(&self) -> bool {
        self.error_lines > 0
    }
}

/// Append-only buffer in front of one partition file
struct PartitionBuffer {
    path: PathBuf,
    bytes: Vec<u8>,
    chars: usize,
    lines: usize,
    threshold: usize,
}

impl PartitionBuffer {
    fn new(path: PathBuf, threshold: usize) -> Self {
        Self {
            path,
            bytes: Vec::new(),
            chars: 0,
            lines: 0,
            threshold,
        }
    }

    fn push(&mut self, store: &dyn FileStore, line: &LineRecord) -> Result<()> {
        self.bytes.extend_from_slice(&line.raw);
        self.chars += line.char_len();
        self.lines += 1;

        if self.chars > self.threshold {
            self.flush(store)?;
        }
        Ok(())
    }

    fn flush(&mut self, store: &dyn FileStore) -> Result<()> {
        if self.bytes.is_empty() {
            return Ok(());
        }
        store.store_file(&self.path, &self.bytes, false)?;
        self.bytes.clear();
        self.chars = 0;
        Ok(())
    }
}

/// Routes every data line of a file to the clean or the error partition
pub struct QuarantineWriter<'a> {
    store: &'a dyn FileStore,
    validator: &'a LineValidator,
    flush_threshold: usize,
}

impl<'a> QuarantineWriter<'a> {
    pub fn new(store: &'a dyn FileStore, validator: &'a LineValidator) -> Self {
        Self {
            store,
            validator,
            flush_threshold: FLUSH_THRESHOLD_CHARS,
        }
    }

    /// Set the per-partition flush threshold (in characters)
    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold;
        self
    }

    /// Sibling artifact paths for `input`: (error lines, clean lines)
    pub fn partition_paths(&self, input: &Path) -> (PathBuf, PathBuf) {
        let dir = input.parent().unwrap_or_else(|| Path::new(""));
        let stem = self.store.get_main_file_name(input);
        (
            self.store.join_path(dir, &format!("{}{}", stem, ERROR_LINES_SUFFIX)),
            self.store.join_path(dir, &format!("{}{}", stem, CLEAN_LINES_SUFFIX)),
        )
    }

    /// Partition `input`. `reason` is the error that triggered quarantine
    /// and is only used for reporting.
    pub fn run(&self, input: &Path, reason: &AppError) -> Result<QuarantineReport> {
        let (error_path, clean_path) = self.partition_paths(input);
        let mut lines = EncodedLines::open(input, self.validator.encoding())?;

        let header = lines.next().transpose()?.ok_or_else(|| {
            AppError::ValidationError(format!("File {} is empty", input.display()))
        })?;
        self.store.store_file(&error_path, &header.raw, true)?;
        self.store.store_file(&clean_path, &header.raw, true)?;

        let mut errors = PartitionBuffer::new(error_path, self.flush_threshold);
        let mut clean = PartitionBuffer::new(clean_path, self.flush_threshold);

        for line in lines {
            let line = line?;
            if self.validator.classify(&line.text).is_clean() {
                clean.push(self.store, &line)?;
            } else {
                errors.push(self.store, &line)?;
            }
        }

        errors.flush(self.store)?;
        clean.flush(self.store)?;

        if errors.lines == 0 {
            self.store.remove_file(&errors.path)?;
            self.store.remove_file(&clean.path)?;
            tracing::info!(
                path = %input.display(),
                "No defective lines found, quarantine artifacts removed"
            );
            return Ok(QuarantineReport {
                resolved_path: input.to_path_buf(),
                error_file: None,
                clean_file: None,
                clean_lines: clean.lines,
                error_lines: 0,
            });
        }

        tracing::warn!(
            reason = %reason,
            error_file = %errors.path.display(),
            error_lines = errors.lines,
            clean_lines = clean.lines,
            "Defective lines were not imported and were stored separately"
        );

        Ok(QuarantineReport {
            resolved_path: clean.path.clone(),
            error_file: Some(errors.path),
            clean_file: Some(clean.path),
            clean_lines: clean.lines,
            error_lines: errors.lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import_config::QuotingMode;
    use crate::infrastructure::csv::line_reader::resolve_encoding;
    use crate::infrastructure::csv::line_tokenizer::LineTokenizer;
    use crate::infrastructure::storage::LocalFileStore;
    use std::collections::HashSet;
    use std::fs;

    fn validator(expected: usize) -> LineValidator {
        LineValidator::new(
            LineTokenizer::new(',', QuotingMode::Honor),
            expected,
            resolve_encoding("utf-8").unwrap(),
        )
    }

    fn reason() -> AppError {
        AppError::MalformedLine {
            position: 1,
            message: "test".to_string(),
        }
    }

    #[test]
    fn test_defective_lines_are_split_out() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("orders.csv");
        fs::write(&input, "a,b,c\n1,2,3\n1,2\n4,\"x,y\",6\n1,\"unterminated,3\n7,8,9").unwrap();

        let validator = validator(3);
        let report = QuarantineWriter::new(&LocalFileStore, &validator)
            .run(&input, &reason())
            .unwrap();

        let error_file = dir.path().join("orders_error_lines.csv");
        let clean_file = dir.path().join("orders_originalcsv(error_deleted).csv");
        assert!(report.quarantined());
        assert_eq!(report.resolved_path, clean_file);
        assert_eq!(report.error_file.as_deref(), Some(error_file.as_path()));
        assert_eq!((report.clean_lines, report.error_lines), (3, 2));

        assert_eq!(
            fs::read_to_string(&error_file).unwrap(),
            "a,b,c\n1,2\n1,\"unterminated,3\n"
        );
        assert_eq!(
            fs::read_to_string(&clean_file).unwrap(),
            "a,b,c\n1,2,3\n4,\"x,y\",6\n7,8,9"
        );
    }

    #[test]
    fn test_partitions_cover_every_line_once() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("mixed.csv");
        let body: Vec<String> = (0..200)
            .map(|i| match i % 5 {
                0 => format!("{},only-two", i),
                3 => format!("{},\"open,x", i),
                _ => format!("{},\"q,{}\",z", i, i),
            })
            .collect();
        fs::write(&input, format!("a,b,c\n{}\n", body.join("\n"))).unwrap();

        let validator = validator(3);
        // Tiny threshold forces many intermediate flushes
        let report = QuarantineWriter::new(&LocalFileStore, &validator)
            .with_flush_threshold(64)
            .run(&input, &reason())
            .unwrap();

        let read_body = |path: &Path| -> Vec<String> {
            fs::read_to_string(path)
                .unwrap()
                .lines()
                .skip(1)
                .map(str::to_string)
                .collect()
        };
        let errors = read_body(report.error_file.as_deref().unwrap());
        let clean = read_body(report.clean_file.as_deref().unwrap());

        assert_eq!(errors.len() + clean.len(), body.len());
        let combined: HashSet<&String> = errors.iter().chain(clean.iter()).collect();
        let original: HashSet<&String> = body.iter().collect();
        assert_eq!(combined, original);

        // order within each partition follows the source
        let expected_clean: Vec<String> = body
            .iter()
            .filter(|l| validator.classify(l).is_clean())
            .cloned()
            .collect();
        assert_eq!(clean, expected_clean);
    }

    #[test]
    fn test_clean_file_is_left_alone_every_time() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clean.csv");
        fs::write(&input, "a,b,c\n1,2,3\n4,5,6\n").unwrap();

        let validator = validator(3);
        let writer = QuarantineWriter::new(&LocalFileStore, &validator);
        let (error_path, clean_path) = writer.partition_paths(&input);

        for _ in 0..2 {
            let report = writer.run(&input, &reason()).unwrap();
            assert!(!report.quarantined());
            assert_eq!(report.resolved_path, input);
            assert!(!error_path.exists());
            assert!(!clean_path.exists());
        }
    }
}
