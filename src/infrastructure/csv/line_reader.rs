// ============================================================
// ENCODED LINE READER
// ============================================================
// Stream a file line by line, keeping raw bytes and decoded text

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encoding_rs::Encoding;

use crate::domain::error::{AppError, Result};
use crate::domain::table::LineRecord;

use super::line_tokenizer::strip_line_terminator;

/// Resolve a charset label ("utf-8", "gbk", "latin1", ...)
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        AppError::ValidationError(format!("Unknown input encoding: '{}'", label))
    })?;

    // Lines are split on the '\n' byte, which only works for ASCII-compatible charsets
    if !encoding.is_ascii_compatible() {
        return Err(AppError::ValidationError(format!(
            "Input encoding '{}' is not supported for line streaming",
            encoding.name()
        )));
    }

    Ok(encoding)
}

/// Iterator over the lines of a file
pub struct EncodedLines<R: BufRead> {
    reader: R,
    encoding: &'static Encoding,
    index: usize,
    done: bool,
}

impl EncodedLines<BufReader<File>> {
    /// Open `path` for sequential line reading
    pub fn open(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::IoError(format!("Failed to open file {}: {}", path.display(), e))
        })?;
        Ok(Self::new(BufReader::new(file), encoding))
    }
}

impl<R: BufRead> EncodedLines<R> {
    pub fn new(reader: R, encoding: &'static Encoding) -> Self {
        Self {
            reader,
            encoding,
            index: 0,
            done: false,
        }
    }

    fn decode(&self, raw: &[u8]) -> String {
        // Only the first line may carry a byte-order mark
        let (text, had_errors) = if self.index == 0 {
            let (text, _, had_errors) = self.encoding.decode(raw);
            (text, had_errors)
        } else {
            self.encoding.decode_without_bom_handling(raw)
        };

        if had_errors {
            tracing::debug!(
                line = self.index,
                encoding = self.encoding.name(),
                "Line contains bytes invalid for the input encoding"
            );
        }

        strip_line_terminator(&text).to_string()
    }
}

impl<R: BufRead> Iterator for EncodedLines<R> {
    type Item = Result<LineRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut raw = Vec::new();
        match self.reader.read_until(b'\n', &mut raw) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                let text = self.decode(&raw);
                let record = LineRecord {
                    index: self.index,
                    raw,
                    text,
                };
                self.index += 1;
                Some(Ok(record))
            }
            Err(e) => {
                self.done = true;
                Some(Err(AppError::IoError(format!(
                    "Failed to read line {}: {}",
                    self.index, e
                ))))
            }
        }
    }
}
