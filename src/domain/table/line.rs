// ============================================================
// LINE TYPES
// ============================================================
// A raw source line, its tokenized form, and validator verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// One physical line read from a delimited file
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    /// Zero-based line index (the header is line 0)
    pub index: usize,

    /// Bytes exactly as read, line terminator included when present
    pub raw: Vec<u8>,

    /// Decoded text with the line terminator removed
    pub text: String,
}

impl LineRecord {
    /// Number of characters the raw line occupies once decoded,
    /// terminator included.
    pub fn char_len(&self) -> usize {
        self.text.chars().count() + (self.raw.len() - self.text_terminator_start())
    }

    fn text_terminator_start(&self) -> usize {
        let mut end = self.raw.len();
        if end > 0 && self.raw[end - 1] == b'\n' {
            end -= 1;
            if end > 0 && self.raw[end - 1] == b'\r' {
                end -= 1;
            }
        }
        end
    }
}

/// Result of tokenizing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizedLine {
    /// Ordered fields; `None` marks an empty field
    Fields(Vec<Option<String>>),

    /// Odd number of structural quote characters
    Unbalanced { quote_count: usize },
}

impl TokenizedLine {
    pub fn field_count(&self) -> Option<usize> {
        match self {
            TokenizedLine::Fields(fields) => Some(fields.len()),
            TokenizedLine::Unbalanced { .. } => None,
        }
    }
}

/// Why a line was classified as defective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineDefect {
    UnbalancedQuotes { quote_count: usize },
    FieldCount { expected: usize, found: usize },
}

impl LineDefect {
    /// Human-readable description of the defect at `position`
    pub fn describe(&self, position: usize) -> String {
        match self {
            LineDefect::UnbalancedQuotes { .. } => format!(
                "Error tokenizing data. EOF inside string starting at row {}",
                position
            ),
            LineDefect::FieldCount { expected, found } => format!(
                "Error tokenizing data. Expected {} fields in line {}, saw {}",
                expected, position, found
            ),
        }
    }
}

impl fmt::Display for LineDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineDefect::UnbalancedQuotes { quote_count } => {
                write!(f, "unbalanced quoting ({} quote characters)", quote_count)
            }
            LineDefect::FieldCount { expected, found } => {
                write!(f, "expected {} fields, found {}", expected, found)
            }
        }
    }
}

/// Validator classification of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVerdict {
    Clean,
    Defective(LineDefect),
}

impl LineVerdict {
    pub fn is_clean(&self) -> bool {
        matches!(self, LineVerdict::Clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw: &str, text: &str) -> LineRecord {
        LineRecord {
            index: 0,
            raw: raw.as_bytes().to_vec(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_char_len_counts_terminator() {
        assert_eq!(record("ab\n", "ab").char_len(), 3);
        assert_eq!(record("ab\r\n", "ab").char_len(), 4);
        assert_eq!(record("ab", "ab").char_len(), 2);
        assert_eq!(record("é,x\n", "é,x").char_len(), 4);
    }

    #[test]
    fn test_defect_messages() {
        let unbalanced = LineDefect::UnbalancedQuotes { quote_count: 1 };
        assert!(unbalanced.describe(4).contains("EOF inside string starting at row 4"));

        let count = LineDefect::FieldCount { expected: 3, found: 2 };
        assert_eq!(
            count.describe(2),
            "Error tokenizing data. Expected 3 fields in line 2, saw 2"
        );
    }
}
