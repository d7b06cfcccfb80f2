// ============================================================
// LINE TOKENIZER
// ============================================================
// Split one raw line into fields, honoring or ignoring quotes

use crate::domain::import_config::QuotingMode;
use crate::domain::table::TokenizedLine;

pub const QUOTE: char = '"';

/// Splits single lines of delimited text into fields
#[derive(Debug, Clone, Copy)]
pub struct LineTokenizer {
    separator: char,
    mode: QuotingMode,
}

impl LineTokenizer {
    pub fn new(separator: char, mode: QuotingMode) -> Self {
        Self { separator, mode }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn mode(&self) -> QuotingMode {
        self.mode
    }

    /// Tokenize a line. A trailing `\n` or `\r\n` is ignored.
    pub fn tokenize(&self, line: &str) -> TokenizedLine {
        let line = strip_line_terminator(line);
        match self.mode {
            QuotingMode::Ignore => TokenizedLine::Fields(
                line.split(self.separator)
                    .map(|field| (!field.is_empty()).then(|| field.to_string()))
                    .collect(),
            ),
            QuotingMode::Honor => self.tokenize_quoted(line),
        }
    }

    /// Quote-aware pass.
    ///
    /// A quote with a non-separator character on both sides is literal
    /// content. Every other quote is structural: it toggles the quoted span
    /// and is dropped from the output. An odd number of structural quotes
    /// makes the line unbalanced.
    fn tokenize_quoted(&self, line: &str) -> TokenizedLine {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut quote_count = 0usize;
        let mut prev: Option<char> = None;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            let next = chars.peek().copied();

            if c == QUOTE && self.is_structural_quote(prev, next) {
                quote_count += 1;
                in_quotes = !in_quotes;
            } else if c == self.separator && !in_quotes {
                fields.push(take_field(&mut current));
            } else {
                current.push(c);
            }

            prev = Some(c);
        }

        if quote_count % 2 != 0 {
            return TokenizedLine::Unbalanced { quote_count };
        }

        fields.push(take_field(&mut current));
        TokenizedLine::Fields(fields)
    }

    fn is_structural_quote(&self, prev: Option<char>, next: Option<char>) -> bool {
        let interior = matches!(prev, Some(p) if p != self.separator)
            && matches!(next, Some(n) if n != self.separator);
        !interior
    }
}

fn take_field(current: &mut String) -> Option<String> {
    let field = std::mem::take(current);
    (!field.is_empty()).then_some(field)
}

/// Remove one trailing `\n` (and a `\r` before it)
pub fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn honor() -> LineTokenizer {
        LineTokenizer::new(',', QuotingMode::Honor)
    }

    fn fields(list: &[Option<&str>]) -> TokenizedLine {
        TokenizedLine::Fields(list.iter().map(|f| f.map(str::to_string)).collect())
    }

    #[test]
    fn test_quoted_separator_stays_in_field() {
        assert_eq!(
            honor().tokenize("1,\"x,y\",3"),
            fields(&[Some("1"), Some("x,y"), Some("3")])
        );
    }

    #[test]
    fn test_unterminated_quote_is_unbalanced() {
        assert_eq!(
            honor().tokenize("1,\"unterminated,3"),
            TokenizedLine::Unbalanced { quote_count: 1 }
        );
    }

    #[test]
    fn test_empty_fields_are_preserved() {
        assert_eq!(
            honor().tokenize(",a,,b,"),
            fields(&[None, Some("a"), None, Some("b"), None])
        );
        assert_eq!(honor().tokenize(""), fields(&[None]));
        assert_eq!(honor().tokenize("1,\"\",3"), fields(&[Some("1"), None, Some("3")]));
    }

    #[test]
    fn test_interior_quotes_are_literal() {
        assert_eq!(
            honor().tokenize("1,5\" pipe,3"),
            fields(&[Some("1"), Some("5\" pipe"), Some("3")])
        );
        assert_eq!(
            honor().tokenize("a\"\"b,c"),
            fields(&[Some("a\"\"b"), Some("c")])
        );
    }

    #[test]
    fn test_separators_inside_quotes_do_not_create_empty_fields() {
        assert_eq!(
            honor().tokenize("\"a,,b\",c"),
            fields(&[Some("a,,b"), Some("c")])
        );
    }

    #[test]
    fn test_spaces_and_shell_characters_are_content() {
        assert_eq!(
            honor().tokenize(" it's ,C:\\temp, \"q\" "),
            fields(&[Some(" it's "), Some("C:\\temp"), Some(" \"q\" ")])
        );
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        let tokenizer = honor();
        assert_eq!(tokenizer.tokenize("a,\"b,c\"\n"), tokenizer.tokenize("a,\"b,c\""));
        assert_eq!(tokenizer.tokenize("a,b\r\n"), tokenizer.tokenize("a,b"));
    }

    #[test]
    fn test_ignore_mode_splits_strictly() {
        let tokenizer = LineTokenizer::new(';', QuotingMode::Ignore);
        assert_eq!(
            tokenizer.tokenize("\"a;b\";;c\n"),
            fields(&[Some("\"a"), Some("b\""), None, Some("c")])
        );
        assert_eq!(
            tokenizer.tokenize("\"odd;x"),
            fields(&[Some("\"odd"), Some("x")])
        );
    }

    #[test]
    fn test_balanced_lines_match_header_width() {
        let tokenizer = honor();
        let lines = [
            "a,b,c",
            "1,\"2,3\",4",
            "\"\",,\"x\"",
            "x\"y,z,\"w,w\"",
        ];
        for line in lines {
            assert_eq!(tokenizer.tokenize(line).field_count(), Some(3), "line: {}", line);
        }
    }

    #[test]
    fn test_odd_structural_quotes_always_unbalanced() {
        let tokenizer = honor();
        for line in ["\"", "a,\"b", "\"a\",\"b", "a,b\",c"] {
            assert!(
                matches!(tokenizer.tokenize(line), TokenizedLine::Unbalanced { .. }),
                "line: {}",
                line
            );
        }
    }
}
