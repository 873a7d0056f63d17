use std::fmt;

/// Location inside a statement text. `offset` is a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn single(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line, self.start.column, self.end.column)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parse error raised by the routine tokenizer or parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn with_position(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            span: Some(Span::single(position)),
        }
    }

    /// Byte offset where the error was detected, if known.
    pub fn offset(&self) -> Option<usize> {
        self.span.map(|s| s.start.offset)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = &self.span {
            write!(f, "{} at {}", self.message, span)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

/// Convert a byte offset into a 1-based line/column position.
///
/// Columns count characters, so multi-byte UTF-8 sequences advance by one.
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in text.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    Position::new(line, column, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_position() {
        let text = "CREATE\nPROCEDURE p()\nBEGIN END";

        assert_eq!(offset_to_position(text, 0), Position::new(1, 1, 0));
        assert_eq!(offset_to_position(text, 6), Position::new(1, 7, 6));
        assert_eq!(offset_to_position(text, 7), Position::new(2, 1, 7));
        assert_eq!(offset_to_position(text, 21), Position::new(3, 1, 21));
    }

    #[test]
    fn test_offset_past_multibyte_chars() {
        let text = "SELECT 'é';\nEND";
        // 'é' is two bytes, one column
        assert_eq!(offset_to_position(text, 10), Position::new(1, 10, 10));
        assert_eq!(offset_to_position(text, 13), Position::new(2, 1, 13));
    }

    #[test]
    fn test_span_display() {
        let span1 = Span::new(Position::new(1, 5, 4), Position::new(1, 10, 9));
        assert_eq!(span1.to_string(), "1:5-10");

        let span2 = Span::new(Position::new(1, 5, 4), Position::new(3, 2, 20));
        assert_eq!(span2.to_string(), "1:5-3:2");
    }

    #[test]
    fn test_parse_error_display() {
        let err1 = ParseError::new("simple error");
        assert_eq!(err1.to_string(), "simple error");
        assert_eq!(err1.offset(), None);

        let err2 = ParseError::with_position("syntax error", Position::new(2, 10, 15));
        assert_eq!(err2.to_string(), "syntax error at 2:10-10");
        assert_eq!(err2.offset(), Some(15));
    }
}
