use crate::token::{ParseError, Position, Span};
use crate::token::scanner::{is_ident_part, is_line_break, is_space_or_control, is_whitespace};

/// Routine-level SQL token. Keywords are kept as [`Token::Word`] and matched
/// case-insensitively by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word(String),     // bare identifier or keyword, original spelling
    QuotedId(String), // `identifier`, unwrapped
    Str(String),      // 'text' or "text", raw body without the quotes
    Number(String),   // 42, 1.5, 0x1F
    Variable(String), // @user_var or @@system_var, including the sigils
    LParen,           // (
    RParen,           // )
    Comma,            // ,
    Semicolon,        // ;
    Colon,            // :
    Dot,              // .
    Op(String),       // any other operator or punctuation
}

impl Token {
    /// True if this is a bare word equal to `kw`, ignoring ASCII case.
    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(kw))
    }

    /// Identifier text for bare words and backtick-quoted identifiers.
    pub fn ident(&self) -> Option<&str> {
        match self {
            Token::Word(w) | Token::QuotedId(w) => Some(w),
            _ => None,
        }
    }
}

const MULTI_CHAR_OPS: [&str; 12] = ["<=>", "->>", ":=", "<=", ">=", "<>", "!=", "||", "&&", "->", "<<", ">>"];

/// Turns one statement's text into tokens with byte-accurate spans.
pub struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    idx: usize,
    line: u32,
    column: u32,
    pub tokens: Vec<Token>,
    pub token_spans: Vec<Span>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            idx: 0,
            line: 1,
            column: 1,
            tokens: Vec::with_capacity(input.len() / 4),
            token_spans: Vec::with_capacity(input.len() / 4),
        }
    }

    /// Tokenize and return tokens with spans aligned by index.
    pub fn tokenize_with_spans(s: &str) -> Result<(Vec<Token>, Vec<Span>), ParseError> {
        let mut t = Tokenizer::new(s);
        t.run()?;
        Ok((t.tokens, t.token_spans))
    }

    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column, self.idx)
    }

    fn eof(&self) -> bool {
        self.idx >= self.bytes.len()
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.idx + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(&b) = self.bytes.get(self.idx) {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if b & 0xC0 != 0x80 {
                // continuation bytes of a multi-byte char share its column
                self.column += 1;
            }
            self.idx += 1;
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn error_here(&self, msg: &str) -> ParseError {
        ParseError::with_position(msg, self.current_position())
    }

    fn push(&mut self, token: Token, start: Position) {
        self.tokens.push(token);
        self.token_spans.push(Span::new(start, self.current_position()));
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while !self.eof() {
            let c = self.bytes[self.idx];
            if is_whitespace(c) || c == 0x0B || c == 0x0C {
                self.advance();
                continue;
            }
            if c == b'-' && self.peek(1) == Some(b'-') && self.peek(2).is_none_or(is_space_or_control) {
                self.skip_line_comment();
                continue;
            }
            if c == b'#' {
                self.skip_line_comment();
                continue;
            }
            if c == b'/' && self.peek(1) == Some(b'*') {
                self.skip_block_comment()?;
                continue;
            }

            let start = self.current_position();
            match c {
                b'\'' | b'"' => {
                    let body = self.read_quoted(c, true)?;
                    self.push(Token::Str(body), start);
                }
                b'`' => {
                    let body = self.read_quoted(b'`', false)?;
                    self.push(Token::QuotedId(body.replace("``", "`")), start);
                }
                b'0'..=b'9' => {
                    let text = self.read_while(|b| is_ident_part(b) || b == b'.');
                    self.push(Token::Number(text), start);
                }
                b'@' => {
                    let text = self.read_variable()?;
                    self.push(Token::Variable(text), start);
                }
                b'(' => self.single(Token::LParen, start),
                b')' => self.single(Token::RParen, start),
                b',' => self.single(Token::Comma, start),
                b';' => self.single(Token::Semicolon, start),
                b'.' => self.single(Token::Dot, start),
                _ if is_word_byte(c) => {
                    let text = self.read_while(is_word_byte);
                    self.push(Token::Word(text), start);
                }
                _ => {
                    let op = self.read_operator();
                    if op == ":" {
                        self.push(Token::Colon, start);
                    } else {
                        self.push(Token::Op(op), start);
                    }
                }
            }
        }
        Ok(())
    }

    fn single(&mut self, token: Token, start: Position) {
        self.advance();
        self.push(token, start);
    }

    fn skip_line_comment(&mut self) {
        while !self.eof() && !is_line_break(self.bytes[self.idx]) {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.current_position();
        self.advance_by(2);
        while !self.eof() {
            if self.bytes[self.idx] == b'*' && self.peek(1) == Some(b'/') {
                self.advance_by(2);
                return Ok(());
            }
            self.advance();
        }
        Err(ParseError::with_position("Block comment not closed", start))
    }

    /// Read a quoted body, honoring doubled quotes and, for strings, backslash escapes.
    fn read_quoted(&mut self, quote: u8, backslash_escapes: bool) -> Result<String, ParseError> {
        let start = self.current_position();
        self.advance();
        let body_start = self.idx;
        while !self.eof() {
            let c = self.bytes[self.idx];
            if backslash_escapes && c == b'\\' && self.peek(1).is_some() {
                self.advance_by(2);
                continue;
            }
            if c == quote {
                if self.peek(1) == Some(quote) {
                    self.advance_by(2);
                    continue;
                }
                let body = self.input[body_start..self.idx].to_string();
                self.advance();
                return Ok(body);
            }
            self.advance();
        }
        let what = if quote == b'`' { "Quoted identifier" } else { "String" };
        Err(ParseError::with_position(format!("{what} not closed"), start))
    }

    fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> String {
        let start = self.idx;
        while !self.eof() && pred(self.bytes[self.idx]) {
            self.advance();
        }
        self.input[start..self.idx].to_string()
    }

    fn read_variable(&mut self) -> Result<String, ParseError> {
        let start = self.idx;
        self.advance();
        if self.peek(0) == Some(b'@') {
            self.advance();
        }
        match self.peek(0) {
            Some(q @ (b'\'' | b'"' | b'`')) => {
                self.read_quoted(q, q != b'`')?;
            }
            _ => {
                while !self.eof() && (is_word_byte(self.bytes[self.idx]) || self.bytes[self.idx] == b'.') {
                    self.advance();
                }
            }
        }
        if self.idx - start == 1 {
            return Err(self.error_here("Expected variable name after '@'"));
        }
        Ok(self.input[start..self.idx].to_string())
    }

    fn read_operator(&mut self) -> String {
        let rest = &self.bytes[self.idx..];
        for op in MULTI_CHAR_OPS {
            if rest.starts_with(op.as_bytes()) {
                self.advance_by(op.len());
                return op.to_string();
            }
        }
        // is_word_byte covers every non-ASCII byte, so this is a single ASCII char
        let op = (self.bytes[self.idx] as char).to_string();
        self.advance();
        op
    }
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    is_ident_part(b) || b == b'$' || b >= 0x80
}
