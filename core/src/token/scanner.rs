//! Byte-level scanner for SQL-family source text.
//!
//! The scanner only classifies bytes: it knows where quoted strings,
//! backtick identifiers and comments begin and end, and which bytes are
//! plain code. Statement splitting, keyword search and the depatch segment
//! walk are all built on it, so every component agrees on what counts as
//! "inside a literal".

/// Lexical region the scanner is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Code,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment,
}

impl Region {
    pub fn is_comment(self) -> bool {
        matches!(self, Region::LineComment | Region::BlockComment)
    }

    pub fn is_quoted(self) -> bool {
        matches!(self, Region::SingleQuoted | Region::DoubleQuoted | Region::Backticked)
    }
}

/// What the bytes consumed by one [`Scanner::step`] were.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// A plain code byte, including the opening quote of a literal.
    Code,
    /// Bytes inside a quoted region, including its closing quote.
    Quoted,
    /// Comment bytes, including the comment opener.
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub start: usize,
    pub end: usize,
    pub kind: StepKind,
}

/// A `DELIMITER <token>` client directive found at a line start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterDirective {
    /// Offset just past the directive line, including its line break.
    pub next: usize,
    pub delimiter: String,
}

pub struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    region: Region,
    /// True at input start and right after an unescaped line break.
    line_start: bool,
    /// True while only horizontal whitespace has been consumed on this line.
    line_head: bool,
    lenient_dash_comments: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            region: Region::Code,
            line_start: true,
            line_head: true,
            lenient_dash_comments: false,
        }
    }

    /// Also treat `--` as a comment opener when it is the first non-blank
    /// text on its line, even without trailing whitespace.
    pub fn with_lenient_dash_comments(mut self) -> Self {
        self.lenient_dash_comments = true;
        self
    }

    /// Start scanning at `pos`, assumed to be in code at a line start.
    pub fn starting_at(mut self, pos: usize) -> Self {
        self.pos = pos.min(self.bytes.len());
        self
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn in_code(&self) -> bool {
        self.region == Region::Code
    }

    pub fn at_line_start(&self) -> bool {
        self.line_start
    }

    /// Jump to `pos` after consuming a directive line; the next byte starts a line.
    pub fn jump_to_line_start(&mut self, pos: usize) {
        self.pos = pos.min(self.bytes.len());
        self.region = Region::Code;
        self.line_start = true;
        self.line_head = true;
    }

    /// Consume `n` bytes of code that the caller matched itself (a statement delimiter).
    pub fn skip_code(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.bytes.len());
        self.line_start = false;
        self.line_head = false;
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self, n: usize, kind: StepKind) -> Step {
        let start = self.pos;
        self.pos = (self.pos + n).min(self.bytes.len());
        Step {
            start,
            end: self.pos,
            kind,
        }
    }

    fn track_line(&mut self, ch: u8) {
        if is_line_break(ch) {
            self.line_start = true;
            self.line_head = true;
        } else {
            self.line_start = false;
            if !is_horizontal_space(ch) {
                self.line_head = false;
            }
        }
    }

    fn clear_line_flags(&mut self) {
        self.line_start = false;
        self.line_head = false;
    }

    /// Consume the next lexical unit (one byte, or a two-byte opener,
    /// closer or escape) and report what it was.
    pub fn step(&mut self) -> Option<Step> {
        let ch = self.peek(0)?;
        let step = match self.region {
            Region::LineComment => {
                if is_line_break(ch) {
                    self.region = Region::Code;
                }
                self.track_line(ch);
                self.advance(1, StepKind::Comment)
            }
            Region::BlockComment => {
                if ch == b'*' && self.peek(1) == Some(b'/') {
                    self.region = Region::Code;
                    self.clear_line_flags();
                    self.advance(2, StepKind::Comment)
                } else {
                    self.track_line(ch);
                    self.advance(1, StepKind::Comment)
                }
            }
            Region::SingleQuoted | Region::DoubleQuoted | Region::Backticked => self.step_quoted(ch),
            Region::Code => self.step_code(ch),
        };
        Some(step)
    }

    fn step_quoted(&mut self, ch: u8) -> Step {
        let (quote, backslash_escapes) = match self.region {
            Region::SingleQuoted => (b'\'', true),
            Region::DoubleQuoted => (b'"', true),
            _ => (b'`', false),
        };

        if backslash_escapes && ch == b'\\' && self.peek(1).is_some() {
            self.clear_line_flags();
            return self.advance(2, StepKind::Quoted);
        }
        if ch == quote {
            if self.peek(1) == Some(quote) {
                self.clear_line_flags();
                return self.advance(2, StepKind::Quoted);
            }
            self.region = Region::Code;
        }
        self.track_line(ch);
        self.advance(1, StepKind::Quoted)
    }

    fn step_code(&mut self, ch: u8) -> Step {
        if ch == b'-' && self.peek(1) == Some(b'-') {
            let opens = match self.peek(2) {
                None => true,
                Some(next) => is_space_or_control(next) || (self.lenient_dash_comments && self.line_head),
            };
            if opens {
                self.region = Region::LineComment;
                self.clear_line_flags();
                return self.advance(2, StepKind::Comment);
            }
        }
        if ch == b'#' {
            self.region = Region::LineComment;
            self.clear_line_flags();
            return self.advance(1, StepKind::Comment);
        }
        if ch == b'/' && self.peek(1) == Some(b'*') {
            self.region = Region::BlockComment;
            self.clear_line_flags();
            return self.advance(2, StepKind::Comment);
        }

        match ch {
            b'\'' => self.region = Region::SingleQuoted,
            b'"' => self.region = Region::DoubleQuoted,
            b'`' => self.region = Region::Backticked,
            _ => {}
        }
        self.track_line(ch);
        self.advance(1, StepKind::Code)
    }

    /// Try to consume a `DELIMITER` directive at the current position.
    ///
    /// Only recognized at a logical line start while no quote or comment is open.
    pub fn delimiter_directive(&self) -> Option<DelimiterDirective> {
        if !self.line_start || self.region != Region::Code {
            return None;
        }
        consume_delimiter_directive(self.bytes, self.pos)
    }
}

/// Parse `DELIMITER <token>` starting at `start`, returning the offset past the line.
pub fn consume_delimiter_directive(data: &[u8], start: usize) -> Option<DelimiterDirective> {
    let mut i = start;
    while i < data.len() && is_horizontal_space(data[i]) {
        i += 1;
    }
    if !matches_keyword_at(data, i, "DELIMITER") {
        return None;
    }

    let mut j = i + "DELIMITER".len();
    if j >= data.len() || !is_whitespace(data[j]) {
        return None;
    }
    while j < data.len() && is_horizontal_space(data[j]) {
        j += 1;
    }
    if j >= data.len() || is_line_break(data[j]) {
        return None;
    }

    let mut k = j;
    while k < data.len() && !is_whitespace(data[k]) {
        k += 1;
    }
    let delimiter = String::from_utf8_lossy(&data[j..k]).into_owned();

    while k < data.len() && !is_line_break(data[k]) {
        k += 1;
    }
    if k < data.len() && data[k] == b'\r' {
        k += 1;
        if k < data.len() && data[k] == b'\n' {
            k += 1;
        }
    } else if k < data.len() && data[k] == b'\n' {
        k += 1;
    }

    Some(DelimiterDirective { next: k, delimiter })
}

/// Iterator over code positions where a keyword starts.
pub struct KeywordHits<'a, 'k> {
    scanner: Scanner<'a>,
    keyword: &'k str,
}

impl Iterator for KeywordHits<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while !self.scanner.at_end() {
            let pos = self.scanner.pos();
            let hit = self.scanner.in_code() && matches_keyword_at(self.scanner.bytes(), pos, self.keyword);
            self.scanner.step();
            if hit {
                return Some(pos);
            }
        }
        None
    }
}

pub fn keyword_hits<'a, 'k>(scanner: Scanner<'a>, keyword: &'k str) -> KeywordHits<'a, 'k> {
    KeywordHits { scanner, keyword }
}

/// Offset of the last `keyword` outside quotes and comments.
pub fn find_last_keyword(text: &str, keyword: &str) -> Option<usize> {
    keyword_hits(Scanner::new(text), keyword).last()
}

/// Offset of the first `keyword` outside quotes and comments.
pub fn find_first_keyword(scanner: Scanner<'_>, keyword: &str) -> Option<usize> {
    keyword_hits(scanner, keyword).next()
}

/// Case-insensitive keyword match with identifier boundaries on both sides.
pub fn matches_keyword_at(data: &[u8], pos: usize, keyword: &str) -> bool {
    let kw = keyword.as_bytes();
    if pos + kw.len() > data.len() {
        return false;
    }
    if !data[pos..pos + kw.len()].eq_ignore_ascii_case(kw) {
        return false;
    }
    if pos > 0 && is_ident_part(data[pos - 1]) {
        return false;
    }
    let after = pos + kw.len();
    !(after < data.len() && is_ident_part(data[after]))
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
pub fn is_horizontal_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

#[inline]
pub fn is_line_break(b: u8) -> bool {
    matches!(b, b'\n' | b'\r')
}

#[inline]
pub fn is_space_or_control(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

#[inline]
pub fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

#[inline]
pub fn is_ident_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
