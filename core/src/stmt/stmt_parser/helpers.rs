use super::StmtParser;
use crate::token::{ParseError, Span, Token, offset_to_position};
use anyhow::Result;

impl<'a> StmtParser<'a> {
    pub(super) fn eof(&self) -> bool {
        self.pos >= self.len
    }

    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(super) fn peek_ahead(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    pub(super) fn at_keyword(&self, kw: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(kw))
    }

    pub(super) fn at_any_keyword(&self, kws: &[&str]) -> bool {
        kws.iter().any(|kw| self.at_keyword(kw))
    }

    pub(super) fn keyword_ahead(&self, offset: usize, kw: &str) -> bool {
        self.peek_ahead(offset).is_some_and(|t| t.is_keyword(kw))
    }

    pub(super) fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.err(&format!("Expected {}", kw)))
        }
    }

    pub(super) fn eat_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn expect_token(&mut self, expected: Token) -> Result<()> {
        if self.eof() {
            return Err(self.err(&format!("Expected {:?}", expected)));
        }
        if std::mem::discriminant(&self.tokens[self.pos]) != std::mem::discriminant(&expected) {
            return Err(self.err(&format!("Expected {:?}", expected)));
        }
        self.pos += 1;
        Ok(())
    }

    pub(super) fn expect_ident(&mut self) -> Result<String> {
        match self.peek().and_then(Token::ident) {
            Some(id) => {
                let id = id.to_string();
                self.pos += 1;
                Ok(id)
            }
            None => Err(self.err("Expected identifier")),
        }
    }

    /// True if the next tokens are `ident ':'`, i.e. a statement label.
    pub(super) fn at_label(&self) -> bool {
        self.peek().and_then(Token::ident).is_some() && self.peek_ahead(1) == Some(&Token::Colon)
    }

    /// A statement ends at `;`, or at the end of the text for the last one.
    pub(super) fn expect_terminator(&mut self) -> Result<()> {
        if self.eof() || self.eat_token(&Token::Semicolon) {
            Ok(())
        } else {
            Err(self.err("Expected ';'"))
        }
    }

    /// Byte offset of the token at `idx`, or the end of the source past the last token.
    pub(super) fn offset_at(&self, idx: usize) -> usize {
        self.token_spans
            .get(idx)
            .map(|span| span.start.offset)
            .unwrap_or(self.source.len())
    }

    pub(super) fn current_offset(&self) -> usize {
        self.offset_at(self.pos)
    }

    /// Trimmed source text covered by tokens `from..to`.
    pub(super) fn source_between(&self, from: usize, to: usize) -> String {
        if from >= to || to > self.token_spans.len() {
            return String::new();
        }
        let start = self.token_spans[from].start.offset;
        let end = self.token_spans[to - 1].end.offset;
        self.source.get(start..end).unwrap_or_default().trim().to_string()
    }

    /// Advance to the next `;` or one of `stops`, outside parentheses and
    /// `CASE ... END` expressions. The stopping token is not consumed.
    pub(super) fn skip_until(&mut self, stops: &[&str]) {
        let mut paren: usize = 0;
        let mut case_depth: usize = 0;

        while !self.eof() {
            let token = &self.tokens[self.pos];
            match token {
                Token::LParen => paren += 1,
                Token::RParen => paren = paren.saturating_sub(1),
                Token::Semicolon if paren == 0 => break,
                Token::Word(_) if paren == 0 && case_depth == 0 && stops.iter().any(|s| token.is_keyword(s)) => {
                    break;
                }
                Token::Word(w) if w.eq_ignore_ascii_case("CASE") => case_depth += 1,
                Token::Word(w) if w.eq_ignore_ascii_case("END") && case_depth > 0 => case_depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Like [`Self::skip_until`], returning the skipped text.
    pub(super) fn collect_until(&mut self, stops: &[&str]) -> String {
        let start = self.pos;
        self.skip_until(stops);
        self.source_between(start, self.pos)
    }

    pub(super) fn err(&self, msg: &str) -> anyhow::Error {
        let parse_err = match (self.peek(), self.token_spans.get(self.pos)) {
            (Some(token), Some(span)) => ParseError::with_span(format!("{}, found {:?}", msg, token), *span),
            _ => {
                let end = offset_to_position(self.source, self.source.len());
                ParseError::with_span(format!("{}, found end of input", msg), Span::single(end))
            }
        };
        anyhow::Error::new(parse_err)
    }
}
