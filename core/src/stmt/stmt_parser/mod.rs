use crate::{
    stmt::ParsedStatement,
    token::{ParseError, Span, Token, Tokenizer},
};

/// Turns one statement's text into a [`ParsedStatement`].
///
/// The patcher depends only on this trait, so a different SQL front end can be
/// plugged in through [`crate::patch::Patcher::with_parser`].
pub trait RoutineParser {
    fn parse_one(&self, text: &str) -> Result<ParsedStatement, ParseError>;
}

/// Built-in parser for the MySQL stored-program subset.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlRoutineParser;

impl RoutineParser for SqlRoutineParser {
    fn parse_one(&self, text: &str) -> Result<ParsedStatement, ParseError> {
        let (tokens, spans) = Tokenizer::tokenize_with_spans(text)?;
        let mut parser = StmtParser::new(text, &tokens, &spans);
        parser.parse_statement_text().map_err(|err| match err.downcast::<ParseError>() {
            Ok(parse_err) => parse_err,
            Err(other) => ParseError::new(other.to_string()),
        })
    }
}

pub struct StmtParser<'a> {
    pub(crate) source: &'a str,
    pub(crate) tokens: &'a [Token],
    pub(crate) pos: usize,
    pub(crate) len: usize,
    pub(crate) token_spans: &'a [Span],
}

impl<'a> StmtParser<'a> {
    /// `spans` must be aligned with `tokens`, as produced by [`Tokenizer::tokenize_with_spans`].
    pub fn new(source: &'a str, tokens: &'a [Token], spans: &'a [Span]) -> Self {
        let len = tokens.len();
        Self {
            source,
            tokens,
            pos: 0,
            len,
            token_spans: spans,
        }
    }
}

mod blocks;
mod control;
mod declarations;
mod function;
mod helpers;
mod program;
