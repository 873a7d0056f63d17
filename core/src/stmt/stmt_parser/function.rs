use super::StmtParser;
use crate::{
    stmt::{LabeledBlock, ParamDecl, ParamDirection, RoutineBody, RoutineDef, RoutineKind},
    token::Token,
};
use anyhow::Result;

const TYPE_MODIFIERS: [&str; 8] = [
    "UNSIGNED", "SIGNED", "ZEROFILL", "BINARY", "ASCII", "UNICODE", "PRECISION", "VARYING",
];

impl<'a> StmtParser<'a> {
    /// Routine header and body, starting right after PROCEDURE or FUNCTION.
    pub fn parse_routine(&mut self, kind: RoutineKind, offset: usize) -> Result<RoutineDef> {
        if self.at_keyword("IF") && self.keyword_ahead(1, "NOT") && self.keyword_ahead(2, "EXISTS") {
            self.pos += 3;
        }

        let first = self.expect_ident()?;
        let (schema, name) = if self.eat_token(&Token::Dot) {
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };

        self.expect_token(Token::LParen)?;
        let mut params = Vec::new();
        if !self.eat_token(&Token::RParen) {
            loop {
                params.push(self.parse_param(kind)?);
                if self.eat_token(&Token::Comma) {
                    continue;
                }
                self.expect_token(Token::RParen)?;
                break;
            }
        }

        let returns = match kind {
            RoutineKind::Function => {
                self.expect_keyword("RETURNS")?;
                Some(self.parse_return_type()?)
            }
            RoutineKind::Procedure => None,
        };

        self.parse_characteristics()?;
        let body = self.parse_routine_body()?;

        Ok(RoutineDef {
            kind,
            name,
            schema,
            params,
            returns,
            body,
            offset,
        })
    }

    fn parse_param(&mut self, kind: RoutineKind) -> Result<ParamDecl> {
        let offset = self.current_offset();

        let direction = match kind {
            RoutineKind::Function => None,
            RoutineKind::Procedure => {
                // `IN`, `OUT` and `INOUT` are modes only when a name and a type follow
                let has_mode = self.peek_ahead(1).and_then(Token::ident).is_some()
                    && !matches!(self.peek_ahead(2), None | Some(Token::Comma | Token::RParen));
                if has_mode && self.eat_keyword("IN") {
                    Some(ParamDirection::In)
                } else if has_mode && self.eat_keyword("OUT") {
                    Some(ParamDirection::Out)
                } else if has_mode && self.eat_keyword("INOUT") {
                    Some(ParamDirection::InOut)
                } else {
                    Some(ParamDirection::In)
                }
            }
        };

        let name = self.expect_ident()?;

        let start = self.pos;
        let mut depth: usize = 0;
        while let Some(token) = self.peek() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => break,
                Token::RParen => depth -= 1,
                Token::Comma if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }
        let data_type = self.source_between(start, self.pos);
        if data_type.is_empty() {
            return Err(self.err("Expected parameter type"));
        }

        Ok(ParamDecl {
            name,
            direction,
            data_type,
            offset,
        })
    }

    /// RETURNS type: a type name, an optional length/precision group and trailing modifiers.
    fn parse_return_type(&mut self) -> Result<String> {
        let start = self.pos;
        match self.peek() {
            Some(Token::Word(_)) => self.pos += 1,
            _ => return Err(self.err("Expected return type")),
        }

        loop {
            if self.peek() == Some(&Token::LParen) {
                self.skip_parenthesized()?;
            } else if self.at_any_keyword(&TYPE_MODIFIERS) {
                self.pos += 1;
            } else if self.at_any_keyword(&["CHARSET", "COLLATE"]) {
                self.pos += 2;
            } else if self.at_keyword("CHARACTER") && self.keyword_ahead(1, "SET") {
                self.pos += 3;
            } else {
                break;
            }
        }
        self.pos = self.pos.min(self.len);

        Ok(self.source_between(start, self.pos))
    }

    fn skip_parenthesized(&mut self) -> Result<()> {
        self.expect_token(Token::LParen)?;
        let mut depth = 1;
        while depth > 0 {
            match self.peek() {
                None => return Err(self.err("Expected ')'")),
                Some(Token::LParen) => depth += 1,
                Some(Token::RParen) => depth -= 1,
                Some(_) => {}
            }
            self.pos += 1;
        }
        Ok(())
    }

    /// COMMENT, LANGUAGE SQL, [NOT] DETERMINISTIC, SQL data access and SQL SECURITY clauses.
    fn parse_characteristics(&mut self) -> Result<()> {
        loop {
            if self.eat_keyword("COMMENT") {
                match self.peek() {
                    Some(Token::Str(_)) => self.pos += 1,
                    _ => return Err(self.err("Expected comment string")),
                }
            } else if self.eat_keyword("LANGUAGE") {
                self.expect_keyword("SQL")?;
            } else if self.keyword_ahead(usize::from(self.at_keyword("NOT")), "DETERMINISTIC") {
                self.pos += usize::from(self.at_keyword("NOT")) + 1;
            } else if self.eat_keyword("CONTAINS") {
                self.expect_keyword("SQL")?;
            } else if self.at_keyword("NO") && self.keyword_ahead(1, "SQL") {
                self.pos += 2;
            } else if self.eat_keyword("READS") || self.eat_keyword("MODIFIES") {
                self.expect_keyword("SQL")?;
                self.expect_keyword("DATA")?;
            } else if self.at_keyword("SQL") && self.keyword_ahead(1, "SECURITY") {
                self.pos += 2;
                if !(self.eat_keyword("DEFINER") || self.eat_keyword("INVOKER")) {
                    return Err(self.err("Expected DEFINER or INVOKER"));
                }
            } else {
                return Ok(());
            }
        }
    }

    /// `DEFINER = user`, where user is `name[@host]` or `CURRENT_USER[()]`.
    pub(super) fn skip_definer(&mut self) -> Result<()> {
        self.expect_keyword("DEFINER")?;
        if !self.eat_token(&Token::Op("=".to_string())) {
            return Err(self.err("Expected '=' after DEFINER"));
        }

        if self.eat_keyword("CURRENT_USER") {
            if self.eat_token(&Token::LParen) {
                self.expect_token(Token::RParen)?;
            }
            return Ok(());
        }

        match self.peek() {
            Some(Token::Word(_) | Token::QuotedId(_) | Token::Str(_)) => self.pos += 1,
            _ => return Err(self.err("Expected definer user")),
        }
        if matches!(self.peek(), Some(Token::Variable(_))) {
            self.pos += 1;
        }
        Ok(())
    }

    fn parse_routine_body(&mut self) -> Result<Option<RoutineBody>> {
        if self.eof() || self.peek() == Some(&Token::Semicolon) {
            return Ok(None);
        }

        if self.at_label() && self.keyword_ahead(2, "BEGIN") {
            let offset = self.current_offset();
            let label = self.expect_ident()?;
            self.pos += 1; // ':'
            let block = self.parse_block()?;
            self.parse_end_label(Some(&label))?;
            return Ok(Some(RoutineBody::Labeled(LabeledBlock { label, block, offset })));
        }

        if self.at_keyword("BEGIN") {
            let block = self.parse_block()?;
            self.parse_end_label(None)?;
            return Ok(Some(RoutineBody::Block(block)));
        }

        Ok(Some(RoutineBody::Statement(self.parse_statement()?)))
    }
}
