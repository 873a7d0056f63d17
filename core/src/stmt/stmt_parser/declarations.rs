use super::StmtParser;
use crate::{
    stmt::{Declaration, HandlerAction},
    token::Token,
};
use anyhow::Result;

impl<'a> StmtParser<'a> {
    /// DECLARE variables, conditions, cursors and handlers.
    pub fn parse_declaration(&mut self) -> Result<Declaration> {
        let offset = self.current_offset();
        self.expect_keyword("DECLARE")?;

        if self.at_any_keyword(&["CONTINUE", "EXIT", "UNDO"]) && self.keyword_ahead(1, "HANDLER") {
            return self.parse_handler_decl(offset);
        }

        let name = self.expect_ident()?;

        if self.eat_keyword("CONDITION") {
            self.expect_keyword("FOR")?;
            let value = self.collect_until(&[]);
            if value.is_empty() {
                return Err(self.err("Expected condition value"));
            }
            self.expect_terminator()?;
            return Ok(Declaration::Condition { name, value, offset });
        }

        if self.eat_keyword("CURSOR") {
            self.expect_keyword("FOR")?;
            let query = self.collect_until(&[]);
            if query.is_empty() {
                return Err(self.err("Expected cursor query"));
            }
            self.expect_terminator()?;
            return Ok(Declaration::Cursor { name, query, offset });
        }

        let mut names = vec![name];
        while self.eat_token(&Token::Comma) {
            names.push(self.expect_ident()?);
        }

        let data_type = self.collect_until(&["DEFAULT"]);
        if data_type.is_empty() {
            return Err(self.err("Expected variable type"));
        }

        let default = if self.eat_keyword("DEFAULT") {
            let value = self.collect_until(&[]);
            if value.is_empty() {
                return Err(self.err("Expected default value"));
            }
            Some(value)
        } else {
            None
        };

        self.expect_terminator()?;
        Ok(Declaration::Variables {
            names,
            data_type,
            default,
            offset,
        })
    }

    fn parse_handler_decl(&mut self, offset: usize) -> Result<Declaration> {
        let action = if self.eat_keyword("CONTINUE") {
            HandlerAction::Continue
        } else if self.eat_keyword("EXIT") {
            HandlerAction::Exit
        } else {
            self.expect_keyword("UNDO")?;
            HandlerAction::Undo
        };
        self.expect_keyword("HANDLER")?;
        self.expect_keyword("FOR")?;

        let start = self.pos;
        loop {
            self.parse_handler_condition()?;
            if !self.eat_token(&Token::Comma) {
                break;
            }
        }
        let conditions = self.source_between(start, self.pos);

        let body = Box::new(self.parse_statement()?);
        Ok(Declaration::Handler {
            action,
            conditions,
            body,
            offset,
        })
    }

    /// SQLSTATE [VALUE] 'xxxxx' | NOT FOUND | SQLWARNING | SQLEXCEPTION | error code | condition name
    fn parse_handler_condition(&mut self) -> Result<()> {
        if self.eat_keyword("SQLSTATE") {
            self.eat_keyword("VALUE");
            return match self.peek() {
                Some(Token::Str(_)) => {
                    self.pos += 1;
                    Ok(())
                }
                _ => Err(self.err("Expected SQLSTATE value")),
            };
        }
        if self.eat_keyword("NOT") {
            return self.expect_keyword("FOUND");
        }
        match self.peek() {
            Some(Token::Number(_) | Token::Word(_) | Token::QuotedId(_)) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.err("Expected handler condition")),
        }
    }
}
