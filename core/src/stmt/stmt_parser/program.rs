use super::StmtParser;
use crate::{
    stmt::{ParsedStatement, ProcStmt, RoutineKind},
    token::Token,
};
use anyhow::Result;

impl<'a> StmtParser<'a> {
    /// Parse the full token stream as a single top-level statement.
    ///
    /// Only `CREATE [OR REPLACE] [DEFINER = ...] PROCEDURE|FUNCTION` is parsed
    /// into a tree; every other statement is reported as [`ParsedStatement::Other`].
    pub fn parse_statement_text(&mut self) -> Result<ParsedStatement> {
        if !self.at_keyword("CREATE") {
            return Ok(ParsedStatement::Other);
        }
        let offset = self.current_offset();
        self.pos += 1;

        if self.eat_keyword("OR") {
            self.expect_keyword("REPLACE")?;
        }
        if self.at_keyword("DEFINER") {
            self.skip_definer()?;
        }

        let kind = if self.eat_keyword("PROCEDURE") {
            RoutineKind::Procedure
        } else if self.eat_keyword("FUNCTION") {
            RoutineKind::Function
        } else {
            return Ok(ParsedStatement::Other);
        };

        let routine = self.parse_routine(kind, offset)?;
        self.eat_token(&Token::Semicolon);
        if !self.eof() {
            return Err(self.err("Unexpected tokens after routine body"));
        }
        Ok(ParsedStatement::Routine(routine))
    }

    pub fn parse_statement(&mut self) -> Result<ProcStmt> {
        let offset = self.current_offset();

        if self.at_label() {
            let label = self.expect_ident()?;
            self.pos += 1; // ':'
            return if self.at_keyword("BEGIN") {
                self.parse_block_stmt(Some(label), offset)
            } else if self.at_any_keyword(&["WHILE", "REPEAT", "LOOP"]) {
                self.parse_loop_stmt(Some(label), offset)
            } else {
                Err(self.err("Expected BEGIN or a loop after label"))
            };
        }

        let Some(Token::Word(word)) = self.peek() else {
            return self.parse_sql_stmt();
        };

        match word.to_ascii_uppercase().as_str() {
            "BEGIN" => self.parse_block_stmt(None, offset),
            "IF" => self.parse_if_stmt(),
            "CASE" => self.parse_case_stmt(),
            "WHILE" | "REPEAT" | "LOOP" => self.parse_loop_stmt(None, offset),
            "LEAVE" | "ITERATE" => self.parse_jump_stmt(),
            "SIGNAL" => self.parse_signal_stmt(),
            "RETURN" => self.parse_return_stmt(),
            "DECLARE" => Err(self.err("DECLARE is only allowed at the start of a block")),
            _ => self.parse_sql_stmt(),
        }
    }
}
