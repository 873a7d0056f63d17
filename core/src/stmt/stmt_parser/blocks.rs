use super::StmtParser;
use crate::{
    stmt::{Block, ProcStmt},
    token::Token,
};
use anyhow::Result;

impl<'a> StmtParser<'a> {
    /// BEGIN {declaration | statement} END, without the optional end label.
    pub fn parse_block(&mut self) -> Result<Block> {
        let offset = self.current_offset();
        self.expect_keyword("BEGIN")?;

        let mut block = Block {
            offset,
            ..Block::default()
        };
        loop {
            if self.eof() {
                return Err(self.err("Expected END"));
            }
            if self.at_keyword("END") {
                break;
            }
            if self.eat_token(&Token::Semicolon) {
                continue;
            }
            if self.at_keyword("DECLARE") {
                block.decls.push(self.parse_declaration()?);
            } else {
                block.stmts.push(self.parse_statement()?);
            }
        }

        block.end_offset = self.current_offset();
        self.expect_keyword("END")?;
        Ok(block)
    }

    pub fn parse_block_stmt(&mut self, label: Option<String>, offset: usize) -> Result<ProcStmt> {
        let block = self.parse_block()?;
        self.parse_end_label(label.as_deref())?;
        self.expect_terminator()?;
        Ok(ProcStmt::Block { label, block, offset })
    }

    /// Statements up to (not including) one of `stops`.
    pub(super) fn parse_stmt_list(&mut self, stops: &[&str]) -> Result<Vec<ProcStmt>> {
        let mut stmts = Vec::new();
        loop {
            if self.eof() {
                return Err(self.err(&format!("Expected {}", stops.join(" or "))));
            }
            if self.at_any_keyword(stops) {
                break;
            }
            if self.eat_token(&Token::Semicolon) {
                continue;
            }
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    /// Optional label after `END`, `END WHILE`, `END LOOP` or `END REPEAT`.
    pub(super) fn parse_end_label(&mut self, begin_label: Option<&str>) -> Result<()> {
        let Some(end_label) = self.peek().and_then(Token::ident) else {
            return Ok(());
        };
        match begin_label {
            Some(begin) if begin.eq_ignore_ascii_case(end_label) => {
                self.pos += 1;
                Ok(())
            }
            Some(begin) => Err(self.err(&format!("End label does not match '{}'", begin))),
            None => Err(self.err("End label without a matching begin label")),
        }
    }

    /// Any statement the routine grammar does not model, kept as text up to `;`.
    pub fn parse_sql_stmt(&mut self) -> Result<ProcStmt> {
        let offset = self.current_offset();
        let text = self.collect_until(&[]);
        if text.is_empty() {
            return Err(self.err("Expected statement"));
        }
        self.expect_terminator()?;
        Ok(ProcStmt::Sql { text, offset })
    }
}
