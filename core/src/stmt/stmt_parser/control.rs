use super::StmtParser;
use crate::stmt::{CondBranch, JumpKind, LoopKind, ProcStmt};
use anyhow::Result;

impl<'a> StmtParser<'a> {
    /// IF c THEN stmts {ELSEIF c THEN stmts} [ELSE stmts] END IF
    pub fn parse_if_stmt(&mut self) -> Result<ProcStmt> {
        let offset = self.current_offset();
        self.expect_keyword("IF")?;

        let mut branches = Vec::new();
        loop {
            let condition = self.parse_condition("THEN")?;
            self.expect_keyword("THEN")?;
            let body = self.parse_stmt_list(&["ELSEIF", "ELSE", "END"])?;
            branches.push(CondBranch { condition, body });
            if !self.eat_keyword("ELSEIF") {
                break;
            }
        }

        let else_branch = if self.eat_keyword("ELSE") {
            Some(self.parse_stmt_list(&["END"])?)
        } else {
            None
        };

        self.expect_keyword("END")?;
        self.expect_keyword("IF")?;
        self.expect_terminator()?;

        Ok(ProcStmt::If {
            branches,
            else_branch,
            offset,
        })
    }

    /// CASE [operand] {WHEN c THEN stmts} [ELSE stmts] END CASE
    pub fn parse_case_stmt(&mut self) -> Result<ProcStmt> {
        let offset = self.current_offset();
        self.expect_keyword("CASE")?;

        let operand = if self.at_keyword("WHEN") {
            None
        } else {
            Some(self.parse_condition("WHEN")?)
        };

        let mut branches = Vec::new();
        while self.eat_keyword("WHEN") {
            let condition = self.parse_condition("THEN")?;
            self.expect_keyword("THEN")?;
            let body = self.parse_stmt_list(&["WHEN", "ELSE", "END"])?;
            branches.push(CondBranch { condition, body });
        }
        if branches.is_empty() {
            return Err(self.err("Expected WHEN"));
        }

        let else_branch = if self.eat_keyword("ELSE") {
            Some(self.parse_stmt_list(&["END"])?)
        } else {
            None
        };

        self.expect_keyword("END")?;
        self.expect_keyword("CASE")?;
        self.expect_terminator()?;

        Ok(ProcStmt::Case {
            operand,
            branches,
            else_branch,
            offset,
        })
    }

    /// WHILE c DO stmts END WHILE, REPEAT stmts UNTIL c END REPEAT, LOOP stmts END LOOP
    pub fn parse_loop_stmt(&mut self, label: Option<String>, offset: usize) -> Result<ProcStmt> {
        let (kind, condition, body) = if self.eat_keyword("WHILE") {
            let condition = self.parse_condition("DO")?;
            self.expect_keyword("DO")?;
            let body = self.parse_stmt_list(&["END"])?;
            self.expect_keyword("END")?;
            self.expect_keyword("WHILE")?;
            (LoopKind::While, Some(condition), body)
        } else if self.eat_keyword("REPEAT") {
            let body = self.parse_stmt_list(&["UNTIL"])?;
            self.expect_keyword("UNTIL")?;
            let condition = self.parse_condition("END")?;
            self.expect_keyword("END")?;
            self.expect_keyword("REPEAT")?;
            (LoopKind::Repeat, Some(condition), body)
        } else {
            self.expect_keyword("LOOP")?;
            let body = self.parse_stmt_list(&["END"])?;
            self.expect_keyword("END")?;
            self.expect_keyword("LOOP")?;
            (LoopKind::Loop, None, body)
        };

        self.parse_end_label(label.as_deref())?;
        self.expect_terminator()?;

        Ok(ProcStmt::Loop {
            kind,
            label,
            condition,
            body,
            offset,
        })
    }

    /// LEAVE label / ITERATE label
    pub fn parse_jump_stmt(&mut self) -> Result<ProcStmt> {
        let offset = self.current_offset();
        let kind = if self.eat_keyword("LEAVE") {
            JumpKind::Leave
        } else {
            self.expect_keyword("ITERATE")?;
            JumpKind::Iterate
        };
        let label = self.expect_ident()?;
        self.expect_terminator()?;
        Ok(ProcStmt::Jump { kind, label, offset })
    }

    pub fn parse_signal_stmt(&mut self) -> Result<ProcStmt> {
        let offset = self.current_offset();
        let text = self.collect_until(&[]);
        self.expect_terminator()?;
        Ok(ProcStmt::Signal { text, offset })
    }

    pub fn parse_return_stmt(&mut self) -> Result<ProcStmt> {
        let offset = self.current_offset();
        self.expect_keyword("RETURN")?;
        let expr = self.collect_until(&[]);
        if expr.is_empty() {
            return Err(self.err("Expected expression after RETURN"));
        }
        self.expect_terminator()?;
        Ok(ProcStmt::Return { expr, offset })
    }

    /// Expression text up to `stop`, which must be non-empty.
    fn parse_condition(&mut self, stop: &str) -> Result<String> {
        let condition = self.collect_until(&[stop]);
        if condition.is_empty() {
            return Err(self.err("Expected condition"));
        }
        Ok(condition)
    }
}
