//! Finds the points where a routine can stop executing.
//!
//! The walk mirrors the block structure: every nested BEGIN ... END opens a
//! scope, and each exit point remembers the scope that was current when it
//! was found so the hint can list the locals visible there.

use crate::resolve::{ScopeId, ScopeTracker, Variable};
use crate::stmt::{Block, JumpKind, ProcStmt};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionKind {
    /// Right before a `LEAVE <routine label>`, `SIGNAL` or `RETURN`.
    BeforeEarlyExit,
    /// Before the routine's final `END`.
    FallThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    pub kind: InsertionKind,
    pub scope: ScopeId,
    /// Offset of the exiting statement in the routine text; `None` for the fall-through point.
    pub anchor: Option<usize>,
}

pub struct ProcedureInserter {
    name: String,
    proc_label: Option<String>,
    tracker: ScopeTracker,
    points: Vec<InsertionPoint>,
    body_scope: Option<ScopeId>,
}

impl ProcedureInserter {
    pub fn new(name: impl Into<String>, params: Vec<Variable>, proc_label: Option<&str>) -> Self {
        Self {
            name: name.into(),
            proc_label: proc_label.map(str::to_string),
            tracker: ScopeTracker::new(params),
            points: Vec::new(),
            body_scope: None,
        }
    }

    /// Walk the routine's outermost block.
    pub fn process_body(&mut self, block: &Block, label: Option<&str>) {
        let scope = self.enter(block, label);
        self.body_scope = Some(scope);
        self.walk(&block.stmts);
        self.tracker.leave_block();
    }

    /// Add the fall-through point and hand back everything found.
    ///
    /// The fall-through point sees the outermost block's locals.
    pub fn finish(mut self) -> (Vec<InsertionPoint>, ScopeTracker) {
        let scope = self.body_scope.unwrap_or_else(|| self.tracker.root());
        self.points.push(InsertionPoint {
            kind: InsertionKind::FallThrough,
            scope,
            anchor: None,
        });
        trace!(routine = %self.name, points = self.points.len(), "insertion points");
        (self.points, self.tracker)
    }

    fn enter(&mut self, block: &Block, label: Option<&str>) -> ScopeId {
        let declared = block
            .declared_variables()
            .map(|(name, data_type)| Variable::local(name, data_type));
        self.tracker.enter_block(label, declared)
    }

    fn walk(&mut self, stmts: &[ProcStmt]) {
        for stmt in stmts {
            match stmt {
                ProcStmt::Block { label, block, .. } => {
                    self.enter(block, label.as_deref());
                    self.walk(&block.stmts);
                    self.tracker.leave_block();
                }
                ProcStmt::Jump {
                    kind: JumpKind::Leave,
                    label,
                    offset,
                } => {
                    if self.is_routine_label(label) {
                        self.record(*offset);
                    }
                }
                ProcStmt::Jump {
                    kind: JumpKind::Iterate,
                    ..
                } => {}
                ProcStmt::Signal { offset, .. } | ProcStmt::Return { offset, .. } => self.record(*offset),
                ProcStmt::If {
                    branches, else_branch, ..
                }
                | ProcStmt::Case {
                    branches, else_branch, ..
                } => {
                    for branch in branches {
                        self.walk(&branch.body);
                    }
                    if let Some(else_branch) = else_branch {
                        self.walk(else_branch);
                    }
                }
                ProcStmt::Loop { body, .. } => self.walk(body),
                ProcStmt::Sql { .. } => {}
            }
        }
    }

    fn is_routine_label(&self, label: &str) -> bool {
        self.proc_label
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(label))
    }

    fn record(&mut self, anchor: usize) {
        self.points.push(InsertionPoint {
            kind: InsertionKind::BeforeEarlyExit,
            scope: self.tracker.current_scope(),
            anchor: Some(anchor),
        });
    }
}
