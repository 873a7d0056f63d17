use super::{HandlerAction, JumpKind, LoopKind, ParamDecl, ParamDirection, ProcStmt, RoutineBody, RoutineDef, RoutineKind};
use std::fmt::{self, Display};

impl Display for RoutineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutineKind::Procedure => write!(f, "PROCEDURE"),
            RoutineKind::Function => write!(f, "FUNCTION"),
        }
    }
}

impl Display for ParamDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamDirection::In => write!(f, "IN"),
            ParamDirection::Out => write!(f, "OUT"),
            ParamDirection::InOut => write!(f, "INOUT"),
        }
    }
}

impl Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopKind::While => write!(f, "WHILE"),
            LoopKind::Repeat => write!(f, "REPEAT"),
            LoopKind::Loop => write!(f, "LOOP"),
        }
    }
}

impl Display for JumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JumpKind::Leave => write!(f, "LEAVE"),
            JumpKind::Iterate => write!(f, "ITERATE"),
        }
    }
}

impl Display for HandlerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerAction::Continue => write!(f, "CONTINUE"),
            HandlerAction::Exit => write!(f, "EXIT"),
            HandlerAction::Undo => write!(f, "UNDO"),
        }
    }
}

impl Display for ParamDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(direction) => write!(f, "{} {} {}", direction, self.name, self.data_type),
            None => write!(f, "{} {}", self.name, self.data_type),
        }
    }
}

/// Routine signature, e.g. `PROCEDURE app.p(IN x INT)`.
impl Display for RoutineDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.kind, self.qualified_name())?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")?;
        if let Some(returns) = &self.returns {
            write!(f, " RETURNS {}", returns)?;
        }
        Ok(())
    }
}

impl RoutineDef {
    /// `schema.name`, or just `name` when unqualified.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

impl ProcStmt {
    /// Short human-readable name of the statement kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ProcStmt::Block { label: Some(_), .. } => "labeled block",
            ProcStmt::Block { label: None, .. } => "block",
            ProcStmt::If { .. } => "IF statement",
            ProcStmt::Case { .. } => "CASE statement",
            ProcStmt::Loop { kind: LoopKind::While, .. } => "WHILE loop",
            ProcStmt::Loop { kind: LoopKind::Repeat, .. } => "REPEAT loop",
            ProcStmt::Loop { kind: LoopKind::Loop, .. } => "LOOP",
            ProcStmt::Jump { kind: JumpKind::Leave, .. } => "LEAVE statement",
            ProcStmt::Jump { kind: JumpKind::Iterate, .. } => "ITERATE statement",
            ProcStmt::Signal { .. } => "SIGNAL statement",
            ProcStmt::Return { .. } => "RETURN statement",
            ProcStmt::Sql { .. } => "SQL statement",
        }
    }
}

impl RoutineBody {
    pub fn kind_name(&self) -> &'static str {
        match self {
            RoutineBody::Block(_) => "block",
            RoutineBody::Labeled(_) => "labeled block",
            RoutineBody::Statement(stmt) => stmt.kind_name(),
        }
    }
}
