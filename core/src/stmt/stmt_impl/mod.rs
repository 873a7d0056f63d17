mod ast;
mod display;

pub use ast::{
    Block, CondBranch, Declaration, HandlerAction, JumpKind, LabeledBlock, LoopKind, ParamDecl, ParamDirection,
    ParsedStatement, ProcStmt, RoutineBody, RoutineDef, RoutineKind,
};
