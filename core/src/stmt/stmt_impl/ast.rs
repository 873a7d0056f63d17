/// Result of parsing one statement of a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStatement {
    /// CREATE PROCEDURE / CREATE FUNCTION
    Routine(RoutineDef),
    /// Anything else; left untouched by the patcher.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Procedure,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    In,
    Out,
    InOut,
}

/// A stored routine definition.
///
/// Grammar accepted by the parser:
/// routine   ::= CREATE [OR REPLACE] [DEFINER '=' user] (PROCEDURE | FUNCTION) [IF NOT EXISTS]
///               name '(' [param {',' param}] ')' [RETURNS type] characteristic* [body] [';']
/// param     ::= [IN | OUT | INOUT] name type
/// body      ::= [label ':'] BEGIN block END [label] | statement
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineDef {
    pub kind: RoutineKind,
    pub name: String,
    pub schema: Option<String>,
    pub params: Vec<ParamDecl>,
    /// Function return type, as written.
    pub returns: Option<String>,
    pub body: Option<RoutineBody>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    /// `Some(In)` for procedure parameters without an explicit mode; `None` for function parameters.
    pub direction: Option<ParamDirection>,
    pub data_type: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoutineBody {
    /// BEGIN ... END
    Block(Block),
    /// label: BEGIN ... END [label]
    Labeled(LabeledBlock),
    /// A single non-block statement, e.g. `RETURN x + 1`.
    Statement(ProcStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledBlock {
    pub label: String,
    pub block: Block,
    /// Offset of the label.
    pub offset: usize,
}

/// Contents of a BEGIN ... END block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub decls: Vec<Declaration>,
    pub stmts: Vec<ProcStmt>,
    /// Offset of BEGIN.
    pub offset: usize,
    /// Offset of the closing END.
    pub end_offset: usize,
}

impl Block {
    /// Local variables declared in this block as `(name, type)`, in declaration order.
    pub fn declared_variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls
            .iter()
            .filter_map(|decl| match decl {
                Declaration::Variables { names, data_type, .. } => Some((names, data_type)),
                _ => None,
            })
            .flat_map(|(names, data_type)| names.iter().map(move |n| (n.as_str(), data_type.as_str())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerAction {
    Continue,
    Exit,
    Undo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// DECLARE a, b INT [DEFAULT expr];
    Variables {
        names: Vec<String>,
        data_type: String,
        default: Option<String>,
        offset: usize,
    },
    /// DECLARE name CONDITION FOR value;
    Condition { name: String, value: String, offset: usize },
    /// DECLARE name CURSOR FOR select;
    Cursor { name: String, query: String, offset: usize },
    /// DECLARE action HANDLER FOR conditions statement
    Handler {
        action: HandlerAction,
        conditions: String,
        body: Box<ProcStmt>,
        offset: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    While,
    Repeat,
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Leave,
    Iterate,
}

/// One `WHEN`/`IF`/`ELSEIF` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct CondBranch {
    pub condition: String,
    pub body: Vec<ProcStmt>,
}

/// Statement inside a routine body.
///
/// statement ::= [label ':'] BEGIN block END [label] ';'
///             | IF c THEN stmts {ELSEIF c THEN stmts} [ELSE stmts] END IF ';'
///             | CASE [v] {WHEN c THEN stmts} [ELSE stmts] END CASE ';'
///             | [label ':'] WHILE c DO stmts END WHILE [label] ';'
///             | [label ':'] REPEAT stmts UNTIL c END REPEAT [label] ';'
///             | [label ':'] LOOP stmts END LOOP [label] ';'
///             | (LEAVE | ITERATE) label ';'
///             | SIGNAL ... ';'
///             | RETURN expr ';'
///             | sql ';'
#[derive(Debug, Clone, PartialEq)]
pub enum ProcStmt {
    /// Nested BEGIN ... END, labeled or not.
    Block {
        label: Option<String>,
        block: Block,
        offset: usize,
    },
    If {
        branches: Vec<CondBranch>,
        else_branch: Option<Vec<ProcStmt>>,
        offset: usize,
    },
    Case {
        operand: Option<String>,
        branches: Vec<CondBranch>,
        else_branch: Option<Vec<ProcStmt>>,
        offset: usize,
    },
    /// WHILE / REPEAT / LOOP. `condition` is `None` for LOOP.
    Loop {
        kind: LoopKind,
        label: Option<String>,
        condition: Option<String>,
        body: Vec<ProcStmt>,
        offset: usize,
    },
    /// LEAVE label / ITERATE label
    Jump { kind: JumpKind, label: String, offset: usize },
    Signal { text: String, offset: usize },
    Return { expr: String, offset: usize },
    /// Any other statement, kept as source text.
    Sql { text: String, offset: usize },
}

impl ProcStmt {
    /// Byte offset of the statement's first token (its label, if any).
    pub fn offset(&self) -> usize {
        match self {
            ProcStmt::Block { offset, .. }
            | ProcStmt::If { offset, .. }
            | ProcStmt::Case { offset, .. }
            | ProcStmt::Loop { offset, .. }
            | ProcStmt::Jump { offset, .. }
            | ProcStmt::Signal { offset, .. }
            | ProcStmt::Return { offset, .. }
            | ProcStmt::Sql { offset, .. } => *offset,
        }
    }
}
