use super::hint_sql::render_hint_insert;
use super::inserter::{InsertionKind, InsertionPoint, ProcedureInserter};
use super::text_patch::{
    TextInsertion, apply_insertions, detect_newline, find_line_start, has_code_before,
    indent_of_previous_non_empty_line, line_indent,
};
use super::{PatchOptions, PatchResult, PatchWarning};
use crate::resolve::{ScopeTracker, Variable};
use crate::split::{Statement, split_statements};
use crate::stmt::{Block, ParsedStatement, RoutineBody, RoutineDef, RoutineParser, SqlRoutineParser};
use crate::token::hint::has_hint_table_reference;
use crate::token::scanner::find_last_keyword;
use tracing::{debug, warn};

/// Patch, depatch and repatch with a given configuration and routine parser.
#[derive(Debug, Clone, Default)]
pub struct Patcher<P = SqlRoutineParser> {
    options: PatchOptions,
    parser: P,
}

impl Patcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PatchOptions) -> Self {
        Self {
            options,
            parser: SqlRoutineParser,
        }
    }
}

impl<P: RoutineParser> Patcher<P> {
    pub fn with_parser(options: PatchOptions, parser: P) -> Self {
        Self { options, parser }
    }

    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    /// Insert a hint before every exit point of every routine in `sql`.
    ///
    /// Statements that are not routines, do not parse, or already carry
    /// hints are copied through unchanged.
    pub fn patch(&self, sql: &str) -> PatchResult {
        let mut edits = EditBatch::default();

        for stmt in split_statements(sql).iter().filter(|s| s.has_code) {
            match self.parser.parse_one(&stmt.text) {
                Ok(ParsedStatement::Routine(def)) => self.patch_routine(stmt, &def, &mut edits),
                Ok(ParsedStatement::Other) => {}
                Err(err) => {
                    warn!(offset = stmt.start, error = %err, "statement does not parse");
                    edits.warnings.push(PatchWarning::ParseFailure {
                        offset: stmt.start,
                        message: err.to_string(),
                    });
                }
            }
        }

        PatchResult {
            patched_sql: apply_insertions(sql, edits.insertions),
            warnings: edits.warnings,
        }
    }

    /// Hints go on their own line above the exit statement, unless code precedes it on that line; then inline right before it.
    fn patch_routine(&self, stmt: &Statement, def: &RoutineDef, edits: &mut EditBatch) {
        let routine = def.name.clone();

        if has_hint_table_reference(&stmt.text, self.options.hint_table_name()) {
            edits.warnings.push(PatchWarning::AlreadyPatched { routine });
            return;
        }

        let (block, label): (&Block, Option<&str>) = match &def.body {
            None => {
                edits.warnings.push(PatchWarning::MissingBody { routine });
                return;
            }
            Some(RoutineBody::Block(block)) => (block, None),
            Some(RoutineBody::Labeled(labeled)) => (&labeled.block, Some(labeled.label.as_str())),
            Some(body @ RoutineBody::Statement(_)) => {
                edits.warnings.push(PatchWarning::UnsupportedBody {
                    routine,
                    shape: body.kind_name().to_string(),
                });
                return;
            }
        };

        let params: Vec<Variable> = def.params.iter().map(Variable::from).collect();
        let mut inserter = ProcedureInserter::new(def.name.as_str(), params, label);
        inserter.process_body(block, label);
        let (points, tracker) = inserter.finish();
        debug!(routine = %def, points = points.len(), "patching routine");

        let text = stmt.text.as_str();
        let newline = detect_newline(text);
        for point in &points {
            let hint = self.hint_for(&def.name, &tracker, point);
            match point.kind {
                InsertionKind::BeforeEarlyExit => {
                    let anchor = point.anchor.unwrap_or_default();
                    let line_start = find_line_start(text, anchor);
                    if has_code_before(text, line_start, anchor) {
                        edits.insert(stmt.start + anchor, format!("{}; ", hint));
                    } else {
                        let indent = line_indent(text, line_start);
                        edits.insert(stmt.start + line_start, format!("{}{};{}", indent, hint, newline));
                    }
                }
                InsertionKind::FallThrough => {
                    let Some(end) = find_last_keyword(text, "END") else {
                        edits.warnings.push(PatchWarning::EndNotFound {
                            routine: routine.clone(),
                        });
                        continue;
                    };
                    let line_start = find_line_start(text, end);
                    if has_code_before(text, line_start, end) {
                        edits.insert(stmt.start + end, format!("{}; ", hint));
                    } else {
                        let indent = self.end_indent(text, line_start);
                        edits.insert(stmt.start + line_start, format!("{}{};{}", indent, hint, newline));
                    }
                }
            }
        }
    }

    fn hint_for(&self, name: &str, tracker: &ScopeTracker, point: &InsertionPoint) -> String {
        let params: Vec<&Variable> = tracker.parameters().iter().collect();
        let locals = tracker.visible_locals(point.scope, tracker.parameters());
        render_hint_insert(&self.options, name, &params, &locals)
    }

    /// Indent for a hint placed on its own line before the closing END.
    fn end_indent(&self, text: &str, end_line_start: usize) -> String {
        let previous = indent_of_previous_non_empty_line(text, end_line_start);
        if !previous.is_empty() {
            return previous.to_string();
        }
        format!("{}{}", line_indent(text, end_line_start), self.options.indent_unit)
    }
}

#[derive(Default)]
struct EditBatch {
    insertions: Vec<TextInsertion>,
    warnings: Vec<PatchWarning>,
}

impl EditBatch {
    fn insert(&mut self, offset: usize, text: String) {
        let seq = self.insertions.len();
        self.insertions.push(TextInsertion { offset, text, seq });
    }
}
