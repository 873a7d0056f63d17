//! Delimiter-aware statement splitting.
//!
//! A source file is cut into statements at the active delimiter, which starts
//! as `;` and is changed by client-style `DELIMITER <token>` lines. Quoted
//! text and comments never terminate a statement.

use crate::token::scanner::{Scanner, StepKind, is_whitespace};
use serde::Serialize;

#[cfg(test)]
mod split_test;

/// One statement of the source. `start..end` is a byte range into the
/// original text; the terminating delimiter is not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// True if the statement has any code outside comments and whitespace.
    pub has_code: bool,
}

const DELIMITER_CANDIDATES: [&str; 6] = ["$$", "//", ";;", "||", "##", "@@"];
const FALLBACK_DELIMITER: &str = "__PROCPATCH_DELIM__";

struct Splitter<'a> {
    source: &'a str,
    statements: Vec<Statement>,
    start: usize,
    has_code: bool,
}

impl<'a> Splitter<'a> {
    fn flush(&mut self, end: usize) {
        if end > self.start {
            self.statements.push(Statement {
                text: self.source[self.start..end].to_string(),
                start: self.start,
                end,
                has_code: self.has_code,
            });
        }
        self.has_code = false;
    }

    fn restart_at(&mut self, pos: usize) {
        self.start = pos;
        self.has_code = false;
    }
}

/// Split `source` into statements, honoring `DELIMITER` directives.
///
/// Directive lines belong to no statement. Empty spans between delimiters
/// are dropped; comment-only spans are kept with `has_code == false`.
pub fn split_statements(source: &str) -> Vec<Statement> {
    let data = source.as_bytes();
    let mut delimiter = String::from(";");
    let mut scanner = Scanner::new(source);
    let mut splitter = Splitter {
        source,
        statements: Vec::new(),
        start: 0,
        has_code: false,
    };

    while !scanner.at_end() {
        let pos = scanner.pos();

        if let Some(directive) = scanner.delimiter_directive() {
            splitter.flush(pos);
            scanner.jump_to_line_start(directive.next);
            splitter.restart_at(directive.next);
            tracing::trace!(offset = pos, delimiter = %directive.delimiter, "delimiter directive");
            delimiter = directive.delimiter;
            continue;
        }

        if scanner.in_code() && data[pos..].starts_with(delimiter.as_bytes()) {
            splitter.flush(pos);
            scanner.skip_code(delimiter.len());
            splitter.restart_at(scanner.pos());
            continue;
        }

        let Some(step) = scanner.step() else {
            break;
        };
        if step.kind == StepKind::Code && data[step.start..step.end].iter().any(|&b| !is_whitespace(b)) {
            splitter.has_code = true;
        }
    }

    splitter.flush(data.len());
    splitter.statements
}

/// Re-terminate every code-bearing statement with `;`, one per line.
///
/// Directive lines and comment-only statements are dropped, so the result can
/// be fed to a parser that only understands `;`.
pub fn normalize_delimiters(source: &str) -> String {
    split_statements(source)
        .iter()
        .filter(|stmt| stmt.has_code)
        .map(|stmt| format!("{};", stmt.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Choose a statement delimiter that does not occur anywhere in `text`.
pub fn pick_delimiter(text: &str) -> String {
    if let Some(candidate) = DELIMITER_CANDIDATES.iter().find(|c| !text.contains(**c)) {
        return candidate.to_string();
    }
    if !text.contains(FALLBACK_DELIMITER) {
        return FALLBACK_DELIMITER.to_string();
    }
    (1..)
        .map(|n| format!("{FALLBACK_DELIMITER}_{n}"))
        .find(|candidate| !text.contains(candidate.as_str()))
        .unwrap_or_else(|| FALLBACK_DELIMITER.to_string())
}
