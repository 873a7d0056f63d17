use super::patcher::Patcher;
use super::text_patch::{TextDeletion, apply_deletions};
use super::PatchResult;
use crate::split::split_statements;
use crate::stmt::RoutineParser;
use crate::token::hint::hint_removal_start;
use crate::token::scanner::{Scanner, StepKind, find_first_keyword, is_horizontal_space, is_line_break};
use tracing::debug;

impl<P: RoutineParser> Patcher<P> {
    /// Remove hint INSERTs and legacy marker declarations.
    ///
    /// Only executable statements are matched; a hint that was commented out
    /// stays as it is. A hint that had a line to itself takes the line with it.
    pub fn depatch(&self, sql: &str) -> PatchResult {
        let table = self.options().hint_table_name().to_ascii_lowercase();
        let marker = self.options().legacy_marker.to_ascii_lowercase();

        let mut deletions = Vec::new();
        for stmt in split_statements(sql).iter().filter(|s| s.has_code) {
            let lower = stmt.text.to_ascii_lowercase();
            if !lower.contains(&table) && !lower.contains(&marker) {
                continue;
            }
            for (offset, length) in hint_deletions(&stmt.text, &table, &marker) {
                let seq = deletions.len();
                deletions.push(TextDeletion {
                    offset: stmt.start + offset,
                    length,
                    seq,
                });
            }
        }
        debug!(count = deletions.len(), "hint statements to remove");

        PatchResult {
            patched_sql: apply_deletions(sql, deletions),
            warnings: Vec::new(),
        }
    }
}

/// `(offset, length)` of every hint statement in one routine's text.
fn hint_deletions(text: &str, table: &str, marker: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let body_start = find_first_keyword(Scanner::new(text), "BEGIN").map_or(0, |pos| pos + "BEGIN".len());

    let mut scanner = Scanner::new(text).with_lenient_dash_comments().starting_at(body_start);
    let mut segment_start = body_start;
    let mut deletions = Vec::new();

    while let Some(step) = scanner.step() {
        if step.kind != StepKind::Code || bytes[step.start] != b';' {
            continue;
        }
        let segment_end = step.end;
        if let Some(start) = hint_removal_start(&text[segment_start..segment_end], table, marker) {
            let start = segment_start + start;
            let end = own_line_end(bytes, start, segment_end);
            deletions.push((start, end - start));
        }
        segment_start = segment_end;
    }

    deletions
}

/// If the removal starts a line and only blanks follow the `;`, extend it over the line break.
fn own_line_end(bytes: &[u8], start: usize, end: usize) -> usize {
    if start == 0 || !is_line_break(bytes[start - 1]) {
        return end;
    }
    let mut i = end;
    while i < bytes.len() && is_horizontal_space(bytes[i]) {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'\r') if bytes.get(i + 1) == Some(&b'\n') => i + 2,
        Some(b'\r' | b'\n') => i + 1,
        _ => end,
    }
}
