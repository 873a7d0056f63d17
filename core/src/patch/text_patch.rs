//! Offset-based edits over one immutable source buffer.
//!
//! Edits are applied from the highest offset down, so every offset stays
//! valid against the original text. At equal offsets the edit with the higher
//! `seq` goes first, which leaves insertions in ascending `seq` order.

use crate::token::scanner::{is_horizontal_space, is_line_break};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInsertion {
    pub offset: usize,
    pub text: String,
    pub seq: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDeletion {
    pub offset: usize,
    pub length: usize,
    pub seq: usize,
}

pub fn apply_insertions(source: &str, mut insertions: Vec<TextInsertion>) -> String {
    if insertions.is_empty() {
        return source.to_string();
    }
    insertions.sort_by(|a, b| b.offset.cmp(&a.offset).then(b.seq.cmp(&a.seq)));
    debug!(count = insertions.len(), "applying insertions");

    let mut out = source.to_string();
    for ins in insertions {
        if ins.offset > out.len() {
            warn!(offset = ins.offset, len = out.len(), "insertion past end of text, skipped");
            continue;
        }
        if !out.is_char_boundary(ins.offset) {
            warn!(offset = ins.offset, "insertion inside a multi-byte character, skipped");
            continue;
        }
        out.insert_str(ins.offset, &ins.text);
    }
    out
}

/// Deletions running past the end are clamped; empty ones are ignored.
pub fn apply_deletions(source: &str, mut deletions: Vec<TextDeletion>) -> String {
    if deletions.is_empty() {
        return source.to_string();
    }
    deletions.sort_by(|a, b| b.offset.cmp(&a.offset).then(b.seq.cmp(&a.seq)));
    debug!(count = deletions.len(), "applying deletions");

    let mut out = source.to_string();
    for del in deletions {
        if del.length == 0 {
            continue;
        }
        if del.offset > out.len() {
            warn!(offset = del.offset, len = out.len(), "deletion past end of text, skipped");
            continue;
        }
        let end = del.offset.saturating_add(del.length).min(out.len());
        if !out.is_char_boundary(del.offset) || !out.is_char_boundary(end) {
            warn!(offset = del.offset, end, "deletion splits a multi-byte character, skipped");
            continue;
        }
        out.replace_range(del.offset..end, "");
    }
    out
}

/// `"\r\n"` if the text uses it anywhere, otherwise `"\n"`.
pub fn detect_newline(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Offset of the first byte of the line containing `pos`.
pub fn find_line_start(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut pos = pos.min(bytes.len());
    while pos > 0 && !is_line_break(bytes[pos - 1]) {
        pos -= 1;
    }
    pos
}

/// Leading spaces and tabs of the line starting at `line_start`.
pub fn line_indent(text: &str, line_start: usize) -> &str {
    let start = line_start.min(text.len());
    let len = text.as_bytes()[start..]
        .iter()
        .take_while(|&&b| is_horizontal_space(b))
        .count();
    &text[start..start + len]
}

/// True if anything but spaces and tabs sits between `line_start` and `pos`.
pub fn has_code_before(text: &str, line_start: usize, pos: usize) -> bool {
    text.as_bytes()[line_start.min(pos)..pos.min(text.len())]
        .iter()
        .any(|&b| !is_horizontal_space(b))
}

/// Indent of the closest line above `line_start` that is not blank; empty if there is none.
pub fn indent_of_previous_non_empty_line(text: &str, line_start: usize) -> &str {
    let bytes = text.as_bytes();
    let mut end = line_start.min(bytes.len());
    loop {
        while end > 0 && is_line_break(bytes[end - 1]) {
            end -= 1;
        }
        if end == 0 {
            return "";
        }
        let start = find_line_start(text, end);
        if !text[start..end].trim().is_empty() {
            return line_indent(text, start);
        }
        end = start;
    }
}
