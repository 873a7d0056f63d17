//! Lightweight tokenizer used to spot hint-table references.
//!
//! Strings and comments are dropped entirely, identifiers are lowercased and
//! backtick-quoted identifiers are unwrapped, so a reference written as
//! `` `SCHEMA`.`__Hint` `` and one written as `schema.__hint` tokenize the same.

use super::scanner::{is_horizontal_space, is_ident_part, is_ident_start, is_line_break, is_space_or_control};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintToken {
    /// Lowercased identifier text, or "." for a qualifier dot.
    pub text: String,
    /// Byte offset of the token (the opening backtick for quoted identifiers).
    pub pos: usize,
}

const INSERT_MODIFIERS: [&str; 4] = ["low_priority", "high_priority", "delayed", "ignore"];

pub fn tokenize_hint_refs(segment: &str) -> Vec<HintToken> {
    let data = segment.as_bytes();
    let mut tokens = Vec::new();
    let mut line_head = true;
    let mut i = 0;

    while i < data.len() {
        let ch = data[i];
        if is_line_break(ch) {
            line_head = true;
            i += 1;
            continue;
        }
        if is_horizontal_space(ch) {
            i += 1;
            continue;
        }

        if ch == b'-' && data.get(i + 1) == Some(&b'-') {
            let opens = match data.get(i + 2) {
                None => true,
                Some(&next) => line_head || is_space_or_control(next),
            };
            if opens {
                i = skip_to_line_break(data, i + 2);
                line_head = true;
                continue;
            }
        }
        if ch == b'#' {
            i = skip_to_line_break(data, i + 1);
            line_head = true;
            continue;
        }
        if ch == b'/' && data.get(i + 1) == Some(&b'*') {
            i += 2;
            while i < data.len() {
                if data[i] == b'*' && data.get(i + 1) == Some(&b'/') {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }

        match ch {
            b'\'' | b'"' => {
                i = skip_string(data, i + 1, ch);
                line_head = false;
            }
            b'`' => {
                let start = i;
                i += 1;
                while i < data.len() {
                    if data[i] == b'`' {
                        if data.get(i + 1) == Some(&b'`') {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                let name = String::from_utf8_lossy(&data[start + 1..i]).to_lowercase();
                tokens.push(HintToken { text: name, pos: start });
                if i < data.len() {
                    i += 1;
                }
                line_head = false;
            }
            _ if is_ident_start(ch) => {
                let start = i;
                i += 1;
                while i < data.len() && is_ident_part(data[i]) {
                    i += 1;
                }
                tokens.push(HintToken {
                    text: segment[start..i].to_ascii_lowercase(),
                    pos: start,
                });
                line_head = false;
            }
            b'.' => {
                tokens.push(HintToken {
                    text: ".".to_string(),
                    pos: i,
                });
                i += 1;
                line_head = false;
            }
            _ => {
                i += 1;
                line_head = false;
            }
        }
    }

    tokens
}

fn skip_to_line_break(data: &[u8], mut i: usize) -> usize {
    while i < data.len() && !is_line_break(data[i]) {
        i += 1;
    }
    i
}

/// Skip a string body starting after its opening quote; returns the offset past the closing quote.
fn skip_string(data: &[u8], mut i: usize, quote: u8) -> usize {
    while i < data.len() {
        if data[i] == b'\\' && i + 1 < data.len() {
            i += 2;
            continue;
        }
        if data[i] == quote {
            if data.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    i
}

/// True if the text references `table` outside strings and comments.
pub fn has_hint_table_reference(text: &str, table: &str) -> bool {
    let table = table.to_ascii_lowercase();
    tokenize_hint_refs(text).iter().any(|tok| tok.text == table)
}

/// If `segment` is a hint statement, return where its removal should start.
///
/// Matches a legacy `DECLARE <legacy_marker> ...` or an
/// `INSERT [modifiers] [INTO] [schema.]<table> ...`. The returned offset is
/// the keyword position widened over horizontal whitespace before it on the
/// same line.
pub fn hint_removal_start(segment: &str, table: &str, legacy_marker: &str) -> Option<usize> {
    let tokens = tokenize_hint_refs(segment);
    if tokens.is_empty() {
        return None;
    }
    let table = table.to_ascii_lowercase();
    let legacy_marker = legacy_marker.to_ascii_lowercase();

    if let Some(pair) = tokens
        .windows(2)
        .find(|pair| pair[0].text == "declare" && pair[1].text == legacy_marker)
    {
        return Some(line_local_start(segment, pair[0].pos));
    }

    for (i, tok) in tokens.iter().enumerate() {
        if tok.text != "insert" {
            continue;
        }
        let mut idx = i + 1;
        while idx < tokens.len() && INSERT_MODIFIERS.contains(&tokens[idx].text.as_str()) {
            idx += 1;
        }
        if idx < tokens.len() && tokens[idx].text == "into" {
            idx += 1;
        }
        let Some(target) = tokens.get(idx) else {
            continue;
        };
        let qualified = tokens.get(idx + 1).is_some_and(|t| t.text == ".")
            && tokens.get(idx + 2).is_some_and(|t| t.text == table);
        if target.text == table || qualified {
            return Some(line_local_start(segment, tok.pos));
        }
    }

    None
}

fn line_local_start(segment: &str, pos: usize) -> usize {
    let bytes = segment.as_bytes();
    let mut start = pos;
    while start > 0 && is_horizontal_space(bytes[start - 1]) {
        start -= 1;
    }
    start
}
