#[cfg(test)]
mod tests {
    use crate::patch::text_patch::*;

    fn ins(offset: usize, text: &str, seq: usize) -> TextInsertion {
        TextInsertion {
            offset,
            text: text.to_string(),
            seq,
        }
    }

    #[test]
    fn test_insertions_keep_original_offsets() {
        let out = apply_insertions("abcdef", vec![ins(1, "X", 0), ins(4, "Y", 1), ins(6, "Z", 2)]);
        assert_eq!(out, "aXbcdYefZ");
    }

    #[test]
    fn test_insertions_at_same_offset_follow_seq() {
        let out = apply_insertions("ab", vec![ins(1, "2", 1), ins(1, "1", 0), ins(1, "3", 2)]);
        assert_eq!(out, "a123b");
    }

    #[test]
    fn test_out_of_range_and_split_char_edits_are_skipped() {
        assert_eq!(apply_insertions("ab", vec![ins(3, "X", 0)]), "ab");
        // 'é' is two bytes; offset 2 lands inside it
        assert_eq!(apply_insertions("aé", vec![ins(2, "X", 0), ins(3, "Y", 1)]), "aéY");
        assert_eq!(apply_insertions("", Vec::new()), "");
    }

    #[test]
    fn test_deletions() {
        let dels = vec![
            TextDeletion { offset: 1, length: 2, seq: 0 },
            TextDeletion { offset: 4, length: 0, seq: 1 },
            TextDeletion { offset: 5, length: 10, seq: 2 },
            TextDeletion { offset: 9, length: 1, seq: 3 },
        ];
        assert_eq!(apply_deletions("abcdefg", dels), "ade");
    }

    #[test]
    fn test_newline_detection() {
        assert_eq!(detect_newline("a\nb"), "\n");
        assert_eq!(detect_newline("a\r\nb\n"), "\r\n");
        assert_eq!(detect_newline("one line"), "\n");
    }

    #[test]
    fn test_line_helpers() {
        let text = "BEGIN\n\t  SELECT 1;\n\n   \nEND";
        let end = text.find("END").unwrap();
        assert_eq!(find_line_start(text, end), end);
        let select = text.find("SELECT").unwrap();
        assert_eq!(find_line_start(text, select), 6);
        assert_eq!(line_indent(text, 6), "\t  ");
        assert_eq!(indent_of_previous_non_empty_line(text, end), "\t  ");
        assert_eq!(indent_of_previous_non_empty_line(text, 6), "");
        assert_eq!(indent_of_previous_non_empty_line(text, 0), "");
        assert!(!has_code_before(text, 6, select));
        assert!(has_code_before("x; END", 0, 3));
    }

    #[test]
    fn test_line_start_with_carriage_returns() {
        let text = "a\r\n  b";
        assert_eq!(find_line_start(text, 5), 3);
        assert_eq!(line_indent(text, 3), "  ");
        assert_eq!(indent_of_previous_non_empty_line(text, 3), "");
    }
}
