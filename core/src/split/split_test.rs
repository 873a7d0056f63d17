#[cfg(test)]
mod tests {
    use crate::split::{Statement, normalize_delimiters, pick_delimiter, split_statements};

    fn code_texts(stmts: &[Statement]) -> Vec<&str> {
        stmts.iter().filter(|s| s.has_code).map(|s| s.text.trim()).collect()
    }

    #[test]
    fn test_splits_on_default_semicolon() {
        let source = "SELECT 1; SELECT 2;";
        let stmts = split_statements(source);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].text, "SELECT 1");
        assert_eq!((stmts[0].start, stmts[0].end), (0, 8));
        assert_eq!(stmts[1].text, " SELECT 2");
        assert_eq!(&source[stmts[1].start..stmts[1].end], " SELECT 2");
    }

    #[test]
    fn test_delimiter_directive_changes_terminator() {
        let source = "DELIMITER //\nCREATE PROCEDURE p() BEGIN SELECT 1; SELECT 2; END//\nDELIMITER ;\nSELECT 3;";
        let stmts = split_statements(source);
        assert_eq!(
            code_texts(&stmts),
            vec!["CREATE PROCEDURE p() BEGIN SELECT 1; SELECT 2; END", "SELECT 3"]
        );
        for stmt in &stmts {
            assert!(!stmt.text.contains("DELIMITER"), "directive leaked into {:?}", stmt.text);
            assert_eq!(&source[stmt.start..stmt.end], stmt.text);
        }
    }

    #[test]
    fn test_delimiters_inside_literals_and_comments_are_ignored() {
        let source = "SELECT ';', \";\", `a;b` -- x;y\n/* ; */ FROM t; # c;\nSELECT 2";
        let stmts = split_statements(source);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].text.starts_with("SELECT ';'"));
        assert!(stmts[0].text.ends_with("FROM t"));
        assert_eq!(stmts[1].text, " # c;\nSELECT 2");
        assert!(stmts[1].has_code);
    }

    #[test]
    fn test_comment_only_statement_has_no_code() {
        let stmts = split_statements("-- header\n/* block */;SELECT 1;");
        assert_eq!(stmts.len(), 2);
        assert!(!stmts[0].has_code);
        assert_eq!(stmts[0].text, "-- header\n/* block */");
        assert!(stmts[1].has_code);
    }

    #[test]
    fn test_directive_only_at_line_start() {
        let stmts = split_statements("SELECT 'x' DELIMITER //;\nSELECT 1;");
        assert_eq!(code_texts(&stmts), vec!["SELECT 'x' DELIMITER //", "SELECT 1"]);

        // a quoted line break does not open a directive line
        let stmts = split_statements("SELECT 'a\nDELIMITER //\n';");
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].text.contains("DELIMITER //"));
    }

    #[test]
    fn test_directive_without_token_is_not_a_boundary() {
        let stmts = split_statements("SELECT 1\nDELIMITER\n;");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].text, "SELECT 1\nDELIMITER\n");
    }

    #[test]
    fn test_crlf_directive_lines() {
        let source = "DELIMITER $$\r\nSELECT 1; SELECT 2$$\r\nDELIMITER ;\r\n";
        let stmts = split_statements(source);
        assert_eq!(code_texts(&stmts), vec!["SELECT 1; SELECT 2"]);
        assert!(stmts.iter().all(|s| !s.text.contains('$')));
    }

    #[test]
    fn test_tail_without_delimiter_is_flushed() {
        let stmts = split_statements("SELECT 1; SELECT 2");
        assert_eq!(stmts.last().map(|s| s.text.as_str()), Some(" SELECT 2"));
        assert!(split_statements("").is_empty());
        assert!(split_statements(";;;").is_empty());
    }

    #[test]
    fn test_whitespace_only_span_has_no_code() {
        let stmts = split_statements("SELECT 1;\n\n");
        assert_eq!(stmts.len(), 2);
        assert!(!stmts[1].has_code);
    }

    #[test]
    fn test_opening_quote_counts_as_code() {
        let stmts = split_statements("'x'");
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].has_code);
    }

    #[test]
    fn test_normalize_rewrites_terminators() {
        let source = "-- lead\nDELIMITER //\nCREATE PROCEDURE p() BEGIN SELECT 1; END //\nDELIMITER ;\n  SELECT 2 ;\n";
        assert_eq!(
            normalize_delimiters(source),
            "CREATE PROCEDURE p() BEGIN SELECT 1; END;\nSELECT 2;"
        );
    }

    #[test]
    fn test_pick_delimiter_skips_used_candidates() {
        assert_eq!(pick_delimiter("SELECT 1"), "$$");
        assert_eq!(pick_delimiter("SELECT '$$'"), "//");
        let all = "$$ // ;; || ## @@";
        assert_eq!(pick_delimiter(all), "__PROCPATCH_DELIM__");
        let with_fallback = format!("{all} __PROCPATCH_DELIM__ __PROCPATCH_DELIM___1");
        assert_eq!(pick_delimiter(&with_fallback), "__PROCPATCH_DELIM___2");
    }
}
