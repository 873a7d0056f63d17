#[cfg(test)]
mod tests {
    use crate::patch::hint_sql::{helper_schema_sql, render_hint_insert};
    use crate::patch::{PatchOptions, PatchWarning, Patcher, depatch, patch, repatch};
    use crate::resolve::Variable;
    use crate::stmt::{Block, ParsedStatement, ProcStmt, RoutineBody, RoutineDef, RoutineKind, RoutineParser};
    use crate::token::ParseError;

    const HINT_PREFIX: &str = "INSERT INTO __ULTRAVERSE_PROCEDURE_HINT (callid, procname, args, vars) VALUES (UUID_SHORT(), ";

    fn hint(name: &str, args: &str, vars: &str) -> String {
        format!("{}'{}', {}, {})", HINT_PREFIX, name, args, vars)
    }

    fn lines(lines: &[&str], newline: &str) -> String {
        lines.join(newline)
    }

    #[test]
    fn test_labeled_single_line_procedure() {
        let source = "DELIMITER //\nCREATE PROCEDURE P(IN x INT) p_label: BEGIN DECLARE y INT DEFAULT 0; IF y=0 THEN LEAVE p_label; END IF; END//\nDELIMITER ;\n";
        let h = hint("P", "JSON_OBJECT('x', x)", "JSON_OBJECT('y', y)");
        let expected = format!(
            "DELIMITER //\nCREATE PROCEDURE P(IN x INT) p_label: BEGIN DECLARE y INT DEFAULT 0; IF y=0 THEN {h}; LEAVE p_label; END IF; {h}; END//\nDELIMITER ;\n"
        );

        let result = patch(source);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.patched_sql, expected);
        assert_eq!(depatch(&result.patched_sql).patched_sql, source);
    }

    #[test]
    fn test_multi_line_procedure_gets_own_lines() {
        let source = lines(
            &[
                "DELIMITER //",
                "CREATE PROCEDURE RoundTrip(IN n INT)",
                "RoundTrip_Label:BEGIN",
                "  DECLARE v INT DEFAULT 0;",
                "  IF v = 0 THEN",
                "    LEAVE RoundTrip_Label;",
                "  END IF;",
                "END//",
                "DELIMITER ;",
                "",
            ],
            "\n",
        );
        let h = hint("RoundTrip", "JSON_OBJECT('n', n)", "JSON_OBJECT('v', v)");
        let expected = lines(
            &[
                "DELIMITER //",
                "CREATE PROCEDURE RoundTrip(IN n INT)",
                "RoundTrip_Label:BEGIN",
                "  DECLARE v INT DEFAULT 0;",
                "  IF v = 0 THEN",
                &format!("    {h};"),
                "    LEAVE RoundTrip_Label;",
                "  END IF;",
                &format!("  {h};"),
                "END//",
                "DELIMITER ;",
                "",
            ],
            "\n",
        );

        let patched = patch(&source);
        assert_eq!(patched.patched_sql, expected);

        let restored = depatch(&patched.patched_sql);
        assert!(!restored.patched_sql.contains("__ULTRAVERSE_PROCEDURE_HINT"));
        assert!(restored.patched_sql.contains("LEAVE RoundTrip_Label;"));
        assert_eq!(restored.patched_sql, source);
    }

    #[test]
    fn test_leave_to_loop_label_only_gets_end_hint() {
        let source = "CREATE PROCEDURE p() p: BEGIN\n  loop_label: WHILE 1 DO\n    LEAVE loop_label;\n  END WHILE;\nEND";
        let patched = patch(source).patched_sql;
        assert_eq!(patched.matches("INSERT INTO __ULTRAVERSE_PROCEDURE_HINT").count(), 1);
        assert!(patched.contains("    LEAVE loop_label;\n  END WHILE;\n  INSERT INTO"));
    }

    #[test]
    fn test_crlf_sources_keep_crlf() {
        let source = lines(
            &[
                "DELIMITER $$",
                "CREATE PROCEDURE p(IN a INT)",
                "BEGIN",
                "  IF a < 0 THEN",
                "    SIGNAL SQLSTATE '45000' SET MESSAGE_TEXT = 'negative';",
                "  END IF;",
                "END$$",
                "DELIMITER ;",
                "",
            ],
            "\r\n",
        );
        let patched = patch(&source).patched_sql;

        assert_eq!(patched.matches(HINT_PREFIX).count(), 2);
        let bare_newlines = patched
            .match_indices('\n')
            .filter(|(i, _)| patched.as_bytes()[i - 1] != b'\r')
            .count();
        assert_eq!(bare_newlines, 0, "{:?}", patched);
        assert!(patched.contains("    INSERT INTO __ULTRAVERSE_PROCEDURE_HINT"));
        assert_eq!(depatch(&patched).patched_sql, source);
    }

    #[test]
    fn test_empty_body_end_indent_falls_back() {
        let source = "CREATE PROCEDURE p()\nBEGIN\nEND";
        let h = hint("p", "JSON_OBJECT()", "JSON_OBJECT()");
        assert_eq!(patch(source).patched_sql, format!("CREATE PROCEDURE p()\nBEGIN\n    {h};\nEND"));

        let nested = "CREATE PROCEDURE p()\nBEGIN\n\n  END";
        assert_eq!(patch(nested).patched_sql, format!("CREATE PROCEDURE p()\nBEGIN\n\n      {h};\n  END"));
    }

    #[test]
    fn test_patch_is_idempotent() {
        let source = "DELIMITER //\nCREATE PROCEDURE p(x INT)\nBEGIN\n  IF x THEN\n    RETURN 0;\n  END IF;\nEND//\nDELIMITER ;\nSELECT 1;\n";
        let once = patch(source);
        assert!(once.warnings.is_empty());

        let twice = patch(&once.patched_sql);
        assert_eq!(twice.patched_sql, once.patched_sql);
        assert_eq!(
            twice.warnings,
            vec![PatchWarning::AlreadyPatched {
                routine: "p".to_string()
            }]
        );
        assert_eq!(
            twice.warning_messages(),
            vec!["Warning: Procedure 'p' already patched, skipping".to_string()]
        );
    }

    #[test]
    fn test_depatch_keeps_commented_hint() {
        let source = lines(
            &[
                "DELIMITER //",
                "CREATE PROCEDURE LegacyProc()",
                "BEGIN",
                "  -- INSERT INTO __ULTRAVERSE_PROCEDURE_HINT (procname) VALUES ('LegacyProc');",
                "  DECLARE __ultraverse_callinfo VARCHAR(512) DEFAULT JSON_ARRAY(UUID_SHORT(), 'LegacyProc');",
                "  INSERT INTO __ULTRAVERSE_PROCEDURE_HINT (callinfo) VALUES (__ultraverse_callinfo);",
                "  SELECT 1;",
                "END//",
                "DELIMITER ;",
                "",
            ],
            "\n",
        );
        let expected = lines(
            &[
                "DELIMITER //",
                "CREATE PROCEDURE LegacyProc()",
                "BEGIN",
                "  -- INSERT INTO __ULTRAVERSE_PROCEDURE_HINT (procname) VALUES ('LegacyProc');",
                "  SELECT 1;",
                "END//",
                "DELIMITER ;",
                "",
            ],
            "\n",
        );
        let result = depatch(&source);
        assert!(result.warnings.is_empty());
        assert_eq!(result.patched_sql, expected);
    }

    #[test]
    fn test_depatch_matches_insert_variants() {
        let source = "DELIMITER //\nCREATE FUNCTION f(a INT) RETURNS INT\nBEGIN\n  \
                      INSERT IGNORE `app`.`__ultraverse_procedure_hint` (procname) VALUES ('f');\n  \
                      INSERT INTO other_table VALUES ('__ULTRAVERSE_PROCEDURE_HINT');\n  \
                      SELECT '__ULTRAVERSE_PROCEDURE_HINT;' INTO @x; INSERT LOW_PRIORITY INTO __ultraverse_procedure_hint VALUES (1);\n  \
                      RETURN 1;\nEND//\n";
        let expected = "DELIMITER //\nCREATE FUNCTION f(a INT) RETURNS INT\nBEGIN\n  \
                        INSERT INTO other_table VALUES ('__ULTRAVERSE_PROCEDURE_HINT');\n  \
                        SELECT '__ULTRAVERSE_PROCEDURE_HINT;' INTO @x;\n  \
                        RETURN 1;\nEND//\n";
        assert_eq!(depatch(source).patched_sql, expected);
    }

    #[test]
    fn test_depatch_leaves_top_level_statements() {
        let source = "INSERT INTO __ULTRAVERSE_PROCEDURE_HINT VALUES (1);\nSELECT 2;\n";
        assert_eq!(depatch(source).patched_sql, source);
        assert_eq!(depatch("SELECT 1; -- __ultraverse_callinfo\n").patched_sql, "SELECT 1; -- __ultraverse_callinfo\n");
    }

    #[test]
    fn test_repatch_replaces_legacy_format() {
        let source = lines(
            &[
                "DELIMITER //",
                "CREATE PROCEDURE LegacyProc()",
                "BEGIN",
                "  -- INSERT INTO __ULTRAVERSE_PROCEDURE_HINT (procname) VALUES ('LegacyProc');",
                "  DECLARE __ultraverse_callinfo VARCHAR(512) DEFAULT JSON_ARRAY(UUID_SHORT(), 'LegacyProc');",
                "  INSERT INTO __ULTRAVERSE_PROCEDURE_HINT (callinfo) VALUES (__ultraverse_callinfo);",
                "  SELECT 1;",
                "END//",
                "DELIMITER ;",
                "",
            ],
            "\n",
        );
        let result = repatch(&source);
        let sql = &result.patched_sql;

        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert!(!sql.to_lowercase().contains("__ultraverse_callinfo"));
        assert_eq!(sql.matches(HINT_PREFIX).count(), 1);
        assert!(sql.contains("  -- INSERT INTO __ULTRAVERSE_PROCEDURE_HINT (procname) VALUES ('LegacyProc');\n"));
        assert!(sql.contains(&format!(
            "  SELECT 1;\n  {};\nEND//",
            hint("LegacyProc", "JSON_OBJECT()", "JSON_OBJECT()")
        )));
    }

    #[test]
    fn test_repatch_keeps_single_insert() {
        let source = lines(
            &[
                "DELIMITER //",
                "CREATE PROCEDURE AlreadyPatched()",
                "BEGIN",
                "  INSERT INTO __ULTRAVERSE_PROCEDURE_HINT (callid, procname, args, vars) VALUES (UUID_SHORT(), 'AlreadyPatched', JSON_OBJECT(), JSON_OBJECT());",
                "  SELECT 1;",
                "END//",
                "DELIMITER ;",
                "",
            ],
            "\n",
        );
        let result = repatch(&source);
        assert_eq!(result.patched_sql.matches("INSERT INTO __ULTRAVERSE_PROCEDURE_HINT").count(), 1);
        assert_eq!(repatch(&result.patched_sql).patched_sql, result.patched_sql);
    }

    #[test]
    fn test_untouched_statements_are_byte_identical() {
        let source = "-- header\nSELECT 1;\nDELIMITER //\nCREATE PROCEDURE bad() a: BEGIN SELECT 1; END b//\nDELIMITER ;\n/* tail */ UPDATE t SET a = 'END';\n";
        let result = patch(source);
        assert_eq!(result.patched_sql, source);

        let offset = source.find("CREATE").unwrap();
        match &result.warnings[..] {
            [PatchWarning::ParseFailure { offset: at, message }] => {
                assert_eq!(*at, offset);
                assert!(message.contains("End label"), "{}", message);
            }
            other => panic!("Expected one parse failure, got {:?}", other),
        }
        assert!(
            result.warnings[0]
                .to_string()
                .starts_with(&format!("Warning: failed to parse statement at offset {}, leaving unchanged: ", offset))
        );
    }

    #[test]
    fn test_body_shape_warnings() {
        let result = patch("CREATE PROCEDURE p();\nCREATE FUNCTION f(a INT) RETURNS INT RETURN a + 1;\n");
        assert_eq!(
            result.warning_messages(),
            vec![
                "Warning: Procedure 'p' has no body, skipping".to_string(),
                "Warning: Procedure 'f' has unsupported body type: RETURN statement, skipping".to_string(),
            ]
        );
        assert_eq!(result.warnings[1].routine(), Some("f"));
    }

    /// Reports every statement as a routine whose body is one SIGNAL, wherever the text has one.
    struct SignalOnlyParser;

    impl RoutineParser for SignalOnlyParser {
        fn parse_one(&self, text: &str) -> Result<ParsedStatement, ParseError> {
            let stmts = text
                .find("SIGNAL")
                .map(|offset| ProcStmt::Signal {
                    text: "SIGNAL x".to_string(),
                    offset,
                })
                .into_iter()
                .collect();
            Ok(ParsedStatement::Routine(RoutineDef {
                kind: RoutineKind::Procedure,
                name: "ghost".to_string(),
                schema: None,
                params: Vec::new(),
                returns: None,
                body: Some(RoutineBody::Block(Block {
                    stmts,
                    ..Block::default()
                })),
                offset: 0,
            }))
        }
    }

    #[test]
    fn test_missing_end_keyword_skips_only_end_insert() {
        let patcher = Patcher::with_parser(PatchOptions::default(), SignalOnlyParser);

        let result = patcher.patch("CALL ghost(\n  SIGNAL x)");
        assert_eq!(
            result.patched_sql,
            format!(
                "CALL ghost(\n  {};\n  SIGNAL x)",
                hint("ghost", "JSON_OBJECT()", "JSON_OBJECT()")
            )
        );
        assert_eq!(
            result.warnings,
            vec![PatchWarning::EndNotFound {
                routine: "ghost".to_string()
            }]
        );
        assert_eq!(
            result.warnings[0].to_string(),
            "Warning: Procedure 'ghost' end not found, skipping end insert"
        );

        let empty = patcher.patch("CALL ghost()");
        assert_eq!(empty.patched_sql, "CALL ghost()");
        assert_eq!(empty.warnings.len(), 1);
    }

    #[test]
    fn test_custom_options() {
        let options = PatchOptions::from_toml_str(
            r#"
hint_table = "audit.__call_hint"
call_id_expr = "UUID()"
indent_unit = "\t"
"#,
        )
        .unwrap();
        assert_eq!(options.legacy_marker, "__ultraverse_callinfo");
        assert_eq!(options.hint_table_name(), "__call_hint");

        let patcher = Patcher::with_options(options);
        let source = "CREATE PROCEDURE p()\nBEGIN\nEND";
        let patched = patcher.patch(source);
        assert_eq!(
            patched.patched_sql,
            "CREATE PROCEDURE p()\nBEGIN\n\tINSERT INTO audit.__call_hint (callid, procname, args, vars) VALUES (UUID(), 'p', JSON_OBJECT(), JSON_OBJECT());\nEND"
        );
        assert!(matches!(
            patcher.patch(&patched.patched_sql).warnings[..],
            [PatchWarning::AlreadyPatched { .. }]
        ));
        assert_eq!(patcher.depatch(&patched.patched_sql).patched_sql, source);
    }

    #[test]
    fn test_options_validation() {
        assert_eq!(PatchOptions::from_toml_str("").unwrap(), PatchOptions::default());
        assert!(PatchOptions::from_toml_str("hint_table = \"\"").is_err());
        assert!(PatchOptions::from_toml_str("hint_table = 3").is_err());
    }

    #[test]
    fn test_hint_rendering() {
        let params = [
            Variable::local("plain_1", "INT"),
            Variable::local("needs quoting", "INT"),
            Variable::local("it's", "INT"),
        ];
        let refs: Vec<&Variable> = params.iter().collect();
        let sql = render_hint_insert(&PatchOptions::default(), "O'Brien", &refs, &[]);
        assert_eq!(
            sql,
            "INSERT INTO __ULTRAVERSE_PROCEDURE_HINT (callid, procname, args, vars) VALUES (UUID_SHORT(), 'O''Brien', \
             JSON_OBJECT('plain_1', plain_1, 'needs quoting', `needs quoting`, 'it''s', `it's`), JSON_OBJECT())"
        );

        let schema = helper_schema_sql(&PatchOptions::default());
        assert!(schema.contains("CREATE TABLE IF NOT EXISTS __ULTRAVERSE_PROCEDURE_HINT (\n    callid BIGINT UNSIGNED NOT NULL,"));
        assert!(schema.ends_with(") ENGINE = BLACKHOLE;\n"));
    }
}
