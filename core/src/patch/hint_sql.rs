//! SQL text of the hint INSERT and of the helper table it targets.

use super::PatchOptions;
use crate::resolve::Variable;
use crate::token::scanner::{is_ident_part, is_ident_start};

/// `INSERT INTO <table> (callid, procname, args, vars) VALUES (...)`, without a terminator.
pub fn render_hint_insert(options: &PatchOptions, proc_name: &str, params: &[&Variable], locals: &[&Variable]) -> String {
    format!(
        "INSERT INTO {} (callid, procname, args, vars) VALUES ({}, '{}', {}, {})",
        options.hint_table,
        options.call_id_expr,
        escape_sql_string(proc_name),
        json_object(params),
        json_object(locals)
    )
}

/// `JSON_OBJECT('a', a, 'b', b)`; an empty list renders `JSON_OBJECT()`.
fn json_object(vars: &[&Variable]) -> String {
    let mut out = String::from("JSON_OBJECT(");
    for (i, var) in vars.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('\'');
        out.push_str(&escape_sql_string(&var.name));
        out.push_str("', ");
        push_identifier(&mut out, &var.name);
    }
    out.push(')');
    out
}

fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

fn push_identifier(out: &mut String, name: &str) {
    let bytes = name.as_bytes();
    let plain = bytes.first().is_some_and(|&b| is_ident_start(b)) && bytes.iter().all(|&b| is_ident_part(b));
    if plain {
        out.push_str(name);
    } else {
        out.push('`');
        out.push_str(&name.replace('`', "``"));
        out.push('`');
    }
}

/// DDL for the hint table. BLACKHOLE discards rows but keeps them in the binlog.
pub fn helper_schema_sql(options: &PatchOptions) -> String {
    format!(
        "-- Procedure hint table\n\
         -- Rows are discarded by the BLACKHOLE engine; the binlog keeps the call and state records.\n\
         \n\
         CREATE TABLE IF NOT EXISTS {} (\n    \
             callid BIGINT UNSIGNED NOT NULL,\n    \
             procname VARCHAR(255) NOT NULL,\n    \
             args VARCHAR(4096),\n    \
             vars VARCHAR(4096),\n    \
             PRIMARY KEY (callid)\n\
         ) ENGINE = BLACKHOLE;\n",
        options.hint_table
    )
}
