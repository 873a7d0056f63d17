//! Instrumenting stored routines with hint INSERTs.
//!
//! ```
//! use procpatch_core::patch::{depatch, patch};
//!
//! let source = "DELIMITER //\nCREATE PROCEDURE p(IN x INT)\nBEGIN\n  SELECT x;\nEND//\nDELIMITER ;\n";
//! let patched = patch(source);
//! assert!(patched.patched_sql.contains("__ULTRAVERSE_PROCEDURE_HINT"));
//! assert_eq!(depatch(&patched.patched_sql).patched_sql, source);
//! ```

mod depatcher;
pub mod hint_sql;
pub mod inserter;
mod options;
mod patcher;
mod repatcher;
pub mod text_patch;
mod warning;

#[cfg(test)]
mod patch_test;
#[cfg(test)]
mod text_patch_test;

pub use options::{DEFAULT_HINT_TABLE, DEFAULT_LEGACY_MARKER, PatchOptions};
pub use patcher::Patcher;
pub use warning::PatchWarning;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchResult {
    pub patched_sql: String,
    /// In source order; none of them stop the run.
    pub warnings: Vec<PatchWarning>,
}

impl PatchResult {
    /// Warnings as display strings.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Patch with the default options and the built-in parser.
pub fn patch(sql: &str) -> PatchResult {
    Patcher::new().patch(sql)
}

pub fn depatch(sql: &str) -> PatchResult {
    Patcher::new().depatch(sql)
}

pub fn repatch(sql: &str) -> PatchResult {
    Patcher::new().repatch(sql)
}
