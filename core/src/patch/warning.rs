use serde::Serialize;
use std::fmt;

/// A non-fatal problem met while patching. The offending statement is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatchWarning {
    ParseFailure { offset: usize, message: String },
    AlreadyPatched { routine: String },
    MissingBody { routine: String },
    UnsupportedBody { routine: String, shape: String },
    /// Only the fall-through insert is skipped; early-exit inserts still apply.
    EndNotFound { routine: String },
}

impl PatchWarning {
    /// The routine the warning is about, if the statement parsed that far.
    pub fn routine(&self) -> Option<&str> {
        match self {
            PatchWarning::ParseFailure { .. } => None,
            PatchWarning::AlreadyPatched { routine }
            | PatchWarning::MissingBody { routine }
            | PatchWarning::UnsupportedBody { routine, .. }
            | PatchWarning::EndNotFound { routine } => Some(routine),
        }
    }
}

impl fmt::Display for PatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchWarning::ParseFailure { offset, message } => write!(
                f,
                "Warning: failed to parse statement at offset {}, leaving unchanged: {}",
                offset, message
            ),
            PatchWarning::AlreadyPatched { routine } => {
                write!(f, "Warning: Procedure '{}' already patched, skipping", routine)
            }
            PatchWarning::MissingBody { routine } => write!(f, "Warning: Procedure '{}' has no body, skipping", routine),
            PatchWarning::UnsupportedBody { routine, shape } => write!(
                f,
                "Warning: Procedure '{}' has unsupported body type: {}, skipping",
                routine, shape
            ),
            PatchWarning::EndNotFound { routine } => {
                write!(f, "Warning: Procedure '{}' end not found, skipping end insert", routine)
            }
        }
    }
}
