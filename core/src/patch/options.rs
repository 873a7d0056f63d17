use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_HINT_TABLE: &str = "__ULTRAVERSE_PROCEDURE_HINT";
pub const DEFAULT_LEGACY_MARKER: &str = "__ultraverse_callinfo";

/// Knobs for patching. Every field is optional in a TOML file:
///
/// ```toml
/// hint_table = "audit.__ULTRAVERSE_PROCEDURE_HINT"
/// indent_unit = "\t"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatchOptions {
    /// Table the hint INSERTs target; also what marks a routine as already patched.
    pub hint_table: String,
    /// Variable name of the old `DECLARE` based instrumentation, removed by depatch.
    pub legacy_marker: String,
    /// SQL expression producing the call id column.
    pub call_id_expr: String,
    /// Indent used for the fall-through hint when no surrounding indent exists.
    pub indent_unit: String,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            hint_table: DEFAULT_HINT_TABLE.to_string(),
            legacy_marker: DEFAULT_LEGACY_MARKER.to_string(),
            call_id_expr: "UUID_SHORT()".to_string(),
            indent_unit: "    ".to_string(),
        }
    }
}

impl PatchOptions {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let options: PatchOptions = toml::from_str(text).context("Invalid patch options")?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Failed to load options from {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.hint_table.trim().is_empty() {
            bail!("hint_table must not be empty");
        }
        if self.legacy_marker.trim().is_empty() {
            bail!("legacy_marker must not be empty");
        }
        if self.call_id_expr.trim().is_empty() {
            bail!("call_id_expr must not be empty");
        }
        Ok(())
    }

    /// The bare table name, without a schema qualifier or backticks.
    ///
    /// Hint references are matched on this name; `schema.table` and
    /// `` `table` `` both resolve to `table`.
    pub fn hint_table_name(&self) -> &str {
        let name = self.hint_table.rsplit('.').next().unwrap_or(&self.hint_table);
        name.trim_matches('`')
    }
}
