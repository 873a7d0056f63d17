use super::patcher::Patcher;
use super::PatchResult;
use crate::stmt::RoutineParser;

impl<P: RoutineParser> Patcher<P> {
    /// Strip existing hints, then patch again with the current format.
    ///
    /// Warnings from both passes are kept, depatch first.
    pub fn repatch(&self, sql: &str) -> PatchResult {
        let stripped = self.depatch(sql);
        let patched = self.patch(&stripped.patched_sql);

        let mut warnings = stripped.warnings;
        warnings.extend(patched.warnings);
        PatchResult {
            patched_sql: patched.patched_sql,
            warnings,
        }
    }
}
