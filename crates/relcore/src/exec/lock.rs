//! FOR UPDATE per-row locking: the "isConditionMetForUpdate" contract
//! used by the flat executor (and any other mode that emits individual
//! rows under a lock).

use crate::error::{ErrorKind, QueryError, Result};
use crate::external::{LockOutcome, Table};
use crate::model::ForUpdate;
use crate::value::Row;

///
/// ForUpdateDecision
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ForUpdateDecision {
    /// Row is locked and should be emitted as-is.
    Emit,
    /// Row is locked but was replaced by a newer snapshot; caller must
    /// re-evaluate WHERE against the fresh row before emitting.
    ReEvaluate,
    /// SKIP LOCKED contention: row is silently dropped, not an error.
    Skip,
}

/// Resolve the `timeoutMillis` a `lock_row` call should use for a given
/// `ForUpdate` mode and the session's configured default lock timeout
/// (used only by `ForUpdate::Default`).
#[must_use]
pub const fn resolve_timeout_millis(for_update: ForUpdate, session_default_timeout_millis: u64) -> u64 {
    match for_update {
        ForUpdate::Default => session_default_timeout_millis,
        ForUpdate::Wait { millis } => millis,
        ForUpdate::NoWait | ForUpdate::SkipLocked => 0,
    }
}

/// Attempt to lock `row` against `table` under `for_update`'s semantics
/// and translate the outcome into a `ForUpdateDecision`, raising
/// `LockTimeout` when the lock cannot be acquired within the resolved
/// timeout and the mode is not `SkipLocked`.
pub fn apply_for_update(
    table: &impl Table,
    row: &Row,
    for_update: ForUpdate,
    session_default_timeout_millis: u64,
) -> Result<ForUpdateDecision> {
    let timeout = resolve_timeout_millis(for_update, session_default_timeout_millis);
    match table.lock_row(row, Some(timeout))? {
        LockOutcome::Locked => Ok(ForUpdateDecision::Emit),
        LockOutcome::LockedRowReplaced => Ok(ForUpdateDecision::ReEvaluate),
        LockOutcome::Contended => {
            if matches!(for_update, ForUpdate::SkipLocked) {
                Ok(ForUpdateDecision::Skip)
            } else {
                Err(QueryError::from(ErrorKind::LockTimeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::testing::MemTable;

    fn table(lockable: bool) -> MemTable {
        MemTable {
            name: "t".into(),
            rows: Vec::new(),
            row_lockable: lockable,
            max_modification_id: 0,
            locked_rows: std::collections::HashSet::new(),
            scan_index: 0,
        }
    }

    #[test]
    fn default_lock_emits_on_success() {
        let t = table(true);
        let decision = apply_for_update(&t, &Vec::new(), ForUpdate::Default, 1000).unwrap();
        assert_eq!(decision, ForUpdateDecision::Emit);
    }

    #[test]
    fn resolve_timeout_uses_session_default_only_for_default_mode() {
        assert_eq!(resolve_timeout_millis(ForUpdate::Default, 5000), 5000);
        assert_eq!(resolve_timeout_millis(ForUpdate::wait(200), 5000), 200);
        assert_eq!(resolve_timeout_millis(ForUpdate::NoWait, 5000), 0);
        assert_eq!(resolve_timeout_millis(ForUpdate::SkipLocked, 5000), 0);
    }
}
