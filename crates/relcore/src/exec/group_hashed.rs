//! Group (hashed) executor: gathers all qualifying rows into
//! `SelectGroups` keyed by GROUP BY columns, then materializes one result
//! row per group, applying HAVING then QUALIFY and optional quick-offset
//! skipping during materialization.

use crate::error::{ErrorKind, QueryError, Result};
use crate::external::{Expression, SelectGroups};
use crate::value::{Row, Value};

/// Apply `groupByCopies`: positions marked as a copy of an earlier
/// GROUP BY term reuse that term's already-computed value rather
/// than re-evaluating the expression, so `key[copy_of[i]]` replaces
/// `key[i]` wherever a copy is recorded.
pub fn apply_group_by_copies(mut key: Row, copies: &[Option<usize>]) -> Row {
    for (i, copy_of) in copies.iter().enumerate() {
        if let Some(source) = copy_of {
            if let Some(value) = key.get(*source).cloned() {
                key[i] = value;
            }
        }
    }
    key
}

fn is_accepted(predicate: Option<&dyn Expression>, row: &Row) -> Result<bool> {
    match predicate {
        Some(expr) => Ok(matches!(expr.evaluate(row)?, Value::Bool(true))),
        None => Ok(true),
    }
}

///
/// GroupHashedResult
///

#[derive(Clone, Debug, Default)]
pub struct GroupHashedResult {
    pub rows: Vec<Row>,
    pub quick_skipped: u64,
}

/// Feed every input row's GROUP BY key into `groups`, then drain the
/// completed groups, applying `having` and `qualify` in that order and
/// skipping the first `quick_offset` accepted rows.
pub fn run_group_hashed<G, K>(
    input_rows: impl Iterator<Item = Row>,
    mut group_key_of: K,
    groups: &mut G,
    having: Option<&dyn Expression>,
    qualify: Option<&dyn Expression>,
    quick_offset: u64,
) -> Result<GroupHashedResult>
where
    G: SelectGroups,
    K: FnMut(&Row) -> Row,
{
    groups.reset();
    for row in input_rows {
        let key = group_key_of(&row);
        groups.next_source(key, &row);
    }

    let mut rows = Vec::new();
    let mut quick_skipped = 0u64;

    while !groups.done() {
        let Some(group_row) = groups.next() else {
            break;
        };
        if !is_accepted(having, &group_row)? {
            continue;
        }
        if !is_accepted(qualify, &group_row)? {
            continue;
        }
        if quick_skipped < quick_offset {
            quick_skipped += 1;
            continue;
        }
        rows.push(group_row);
    }

    Ok(GroupHashedResult { rows, quick_skipped })
}

/// Surface an internal-error wrapper for callers that need to assert a
/// `SelectGroups` cursor terminated cleanly (used by tests and by the
/// group+window re-walk in `window.rs`).
pub fn expect_done<G: SelectGroups>(groups: &G) -> Result<()> {
    if groups.done() {
        Ok(())
    } else {
        Err(QueryError::from(ErrorKind::Internal(
            "group cursor did not terminate".into(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeGroups {
        materialized: Vec<Row>,
        cursor: usize,
    }

    impl SelectGroups for FakeGroups {
        fn reset(&mut self) {
            self.cursor = 0;
        }
        fn reset_lazy(&mut self) {}
        fn next_source(&mut self, _key: Row, _row: &Row) {}
        fn next(&mut self) -> Option<Row> {
            let row = self.materialized.get(self.cursor).cloned();
            self.cursor += 1;
            row
        }
        fn next_lazy_group(&mut self, _key: &Row) {}
        fn next_lazy_row(&mut self, _row: &Row) {}
        fn done(&self) -> bool {
            self.cursor >= self.materialized.len()
        }
    }

    #[test]
    fn having_drops_rows_that_evaluate_false() {
        struct AlwaysFalse;
        impl Expression for AlwaysFalse {
            fn is_constant(&self) -> bool {
                true
            }
            fn evaluate(&self, _row: &Row) -> Result<Value> {
                Ok(Value::Bool(false))
            }
            fn sql(&self) -> String {
                "false".into()
            }
        }

        let mut groups = FakeGroups {
            materialized: vec![vec![Value::Text("n".into()), Value::Int(40)]],
            cursor: 0,
        };
        let result = run_group_hashed(
            std::iter::empty(),
            |r| r.clone(),
            &mut groups,
            Some(&AlwaysFalse),
            None,
            0,
        )
        .unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn group_by_copies_reuse_earlier_value() {
        let key = vec![Value::Int(1), Value::Int(0)];
        let copied = apply_group_by_copies(key, &[None, Some(0)]);
        assert_eq!(copied, vec![Value::Int(1), Value::Int(1)]);
    }
}
