//! Group-sorted (lazy) executor: selected only when the chosen index's
//! scan order already makes GROUP BY columns contiguous.
//! Streams rows, emitting the accumulated group whenever the key changes,
//! and flushing the final group at end-of-stream — never materializing
//! the whole input like the hashed path does.

use crate::error::Result;
use crate::external::{Expression, SelectGroups};
use crate::exec::group_hashed::apply_group_by_copies;
use crate::value::{Row, Value};

fn is_accepted(predicate: Option<&dyn Expression>, row: &Row) -> Result<bool> {
    match predicate {
        Some(expr) => Ok(matches!(expr.evaluate(row)?, Value::Bool(true))),
        None => Ok(true),
    }
}

#[derive(Clone, Debug, Default)]
pub struct GroupSortedResult {
    pub rows: Vec<Row>,
    pub quick_skipped: u64,
}

/// `input_rows` must already be in an order that groups GROUP BY keys
/// contiguously (the planner only selects this mode when that holds).
/// `group_key_of` extracts the raw key; `group_by_copies` is applied to
/// it before comparing keys, so two
/// rows whose *copied* key values match are treated as the same group
/// even if the raw extraction differs in a copied position.
#[allow(clippy::too_many_arguments)]
pub fn run_group_sorted<G, K>(
    input_rows: impl Iterator<Item = Row>,
    mut group_key_of: K,
    group_by_copies: &[Option<usize>],
    groups: &mut G,
    having: Option<&dyn Expression>,
    qualify: Option<&dyn Expression>,
    quick_offset: u64,
) -> Result<GroupSortedResult>
where
    G: SelectGroups,
    K: FnMut(&Row) -> Row,
{
    groups.reset_lazy();
    let mut rows = Vec::new();
    let mut quick_skipped = 0u64;
    let mut current_key: Option<Row> = None;
    let mut started = false;

    let mut flush = |groups: &mut G,
                      rows: &mut Vec<Row>,
                      quick_skipped: &mut u64|
     -> Result<()> {
        if let Some(group_row) = groups.next() {
            if is_accepted(having, &group_row)? && is_accepted(qualify, &group_row)? {
                if *quick_skipped < quick_offset {
                    *quick_skipped += 1;
                } else {
                    rows.push(group_row);
                }
            }
        }
        Ok(())
    };

    for row in input_rows {
        let key = apply_group_by_copies(group_key_of(&row), group_by_copies);

        let key_changed = match &current_key {
            Some(prev) => prev != &key,
            None => true,
        };

        if key_changed {
            if started {
                flush(groups, &mut rows, &mut quick_skipped)?;
            }
            groups.next_lazy_group(&key);
            current_key = Some(key);
            started = true;
        }

        groups.next_lazy_row(&row);
    }

    if started {
        flush(groups, &mut rows, &mut quick_skipped)?;
    }

    Ok(GroupSortedResult { rows, quick_skipped })
}

#[must_use]
pub fn values_equal_ignoring_order(a: &[Value], b: &[Value]) -> bool {
    let mut a_sorted: Vec<&Value> = a.iter().collect();
    let mut b_sorted: Vec<&Value> = b.iter().collect();
    a_sorted.sort_by(|x, y| format!("{x:?}").cmp(&format!("{y:?}")));
    b_sorted.sort_by(|x, y| format!("{x:?}").cmp(&format!("{y:?}")));
    a_sorted == b_sorted
}
