//! Distinct-via-index executor: walks the leading column of a unique
//! single-column index with `findNext(first, null)` seeded by the last
//! observed value, so each step returns at most one row per distinct
//! key. The physical `findNext` seek is the storage engine's job (trait
//! `Index`, out of scope here); this module assumes its caller already
//! hands it rows in the index's natural ascending key order and performs
//! the de-duplication plus quick-offset/limit bookkeeping.
//!
//! Also home to `run_distinct_on`, the `DISTINCT ON` executor: the same
//! first-row-per-key idea generalized to a compound key with no index
//! underneath it.

use crate::value::{Row, Value};

///
/// DistinctResult
///

#[derive(Clone, Debug, Default)]
pub struct DistinctResult {
    pub rows: Vec<Row>,
    pub quick_skipped: u64,
}

/// Consume `sorted_rows` (already ordered by the distinct column, as an
/// index walk would produce) and emit the first row seen per distinct
/// key. `quick_offset` drops leading distinct keys before they are
/// collected. When `limit` is set and `allow_early_stop` is true (i.e. no
/// WITH TIES is in play, so nothing past the limit could ever matter),
/// iteration stops as soon as `limit` distinct rows are collected.
pub fn run_distinct_via_index(
    sorted_rows: impl Iterator<Item = Row>,
    distinct_column: usize,
    quick_offset: u64,
    limit: Option<u64>,
    allow_early_stop: bool,
) -> DistinctResult {
    let mut rows = Vec::new();
    let mut quick_skipped = 0u64;
    let mut last_key: Option<Row> = None;

    for row in sorted_rows {
        let is_new_key = match &last_key {
            Some(prev) => prev.get(distinct_column) != row.get(distinct_column),
            None => true,
        };
        if !is_new_key {
            continue;
        }
        last_key = Some(row.clone());

        if quick_skipped < quick_offset {
            quick_skipped += 1;
            continue;
        }

        rows.push(row);

        if allow_early_stop {
            if let Some(limit) = limit {
                if rows.len() as u64 >= limit {
                    break;
                }
            }
        }
    }

    DistinctResult { rows, quick_skipped }
}

/// `DISTINCT ON (cols)`: keep the first row seen per compound key over
/// `key_columns`. Unlike `run_distinct_via_index`, the key may span more
/// than one column and there is no index walk underneath — the caller is
/// responsible for handing rows in an order where "first occurrence"
/// already picks the desired tiebreaker (e.g. rows pre-sorted by
/// `DISTINCT ON (cols), rest-of-order-by`).
#[must_use]
pub fn run_distinct_on(sorted_rows: impl Iterator<Item = Row>, key_columns: &[usize]) -> Vec<Row> {
    let key_of = |row: &Row| -> Row { key_columns.iter().map(|&c| row.get(c).cloned().unwrap_or(Value::Null)).collect() };

    let mut rows = Vec::new();
    let mut last_key: Option<Row> = None;
    for row in sorted_rows {
        let key = key_of(&row);
        if last_key.as_ref() != Some(&key) {
            last_key = Some(key);
            rows.push(row);
        }
    }
    rows
}
