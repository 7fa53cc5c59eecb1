//! Shared OFFSET/FETCH/WITH TIES finishing path. Every execution mode
//! funnels its candidate rows through `finish` once it has decided how
//! much quick-offset pre-skipping (if any) it already performed.

use crate::direction::SortOrder;
use crate::model::offset_fetch::ResolvedOffsetFetch;
use crate::value::Row;

/// Apply OFFSET, FETCH and WITH TIES to an already-ordered row sequence.
/// `already_skipped` is how many leading rows a quick-offset pre-skip
/// already dropped (0 when the mode could not pre-skip); the remaining
/// offset is applied here.
///
/// WITH TIES: once the fetch boundary is reached, keep emitting rows
/// that compare equal to the last emitted row under `order`'s
/// comparator — full columns when the index sort is fully satisfied,
/// the sorted prefix otherwise (`sorted_prefix_len`).
#[must_use]
pub fn finish(
    rows: &[Row],
    already_skipped: usize,
    offset_fetch: ResolvedOffsetFetch,
    order: Option<&SortOrder>,
    sorted_prefix_len: Option<usize>,
) -> Vec<Row> {
    let remaining_offset = offset_fetch.offset.saturating_sub(already_skipped as u64) as usize;
    let after_offset = rows.iter().skip(remaining_offset);

    let Some(fetch) = offset_fetch.fetch else {
        return after_offset.cloned().collect();
    };

    let fetch = fetch as usize;
    if !offset_fetch.with_ties || order.is_none() {
        return after_offset.take(fetch).cloned().collect();
    }

    let order = order.expect("checked above");
    let remaining: Vec<&Row> = after_offset.collect();
    if remaining.len() <= fetch {
        return remaining.into_iter().cloned().collect();
    }

    let mut result: Vec<Row> = remaining[..fetch].iter().map(|r| (*r).clone()).collect();
    let boundary = remaining[fetch - 1];
    for row in &remaining[fetch..] {
        if order.compare_prefix(boundary, row, sorted_prefix_len) == std::cmp::Ordering::Equal {
            result.push((*row).clone());
        } else {
            break;
        }
    }
    result
}
