//! Index-sort planner: choosing a scan order that satisfies
//! (a prefix of) ORDER BY so the evaluator can skip an in-memory sort.
//!
//! Determinism contract: for the same resolved ORDER BY prefix and the
//! same candidate index list, `plan_index_sort` always returns the same
//! choice. Candidates are compared by sorted-column count first, then by
//! index name — never by the order they happen to be passed in.

use crate::direction::{SortDirection, SortOrder, SortType};
use crate::value::NullOrdering;

/// Sentinel meaning every ORDER BY column is satisfied by the chosen scan.
pub const FULLY_SORTED: usize = usize::MAX;

///
/// IndexSort
///
/// (index name, sortedColumns, reverse) — how many leading ORDER BY
/// columns a given index's scan order satisfies, and whether the index
/// must be scanned in reverse to get there.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexSort {
    pub index_name: String,
    pub sorted_columns: usize,
    pub reverse: bool,
}

impl IndexSort {
    #[must_use]
    pub fn is_fully_sorted(&self, order_by_len: usize) -> bool {
        self.sorted_columns == FULLY_SORTED || self.sorted_columns >= order_by_len
    }

    /// "Better" sorts come first: more sorted columns wins; ties prefer a
    /// forward (non-reverse) scan; further ties break by index name.
    fn better_than(&self, other: &Self) -> bool {
        (self.sorted_columns, !self.reverse, &self.index_name)
            > (other.sorted_columns, !other.reverse, &other.index_name)
    }
}

/// One candidate index's columns, in key order, as filter-local column
/// positions (matching `top_filter_columns`' coordinate space).
#[derive(Clone, Debug)]
pub struct CandidateIndex {
    pub name: String,
    pub columns: Vec<usize>,
    /// Ascending unless stated: the natural scan direction per column.
    pub directions: Vec<SortDirection>,
    /// Where NULLs land under this index's natural (non-reversed) scan
    /// order, per column — a physical property of the index, independent
    /// of the query's requested `NULLS FIRST`/`NULLS LAST`.
    pub null_orderings: Vec<NullOrdering>,
    pub is_scan: bool,
    pub is_hash: bool,
}

/// Plan the best `IndexSort` for `order_by` against the top filter's
/// resolved columns. `top_filter_columns[i]` is `Some(col)` when
/// `order_by`'s i-th entry is a plain `ExpressionColumn` of the top
/// filter (so a physical index over `col` can satisfy it); `None` marks
/// the point past which the suffix is unsortable by any index, since
/// any term that is not an `ExpressionColumn` of the top filter breaks
/// the sortable prefix.
#[must_use]
pub fn plan_index_sort(
    order_by: &SortOrder,
    top_filter_columns: &[Option<usize>],
    candidates: &[CandidateIndex],
) -> Option<IndexSort> {
    if order_by.is_empty() {
        return None;
    }

    let mut best: Option<IndexSort> = None;

    for candidate in candidates {
        if candidate.is_hash {
            // Hash indexes carry no scan order; skip. Scan candidates are
            // excluded below via is_scan, since a full scan has no fixed
            // physical order either.
            continue;
        }
        if candidate.is_scan {
            continue;
        }

        if let Some(found) = try_match(order_by, top_filter_columns, candidate) {
            best = match best {
                Some(current) if current.better_than(&found) => Some(current),
                _ => Some(found),
            };
        }
    }

    best
}

fn try_match(
    order_by: &SortOrder,
    top_filter_columns: &[Option<usize>],
    candidate: &CandidateIndex,
) -> Option<IndexSort> {
    let mut forward_count = 0usize;
    let mut reverse_count = 0usize;
    let mut forward_broken = false;
    let mut reverse_broken = false;

    for (i, (_, sort_type)) in order_by.iter().enumerate() {
        let Some(&Some(filter_col)) = top_filter_columns.get(i) else {
            break;
        };
        let Some(&index_col) = candidate.columns.get(i) else {
            break;
        };
        if index_col != filter_col {
            break;
        }
        let natural_direction = candidate.directions.get(i).copied().unwrap_or(SortDirection::Ascending);
        let natural_nulls = candidate.null_orderings.get(i).copied().unwrap_or(NullOrdering::NullsLast);
        let natural = SortType::new(natural_direction, natural_nulls);

        if !forward_broken {
            if natural.direction == sort_type.direction && natural.nulls == sort_type.nulls {
                forward_count += 1;
            } else {
                forward_broken = true;
            }
        }
        if !reverse_broken {
            let reversed = natural.reversed();
            if reversed.direction == sort_type.direction && reversed.nulls == sort_type.nulls {
                reverse_count += 1;
            } else {
                reverse_broken = true;
            }
        }
        if forward_broken && reverse_broken {
            break;
        }
    }

    let order_len = order_by.len();
    let forward_sorted = if forward_count == order_len { FULLY_SORTED } else { forward_count };
    let reverse_sorted = if reverse_count == order_len { FULLY_SORTED } else { reverse_count };

    match (forward_count > 0, reverse_count > 0) {
        (false, false) => None,
        (true, false) => Some(IndexSort {
            index_name: candidate.name.clone(),
            sorted_columns: forward_sorted,
            reverse: false,
        }),
        (false, true) => Some(IndexSort {
            index_name: candidate.name.clone(),
            sorted_columns: reverse_sorted,
            reverse: true,
        }),
        (true, true) => {
            if forward_count >= reverse_count {
                Some(IndexSort {
                    index_name: candidate.name.clone(),
                    sorted_columns: forward_sorted,
                    reverse: false,
                })
            } else {
                Some(IndexSort {
                    index_name: candidate.name.clone(),
                    sorted_columns: reverse_sorted,
                    reverse: true,
                })
            }
        }
    }
}
