//! Set-operation executor: UNION/UNION ALL/EXCEPT/INTERSECT over two
//! already-executed, column-width-harmonized sides.

use crate::error::{ErrorKind, QueryError, Result};
use crate::value::{rows_equal, NullOrdering, Row};

///
/// UnionType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnionType {
    Union,
    UnionAll,
    Except,
    Intersect,
}

impl UnionType {
    /// UNION and EXCEPT set the result to "distinct"; UNION ALL never
    /// deduplicates; INTERSECT's own dedup logic lives in
    /// `run_set_operation` (it dedupes the left helper, not the output
    /// stream generically).
    #[must_use]
    pub const fn is_distinct(self) -> bool {
        matches!(self, Self::Union | Self::Except)
    }
}

/// Column count mismatch between the two sides, reported as
/// `COLUMN_COUNT_DOES_NOT_MATCH`.
pub fn check_column_counts(left: usize, right: usize) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(QueryError::from(ErrorKind::ColumnCountDoesNotMatch))
    }
}

fn dedupe(rows: &[Row], nulls: NullOrdering) -> Vec<Row> {
    let mut out: Vec<Row> = Vec::new();
    for row in rows {
        if !out.iter().any(|kept| rows_equal(kept, row, nulls)) {
            out.push(row.clone());
        }
    }
    out
}

/// Execute `op` over the two already-harmonized sides. A streaming,
/// lazily-concatenated `UNION ALL` has identical output to the eager
/// concatenation below, so only the multiset-preserving behavior is
/// modeled here.
#[must_use]
pub fn run_set_operation(op: UnionType, left: &[Row], right: &[Row], nulls: NullOrdering) -> Vec<Row> {
    match op {
        UnionType::UnionAll => {
            let mut out = Vec::with_capacity(left.len() + right.len());
            out.extend_from_slice(left);
            out.extend_from_slice(right);
            out
        }
        UnionType::Union => {
            let mut combined = Vec::with_capacity(left.len() + right.len());
            combined.extend_from_slice(left);
            combined.extend_from_slice(right);
            dedupe(&combined, nulls)
        }
        UnionType::Except => {
            let mut out: Vec<Row> = Vec::new();
            for row in left {
                let in_right = right.iter().any(|r| rows_equal(r, row, nulls));
                let already_emitted = out.iter().any(|kept| rows_equal(kept, row, nulls));
                if !in_right && !already_emitted {
                    out.push(row.clone());
                }
            }
            out
        }
        UnionType::Intersect => {
            let mut left_helper = dedupe(left, nulls);
            let mut out = Vec::new();
            for row in right {
                if let Some(pos) = left_helper.iter().position(|kept| rows_equal(kept, row, nulls)) {
                    out.push(row.clone());
                    left_helper.remove(pos);
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn rows(values: &[i64]) -> Vec<Row> {
        values.iter().map(|&v| vec![Value::Int(v)]).collect()
    }

    #[test]
    fn union_dedupes_across_both_sides() {
        // a = {1,1,2}; b = {2,3}; a UNION b -> {1,2,3}
        let a = rows(&[1, 1, 2]);
        let b = rows(&[2, 3]);
        let mut result = run_set_operation(UnionType::Union, &a, &b, NullOrdering::NullsLast);
        result.sort_by_key(|r| match r[0] {
            Value::Int(n) => n,
            _ => 0,
        });
        assert_eq!(result, rows(&[1, 2, 3]));
    }

    #[test]
    fn union_all_preserves_the_multiset() {
        let a = rows(&[1, 1, 2]);
        let b = rows(&[2, 3]);
        let result = run_set_operation(UnionType::UnionAll, &a, &b, NullOrdering::NullsLast);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn intersect_emits_only_rows_present_in_both() {
        let a = rows(&[1, 2, 2]);
        let b = rows(&[2, 2, 3]);
        let result = run_set_operation(UnionType::Intersect, &a, &b, NullOrdering::NullsLast);
        assert_eq!(result, rows(&[2]));
    }

    #[test]
    fn except_removes_rows_present_in_right() {
        let a = rows(&[1, 2, 3]);
        let b = rows(&[2]);
        let result = run_set_operation(UnionType::Except, &a, &b, NullOrdering::NullsLast);
        assert_eq!(result, rows(&[1, 3]));
    }

    #[test]
    fn mismatched_column_counts_error() {
        assert!(check_column_counts(2, 3).is_err());
        assert!(check_column_counts(2, 2).is_ok());
    }
}
