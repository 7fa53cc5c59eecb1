//! SelectUnion: two `Query` sides combined by UNION/UNION ALL/EXCEPT/
//! INTERSECT. The sides themselves are
//! opaque here — `SelectUnion` only owns the combining step, fed the
//! already-produced rows from each side by its caller (a `Select`, a
//! nested `SelectUnion`, or a `TableValueConstructor`).

use crate::error::Result;
use crate::exec::set_ops::{check_column_counts, run_set_operation, UnionType};
use crate::model::ForUpdate;
use crate::value::{higher_type, NullOrdering, Row, ValueType};

///
/// GlobalConditionSides
///
/// Which side(s) of a set operation an outer `addGlobalCondition`
/// pushdown reaches. UNION/UNION ALL/INTERSECT propagate to both sides —
/// the pushed-down predicate holds for the combined result regardless of
/// which side contributed a row. EXCEPT propagates to the left side
/// only: pushing it into the right side would change which rows get
/// subtracted, not just which survive.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GlobalConditionSides {
    Both,
    LeftOnly,
}

///
/// SelectUnion
///

pub struct SelectUnion {
    pub op: UnionType,
    pub left_column_count: usize,
    pub right_column_count: usize,
    /// FOR UPDATE on a set operation applies identically to both sides.
    pub for_update: Option<ForUpdate>,
}

impl SelectUnion {
    #[must_use]
    pub const fn new(op: UnionType, left_column_count: usize, right_column_count: usize) -> Self {
        Self {
            op,
            left_column_count,
            right_column_count,
            for_update: None,
        }
    }

    /// Validate column counts, reported as `COLUMN_COUNT_DOES_NOT_MATCH`.
    /// Idempotent in spirit with `Select::init` — cheap enough to simply
    /// re-check on every call rather than cache a flag.
    pub fn check(&self) -> Result<()> {
        check_column_counts(self.left_column_count, self.right_column_count)
    }

    /// Combine two already-executed, column-harmonized row sets.
    pub fn combine(&self, left: &[Row], right: &[Row], nulls: NullOrdering) -> Result<Vec<Row>> {
        self.check()?;
        Ok(run_set_operation(self.op, left, right, nulls))
    }

    /// Which side(s) an outer `addGlobalCondition` pushdown should reach.
    /// The caller owns both sides and does the actual pushdown call; this
    /// only answers where it's valid to push.
    #[must_use]
    pub const fn global_condition_sides(&self) -> GlobalConditionSides {
        match self.op {
            UnionType::Union | UnionType::UnionAll | UnionType::Intersect => GlobalConditionSides::Both,
            UnionType::Except => GlobalConditionSides::LeftOnly,
        }
    }

    /// Per-column result types: the pairwise higher-type join of the two
    /// sides. Column-count mismatch is reported the same way
    /// `check`/`combine` report it.
    pub fn column_types(&self, left: &[ValueType], right: &[ValueType]) -> Result<Vec<ValueType>> {
        check_column_counts(left.len(), right.len())?;
        Ok(left.iter().zip(right).map(|(&l, &r)| higher_type(l, r)).collect())
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
    fn mismatched_column_counts_reject_before_combining() {
        let union = SelectUnion::new(UnionType::Union, 1, 2);
        assert!(union.check().is_err());
    }

    #[test]
    fn union_combines_two_harmonized_sides() {
        let union = SelectUnion::new(UnionType::Union, 1, 1);
        let left = rows(&[1, 2]);
        let right = rows(&[2, 3]);
        let mut result = union.combine(&left, &right, NullOrdering::NullsLast).unwrap();
        result.sort_by_key(|r| match r[0] {
            Value::Int(n) => n,
            _ => 0,
        });
        assert_eq!(result, rows(&[1, 2, 3]));
    }

    #[test]
    fn union_union_all_and_intersect_push_global_conditions_to_both_sides() {
        for op in [UnionType::Union, UnionType::UnionAll, UnionType::Intersect] {
            let union = SelectUnion::new(op, 1, 1);
            assert_eq!(union.global_condition_sides(), GlobalConditionSides::Both);
        }
    }

    #[test]
    fn except_pushes_global_conditions_to_the_left_side_only() {
        let union = SelectUnion::new(UnionType::Except, 1, 1);
        assert_eq!(union.global_condition_sides(), GlobalConditionSides::LeftOnly);
    }

    #[test]
    fn column_types_are_the_pairwise_higher_type() {
        let union = SelectUnion::new(UnionType::Union, 2, 2);
        let left = [ValueType::Int, ValueType::Null];
        let right = [ValueType::Float, ValueType::Text];
        let types = union.column_types(&left, &right).unwrap();
        assert_eq!(types, vec![ValueType::Float, ValueType::Text]);
    }

    #[test]
    fn column_types_rejects_mismatched_counts() {
        let union = SelectUnion::new(UnionType::Union, 1, 2);
        let left = [ValueType::Int];
        let right = [ValueType::Int, ValueType::Int];
        assert!(union.column_types(&left, &right).is_err());
    }
}
