//! Minimal concrete value representation.
//!
//! The full expression tree and value system are external collaborators
//! — this crate does not own SQL typing, coercion, or a
//! DECIMAL/TIMESTAMP/ARRAY family. `Value` exists only so the planner and
//! evaluator are runnable and testable end-to-end without a real storage
//! engine plugged in underneath `Expression`.

use std::cmp::Ordering;

///
/// Value
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A projected output row. Column order matches the owning query's
/// `expressions` array.
pub type Row = Vec<Value>;

///
/// NullOrdering
///
/// Where NULLs sort relative to non-NULL values when no explicit
/// `NULLS FIRST`/`NULLS LAST` is given on an ORDER BY term. `Low`/`High`
/// make NULL compare as the lowest/highest value under the *ascending*
/// comparator (so its effective position flips under DESC), matching a
/// database-wide `default-null-ordering` configuration knob.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NullOrdering {
    NullsFirst,
    NullsLast,
    Low,
    High,
}

impl NullOrdering {
    /// Whether NULL sorts before non-NULL under an *ascending* comparator.
    #[must_use]
    pub const fn null_sorts_first_ascending(self) -> bool {
        match self {
            Self::NullsFirst | Self::Low => true,
            Self::NullsLast | Self::High => false,
        }
    }
}

/// Total-order comparison honoring `nulls`. `direction` is folded in by the
/// caller (typically `SortType`) rather than here, so this stays a pure
/// ascending comparator — reversing is just `.then(Ordering::reverse)` at
/// the call site, matching how `SortOrder` composes multiple columns.
#[must_use]
pub fn compare_values(a: &Value, b: &Value, nulls: NullOrdering) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => {
            if nulls.null_sorts_first_ascending() {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (_, Value::Null) => {
            if nulls.null_sorts_first_ascending() {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Int(x), Value::Float(y)) => {
            (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (Value::Float(x), Value::Int(y)) => {
            x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal)
        }
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        // Mismatched non-null variants: total order still required for
        // DISTINCT/ORDER BY to terminate. Rank by a fixed variant order.
        (x, y) => variant_rank(x).cmp(&variant_rank(y)),
    }
}

const fn variant_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) => 2,
        Value::Float(_) => 3,
        Value::Text(_) => 4,
    }
}

///
/// ValueType
///
/// The minimal type lattice over `Value`, used for set-operation column
/// harmonization. Not a stand-in for the full SQL type system — that
/// remains the external value system's job — just enough of a lattice
/// to unify two `Value` columns.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    Text,
}

impl Value {
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Text(_) => ValueType::Text,
        }
    }
}

/// The common supertype of `a` and `b` (GLOSSARY: "higher-type"). `Null`
/// unifies with anything; `Int`/`Float` unify to `Float`; anything else
/// mismatched unifies to `Text` (the only type every value can be rendered
/// into), mirroring SQL's widen-to-a-common-representation convention.
#[must_use]
pub const fn higher_type(a: ValueType, b: ValueType) -> ValueType {
    use ValueType::{Bool, Float, Int, Null, Text};
    match (a, b) {
        (Null, other) | (other, Null) => other,
        (x, y) if matches!((x, y), (Bool, Bool)) => Bool,
        (x, y) if matches!((x, y), (Int, Int)) => Int,
        (x, y) if matches!((x, y), (Float, Float) | (Int, Float) | (Float, Int)) => Float,
        (x, y) if matches!((x, y), (Text, Text)) => Text,
        _ => Text,
    }
}

/// Row equality under total-order comparison of every column, used by
/// DISTINCT and WITH TIES. `nulls` applies uniformly; callers that need
/// per-column null ordering call `compare_values` directly per column.
#[must_use]
pub fn rows_equal(a: &[Value], b: &[Value], nulls: NullOrdering) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| compare_values(x, y, nulls) == Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_first_sorts_null_below_everything() {
        assert_eq!(
            compare_values(&Value::Null, &Value::Int(0), NullOrdering::NullsFirst),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Null, &Value::Int(0), NullOrdering::NullsLast),
            Ordering::Greater
        );
    }

    #[test]
    fn numeric_cross_type_compares_by_value() {
        assert_eq!(
            compare_values(&Value::Int(2), &Value::Float(2.0), NullOrdering::NullsLast),
            Ordering::Equal
        );
    }

    #[test]
    fn rows_equal_requires_same_arity() {
        assert!(!rows_equal(
            &[Value::Int(1)],
            &[Value::Int(1), Value::Int(2)],
            NullOrdering::NullsLast
        ));
    }

    #[test]
    fn higher_type_widens_int_and_float_to_float() {
        assert_eq!(higher_type(ValueType::Int, ValueType::Float), ValueType::Float);
        assert_eq!(higher_type(ValueType::Null, ValueType::Bool), ValueType::Bool);
        assert_eq!(higher_type(ValueType::Bool, ValueType::Text), ValueType::Text);
    }
}
