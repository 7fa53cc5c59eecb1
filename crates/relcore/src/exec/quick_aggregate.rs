//! Quick aggregate executor: aggregates computed directly from index
//! metadata rather than a table scan — e.g. `COUNT(*)` from an
//! index's row count, `MIN`/`MAX` from its first/last key. Always
//! produces exactly one output row.

use crate::error::{ErrorKind, QueryError, Result};
use crate::value::{Row, Value};

///
/// QuickAggregateKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuickAggregateKind {
    CountStar,
    Min { column: usize },
    Max { column: usize },
}

/// What an index exposes for direct aggregate evaluation, without
/// scanning any rows. A real `Index` backs this; kept as a narrow trait
/// here so the executor does not depend on the full `Index` surface it
/// does not need.
pub trait QuickAggregateSource {
    fn row_count(&self) -> u64;
    fn min_value(&self, column: usize) -> Option<Value>;
    fn max_value(&self, column: usize) -> Option<Value>;
}

/// Evaluate every requested aggregate against `source`, in order,
/// producing one output row with one value per aggregate.
pub fn run_quick_aggregate(
    specs: &[QuickAggregateKind],
    source: &impl QuickAggregateSource,
) -> Result<Row> {
    specs
        .iter()
        .map(|spec| match spec {
            QuickAggregateKind::CountStar => Ok(Value::Int(source.row_count() as i64)),
            QuickAggregateKind::Min { column } => source.min_value(*column).ok_or_else(|| {
                QueryError::from(ErrorKind::Internal(format!(
                    "index metadata missing MIN for column {column}"
                )))
            }),
            QuickAggregateKind::Max { column } => source.max_value(*column).ok_or_else(|| {
                QueryError::from(ErrorKind::Internal(format!(
                    "index metadata missing MAX for column {column}"
                )))
            }),
        })
        .collect()
}
