//! TableValueConstructor: an in-line `VALUES (...)` row list treated as
//! a first-class `Query` variant, sharing the common OFFSET/FETCH/
//! ORDER BY/WITH TIES finishing path with `Select`.

use crate::direction::SortOrder;
use crate::error::Result;
use crate::exec::finish::finish;
use crate::exec::values_exec::evaluate_value_rows;
use crate::external::Expression;
use crate::model::offset_fetch::resolve_offset_fetch;
use crate::value::Row;

///
/// TableValueConstructor
///

pub struct TableValueConstructor {
    pub rows: Vec<Vec<Box<dyn Expression>>>,
    pub sort_order: Option<SortOrder>,
    pub offset: Option<Box<dyn Expression>>,
    pub fetch: Option<Box<dyn Expression>>,
    pub fetch_percent: bool,
    pub with_ties: bool,
}

impl TableValueConstructor {
    #[must_use]
    pub const fn new(rows: Vec<Vec<Box<dyn Expression>>>) -> Self {
        Self {
            rows,
            sort_order: None,
            offset: None,
            fetch: None,
            fetch_percent: false,
            with_ties: false,
        }
    }

    /// Evaluate every row, harmonize column types, then apply the common
    /// finishing path. `VALUES` has no WHERE/GROUP BY/cache — every call
    /// re-evaluates, and it has no execution-mode variance of its own.
    pub fn query(&self) -> Result<Vec<Row>> {
        let evaluated = evaluate_value_rows(&self.rows)?;
        let total_rows = Some(evaluated.len() as u64);
        let resolved = resolve_offset_fetch(
            self.offset.as_deref(),
            self.fetch.as_deref(),
            self.fetch_percent,
            self.with_ties,
            total_rows,
        )?;
        Ok(finish(&evaluated, 0, resolved, self.sort_order.as_ref(), None))
    }
}
