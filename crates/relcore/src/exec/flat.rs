//! Flat executor: the default producer. Advances the top
//! filter, evaluates WHERE per row, and either counts the row as skipped
//! (quick offset), emits the projected row, or — under FOR UPDATE —
//! locks it first.

use crate::error::{ErrorKind, QueryError, Result};
use crate::exec::lock::{apply_for_update, ForUpdateDecision};
use crate::external::{Expression, Table, TableFilter};
use crate::model::ForUpdate;
use crate::value::{Row, Value};

///
/// FlatResult
///

#[derive(Clone, Debug, Default)]
pub struct FlatResult {
    pub rows: Vec<Row>,
    /// Rows dropped by quick-offset pre-skipping rather than by WHERE.
    pub quick_skipped: u64,
}

fn is_true(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

fn eval_where(where_clause: Option<&dyn Expression>, row: &Row) -> Result<bool> {
    match where_clause {
        Some(expr) => Ok(is_true(&expr.evaluate(row)?)),
        None => Ok(true),
    }
}

/// Run the flat producer to completion over `filter`, applying `project`
/// to every qualifying row. `quick_offset` rows are dropped before
/// projection without locking or materializing, simply counted as
/// skipped.
pub fn run_flat<F>(
    filter: &mut F,
    where_clause: Option<&dyn Expression>,
    project: &dyn Fn(&Row) -> Result<Row>,
    for_update: Option<ForUpdate>,
    session_default_timeout_millis: u64,
    quick_offset: u64,
) -> Result<FlatResult>
where
    F: TableFilter,
{
    let mut rows = Vec::new();
    let mut quick_skipped = 0u64;

    filter.reset();
    while filter.next()? {
        let current = filter
            .current_row()
            .ok_or_else(|| QueryError::from(ErrorKind::Internal("filter advanced without a row".into())))?
            .clone();

        if !eval_where(where_clause, &current)? {
            continue;
        }

        let row_to_emit = if let Some(fu) = for_update {
            if filter.table().is_row_lockable() {
                match apply_for_update(filter.table(), &current, fu, session_default_timeout_millis)? {
                    ForUpdateDecision::Skip => continue,
                    ForUpdateDecision::Emit => current,
                    ForUpdateDecision::ReEvaluate => {
                        let fresh = filter.current_row().ok_or_else(|| {
                            QueryError::from(ErrorKind::Internal("row disappeared after lock".into()))
                        })?;
                        if !eval_where(where_clause, fresh)? {
                            continue;
                        }
                        fresh.clone()
                    }
                }
            } else {
                current
            }
        } else {
            current
        };

        if quick_skipped < quick_offset {
            quick_skipped += 1;
            continue;
        }

        rows.push(project(&row_to_emit)?);
    }

    Ok(FlatResult { rows, quick_skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::testing::{MemTable, MemTableFilter};

    fn filter_with(rows: Vec<Row>) -> MemTableFilter {
        let table = MemTable {
            name: "t".into(),
            rows,
            row_lockable: false,
            max_modification_id: 0,
            locked_rows: std::collections::HashSet::new(),
            scan_index: 0,
        };
        MemTableFilter::new(table, "t")
    }

    #[test]
    fn flat_projects_every_row_with_no_where() {
        let mut f = filter_with(vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        let result = run_flat(&mut f, None, &|r| Ok(r.clone()), None, 0, 0).unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn quick_offset_drops_leading_rows_without_projecting() {
        let mut f = filter_with(vec![vec![Value::Int(1)], vec![Value::Int(2)], vec![Value::Int(3)]]);
        let result = run_flat(&mut f, None, &|r| Ok(r.clone()), None, 0, 2).unwrap();
        assert_eq!(result.rows, vec![vec![Value::Int(3)]]);
        assert_eq!(result.quick_skipped, 2);
    }
}
