//! Window executor: two flavors. Plain window does one gather
//! pass over all rows as a single group (or none), then materializes
//! window functions in a separate "window" stage. Group+window hashes
//! groups first, applies HAVING, then re-walks every surviving group's
//! member rows in the window stage to produce final rows.

use crate::error::Result;
use crate::external::Expression;
use crate::value::{Row, Value};

fn is_true(predicate: Option<&dyn Expression>, row: &Row) -> Result<bool> {
    match predicate {
        Some(expr) => Ok(matches!(expr.evaluate(row)?, Value::Bool(true))),
        None => Ok(true),
    }
}

/// Plain window: one partition containing every input row (PARTITION BY,
/// if any, is the external window runtime's concern inside
/// `apply_windows`). QUALIFY runs after window evaluation.
pub fn run_window_plain(
    rows: Vec<Row>,
    apply_windows: &dyn Fn(&[Row]) -> Result<Vec<Row>>,
    qualify: Option<&dyn Expression>,
) -> Result<Vec<Row>> {
    let windowed = apply_windows(&rows)?;
    let mut out = Vec::with_capacity(windowed.len());
    for row in windowed {
        if is_true(qualify, &row)? {
            out.push(row);
        }
    }
    Ok(out)
}

/// Group+window: partitions `rows` by `group_key_of` (stable: groups
/// appear in first-seen order), applies `group_having` per partition
/// *before* any window computation, then re-walks
/// each surviving partition's member rows through `apply_windows`.
/// QUALIFY is evaluated per output row after that.
pub fn run_window_group(
    rows: Vec<Row>,
    group_key_of: &dyn Fn(&Row) -> Row,
    group_having: &dyn Fn(&[Row]) -> Result<bool>,
    apply_windows: &dyn Fn(&[Row]) -> Result<Vec<Row>>,
    qualify: Option<&dyn Expression>,
) -> Result<Vec<Row>> {
    // Groups are rarely numerous enough to warrant a hash map keyed on
    // `Row` (whose `f64` columns make a sound `Hash`/`Eq` awkward), so
    // partitions are kept as a linear-scanned, first-seen-ordered list.
    let mut partitions: Vec<(Row, Vec<Row>)> = Vec::new();

    for row in rows {
        let key = group_key_of(&row);
        match partitions.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(row),
            None => partitions.push((key, vec![row])),
        }
    }

    let mut out = Vec::new();
    for (_, members) in partitions {
        if !group_having(&members)? {
            continue;
        }
        let windowed = apply_windows(&members)?;
        for row in windowed {
            if is_true(qualify, &row)? {
                out.push(row);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_window_passes_rows_through_apply_windows_then_qualify() {
        let rows = vec![vec![Value::Int(1)], vec![Value::Int(2)]];
        let result = run_window_plain(rows, &|r| Ok(r.to_vec()), None).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn group_window_drops_partitions_failing_having() {
        let rows = vec![
            vec![Value::Text("n".into()), Value::Int(1)],
            vec![Value::Text("s".into()), Value::Int(2)],
        ];
        let result = run_window_group(
            rows,
            &|r| vec![r[0].clone()],
            &|members| Ok(members[0][0] == Value::Text("n".into())),
            &|members| Ok(members.to_vec()),
            None,
        )
        .unwrap();
        assert_eq!(result, vec![vec![Value::Text("n".into()), Value::Int(1)]]);
    }
}
