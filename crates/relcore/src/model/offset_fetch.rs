//! OffsetFetch: resolves OFFSET/FETCH expressions to concrete row
//! counts, including FETCH PERCENT.

use crate::error::{ErrorKind, QueryError, Result};
use crate::external::Expression;
use crate::value::{Row, Value};

///
/// OffsetFetch
///
/// `offset`/`fetch` are unresolved expressions (may be `None`); `resolve`
/// evaluates them against an empty correlation row (OFFSET/FETCH may not
/// reference outer columns) and returns a `ResolvedOffsetFetch`.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ResolvedOffsetFetch {
    pub offset: u64,
    /// `None` means no FETCH clause: unbounded.
    pub fetch: Option<u64>,
    pub with_ties: bool,
}

impl ResolvedOffsetFetch {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            offset: 0,
            fetch: None,
            with_ties: false,
        }
    }
}

fn as_i64(value: &Value, what: &'static str) -> Result<i64> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Null => Err(QueryError::from(ErrorKind::InvalidValue(format!(
            "{what} must not be NULL"
        )))),
        _ => Err(QueryError::from(ErrorKind::InvalidValue(format!(
            "{what} must be an integer"
        )))),
    }
}

/// Resolve `offset`/`fetch` expressions into concrete row counts.
/// `fetch_percent` flags that `fetch` is a percentage in `[0, 100]` to be
/// applied against `total_rows` once the candidate set size is known.
///
/// Negative or NULL offset/fetch values are rejected with an
/// invalid-value error. `0 PERCENT` is special-cased to mean zero rows
/// with the percent flag cleared.
pub fn resolve_offset_fetch(
    offset: Option<&dyn Expression>,
    fetch: Option<&dyn Expression>,
    fetch_percent: bool,
    with_ties: bool,
    total_rows: Option<u64>,
) -> Result<ResolvedOffsetFetch> {
    let empty_row: Row = Vec::new();

    let offset_value = match offset {
        Some(expr) => {
            let n = as_i64(&expr.evaluate(&empty_row)?, "OFFSET")?;
            if n < 0 {
                return Err(QueryError::from(ErrorKind::InvalidValue(
                    "OFFSET must not be negative".into(),
                )));
            }
            n as u64
        }
        None => 0,
    };

    let fetch_value = match fetch {
        Some(expr) => {
            let n = as_i64(&expr.evaluate(&empty_row)?, "FETCH")?;
            if n < 0 {
                return Err(QueryError::from(ErrorKind::InvalidValue(
                    "FETCH must not be negative".into(),
                )));
            }
            if fetch_percent {
                if !(0..=100).contains(&n) {
                    return Err(QueryError::from(ErrorKind::InvalidValue(
                        "FETCH PERCENT must be within 0..=100".into(),
                    )));
                }
                if n == 0 {
                    Some(0)
                } else {
                    let total = total_rows.unwrap_or(0);
                    Some(percent_of(total, n as u64))
                }
            } else {
                Some(n as u64)
            }
        }
        None => None,
    };

    Ok(ResolvedOffsetFetch {
        offset: offset_value,
        fetch: fetch_value,
        with_ties,
    })
}

/// Ceiling-rounded `total * pct / 100`, so e.g. 10% of 3 rows fetches 1
/// row rather than truncating to 0.
const fn percent_of(total: u64, pct: u64) -> u64 {
    (total * pct).div_ceil(100)
}

/// Whether `quickOffset` (pre-skipping rows before materialization) may
/// be used: only when percent is off, and only as a *partial* skip
/// restricted to the ORDER-BY-sorted prefix when the index does not
/// fully satisfy ORDER BY.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuickOffset {
    /// No ORDER BY, or the index fully satisfies it: offset may be
    /// applied directly against the scan.
    Full,
    /// The index satisfies only a prefix of ORDER BY: offset applies only
    /// within that sorted prefix; rows beyond it still need a sort.
    Partial,
    /// FETCH PERCENT is active, or some other condition defeats
    /// pre-skipping; the whole candidate set must be materialized first.
    Disabled,
}

#[must_use]
pub const fn quick_offset_mode(fetch_percent: bool, fully_sorted: bool, has_order_by: bool) -> QuickOffset {
    if fetch_percent {
        QuickOffset::Disabled
    } else if !has_order_by || fully_sorted {
        QuickOffset::Full
    } else {
        QuickOffset::Partial
    }
}
