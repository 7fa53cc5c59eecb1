//! Wildcard expansion: `init()`'s first sub-step, turning `*`, `t.*`, and
//! `* EXCEPT(...)` into concrete select-list entries before anything else
//! in the life-cycle resolves against the select list. Column enumeration,
//! the USING/NATURAL common-column COALESCE rule, and expression
//! construction are the caller's job (this crate does not own the
//! catalog or the expression tree); this module owns the life-cycle rules
//! around that: alias validation, splicing the replacement into the
//! expression list in place, and enforcing `MAX_COLUMNS` over the
//! expanded total.

use crate::error::{ErrorKind, QueryError, Result};
use crate::external::{Expression, TableFilter};

///
/// WildcardSpec
///
/// What one `Wildcard` expression-tree placeholder asks to be expanded
/// into. `except` names columns dropped from the expansion (the
/// Postgres/DuckDB-style `* EXCEPT(...)` form).
///

#[derive(Clone, Debug)]
pub enum WildcardSpec {
    All { except: Vec<String> },
    Qualified { alias: String, except: Vec<String> },
}

/// Replace every `Wildcard` expression in `expressions` with the
/// caller-supplied expansion of it, validating qualified aliases against
/// `filters`, splicing expansions in at the wildcard's original position,
/// and enforcing `max_columns` over the post-expansion total. `expand` is
/// called once per wildcard encountered, in `expressions` order.
///
/// Postcondition (matching the "after init, no Wildcard remains in
/// expressions" invariant): returns an internal error if `expand` itself
/// hands back an unexpanded wildcard, rather than silently leaving one in
/// place.
pub fn expand_wildcards<F: TableFilter>(
    expressions: &mut Vec<Box<dyn Expression>>,
    filters: &[F],
    max_columns: usize,
    equals_identifiers: &impl Fn(&str, &str) -> bool,
    mut expand: impl FnMut(&WildcardSpec) -> Result<Vec<Box<dyn Expression>>>,
) -> Result<()> {
    let mut position = 0;
    while position < expressions.len() {
        let Some(spec) = expressions[position].as_wildcard() else {
            position += 1;
            continue;
        };

        if let WildcardSpec::Qualified { alias, .. } = &spec {
            if !filters.iter().any(|f| equals_identifiers(f.table_alias(), alias)) {
                return Err(QueryError::from(ErrorKind::UnknownTableAlias(alias.clone())));
            }
        }

        let replacement = expand(&spec)?;
        if replacement.iter().any(|expr| expr.as_wildcard().is_some()) {
            return Err(QueryError::from(ErrorKind::Internal(
                "wildcard expansion returned an unexpanded wildcard".to_string(),
            )));
        }

        let replacement_len = replacement.len();
        expressions.splice(position..=position, replacement);
        position += replacement_len;
    }

    if expressions.len() > max_columns {
        return Err(QueryError::from(ErrorKind::TooManyColumns {
            found: expressions.len(),
            limit: max_columns,
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::testing::{MemTable, MemTableFilter};
    use crate::value::Value;

    struct StarExpr(WildcardSpec);

    impl Expression for StarExpr {
        fn is_constant(&self) -> bool {
            false
        }
        fn evaluate(&self, _row: &crate::value::Row) -> Result<Value> {
            Ok(Value::Null)
        }
        fn sql(&self) -> String {
            "*".to_string()
        }
        fn as_wildcard(&self) -> Option<WildcardSpec> {
            Some(self.0.clone())
        }
    }

    struct ColumnExpr(&'static str);

    impl Expression for ColumnExpr {
        fn is_constant(&self) -> bool {
            false
        }
        fn evaluate(&self, _row: &crate::value::Row) -> Result<Value> {
            Ok(Value::Null)
        }
        fn sql(&self) -> String {
            self.0.to_string()
        }
    }

    fn filter(alias: &str) -> MemTableFilter {
        MemTableFilter::new(
            MemTable {
                name: "t".into(),
                rows: Vec::new(),
                row_lockable: false,
                max_modification_id: 0,
                locked_rows: Default::default(),
                scan_index: 0,
            },
            alias,
        )
    }

    fn eq_ident(a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    #[test]
    fn unqualified_star_expands_in_place() {
        let mut expressions: Vec<Box<dyn Expression>> =
            vec![Box::new(StarExpr(WildcardSpec::All { except: Vec::new() }))];
        let filters = vec![filter("t")];

        expand_wildcards(&mut expressions, &filters, 1000, &eq_ident, |_| {
            Ok(vec![Box::new(ColumnExpr("a")) as Box<dyn Expression>, Box::new(ColumnExpr("b"))])
        })
        .unwrap();

        assert_eq!(expressions.len(), 2);
        assert_eq!(expressions[0].sql(), "a");
        assert_eq!(expressions[1].sql(), "b");
    }

    #[test]
    fn qualified_star_rejects_unknown_alias() {
        let mut expressions: Vec<Box<dyn Expression>> = vec![Box::new(StarExpr(WildcardSpec::Qualified {
            alias: "missing".to_string(),
            except: Vec::new(),
        }))];
        let filters = vec![filter("t")];

        let err = expand_wildcards(&mut expressions, &filters, 1000, &eq_ident, |_| Ok(Vec::new())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownTableAlias("missing".to_string()));
    }

    #[test]
    fn expansion_enforces_max_columns_over_expanded_total() {
        let mut expressions: Vec<Box<dyn Expression>> =
            vec![Box::new(StarExpr(WildcardSpec::All { except: Vec::new() }))];
        let filters = vec![filter("t")];

        let err = expand_wildcards(&mut expressions, &filters, 1, &eq_ident, |_| {
            Ok(vec![Box::new(ColumnExpr("a")) as Box<dyn Expression>, Box::new(ColumnExpr("b"))])
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TooManyColumns { found: 2, limit: 1 });
    }

    #[test]
    fn unexpanded_wildcard_in_the_replacement_is_an_internal_error() {
        let mut expressions: Vec<Box<dyn Expression>> =
            vec![Box::new(StarExpr(WildcardSpec::All { except: Vec::new() }))];
        let filters = vec![filter("t")];

        let err = expand_wildcards(&mut expressions, &filters, 1000, &eq_ident, |spec| {
            Ok(vec![Box::new(StarExpr(spec.clone()))])
        })
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Internal(_)));
    }
}
