//! SelectListColumnResolver: resolves aliases used in HAVING/QUALIFY to
//! select-list positions, and merges GROUP BY terms that are the same
//! expression written twice.

///
/// SelectListItem
///
/// The minimal view this resolver needs of one select-list entry: its
/// alias (if any) and a canonical SQL snapshot used for identity
/// matching against a snapshot of the visible columns' SQL text.
///

#[derive(Clone, Debug)]
pub struct SelectListItem {
    pub alias: Option<String>,
    pub sql: String,
}

/// Resolve a HAVING/QUALIFY identifier to a position in the select list.
/// Matching is alias-first (case-insensitive per `equals_identifiers`),
/// falling back to exact SQL-text identity — mirroring GROUP BY
/// resolution's own "SQL identity first, then alias" order would invert
/// HAVING's historical alias-preferring behavior, so HAVING/QUALIFY keep
/// alias-first here deliberately.
#[must_use]
pub fn resolve_having_alias(
    identifier: &str,
    items: &[SelectListItem],
    equals_identifiers: impl Fn(&str, &str) -> bool,
) -> Option<usize> {
    items
        .iter()
        .position(|item| item.alias.as_deref().is_some_and(|a| equals_identifiers(a, identifier)))
        .or_else(|| items.iter().position(|item| item.sql == identifier))
}

///
/// GroupByResolution
///
/// One GROUP BY term's resolved position plus, when it is a re-write of
/// an earlier term, the index of that earlier (source) term: identical
/// SQL forms after resolution are merged via `groupByCopies` so each
/// distinct expression is evaluated once.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GroupByResolution {
    pub expression_index: usize,
    pub copy_of: Option<usize>,
}

/// Resolve every GROUP BY term against the select list (by SQL identity
/// first, then alias), appending a new expression-list entry when the
/// term is neither, and recording `copy_of` when two terms resolve to the
/// same expression-list position but were written as syntactically
/// distinct GROUP BY terms (e.g. `GROUP BY a, a`).
pub fn resolve_group_by(
    group_by_sql: &[String],
    items: &[SelectListItem],
    equals_identifiers: impl Fn(&str, &str) -> bool,
    mut append_new_expression: impl FnMut(&str) -> usize,
) -> Vec<GroupByResolution> {
    let mut seen_positions: Vec<(usize, usize)> = Vec::new(); // (expression_index, first group_by ordinal)
    let mut resolutions = Vec::with_capacity(group_by_sql.len());

    for (ordinal, term) in group_by_sql.iter().enumerate() {
        let position = items
            .iter()
            .position(|item| &item.sql == term)
            .or_else(|| {
                items
                    .iter()
                    .position(|item| item.alias.as_deref().is_some_and(|a| equals_identifiers(a, term)))
            })
            .unwrap_or_else(|| append_new_expression(term));

        let copy_of = seen_positions
            .iter()
            .find(|&&(expr_idx, _)| expr_idx == position)
            .map(|&(_, first_ordinal)| first_ordinal);

        if copy_of.is_none() {
            seen_positions.push((position, ordinal));
        }

        resolutions.push(GroupByResolution {
            expression_index: position,
            copy_of,
        });
    }

    resolutions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq_ident(a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    #[test]
    fn having_resolves_alias_case_insensitively() {
        let items = vec![
            SelectListItem { alias: None, sql: "region".into() },
            SelectListItem { alias: Some("S".into()), sql: "SUM(amount)".into() },
        ];
        assert_eq!(resolve_having_alias("s", &items, eq_ident), Some(1));
    }

    #[test]
    fn group_by_merges_repeated_terms_into_copies() {
        let items = vec![SelectListItem { alias: None, sql: "region".into() }];
        let resolutions = resolve_group_by(
            &["region".to_string(), "region".to_string()],
            &items,
            eq_ident,
            |_| panic!("should not need to append"),
        );
        assert_eq!(resolutions[0].copy_of, None);
        assert_eq!(resolutions[1].copy_of, Some(0));
        assert_eq!(resolutions[1].expression_index, 0);
    }

    #[test]
    fn group_by_appends_when_not_in_select_list() {
        let items = vec![SelectListItem { alias: None, sql: "region".into() }];
        let mut appended = Vec::new();
        let resolutions = resolve_group_by(
            &["dept".to_string()],
            &items,
            eq_ident,
            |sql| {
                appended.push(sql.to_string());
                items.len() + appended.len() - 1
            },
        );
        assert_eq!(resolutions[0].expression_index, 1);
        assert_eq!(appended, vec!["dept".to_string()]);
    }
}
