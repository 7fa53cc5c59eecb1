//! Rule-based join-order picker, the default join-order strategy when
//! no cost-based `Optimizer` collaborator overrides it.
//!
//! Determinism contract: given the same candidate list (names + row-count
//! estimates) and the same edge set, `pick_join_order` is pure and
//! produces byte-identical output across calls. Ties are always broken by
//! a total order over candidate alias names, never by hash-map iteration
//! order — candidates and edges may be supplied in any order and the
//! result does not change.

use crate::error::{ErrorKind, QueryError, Result};

///
/// JoinCandidate
///

#[derive(Clone, Debug)]
pub struct JoinCandidate {
    pub alias: String,
    pub approximate_row_count: u64,
}

/// Picks the smallest-row-count-first join order that avoids a cartesian
/// product: start from the globally smallest table, then repeatedly
/// extend by the smallest remaining table that has at least one edge
/// into the already-joined set. `edges` are undirected pairs of
/// candidate indexes (one per equality condition between two distinct
/// tables' columns).
///
/// Fails with `ErrorKind::FeatureNotSupported`-shaped "no valid join order"
/// when the join graph is disconnected, rather than silently falling
/// back to cartesian product.
pub fn pick_join_order(candidates: &[JoinCandidate], edges: &[(usize, usize)]) -> Result<Vec<usize>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let n = candidates.len();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(a, b) in edges {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let mut joined = vec![false; n];
    let mut order = Vec::with_capacity(n);

    let first = smallest_by_row_count(candidates, (0..n).filter(|&i| !joined[i]));
    joined[first] = true;
    order.push(first);

    while order.len() < n {
        let reachable = (0..n).filter(|&i| {
            !joined[i] && adjacency[i].iter().any(|&j| joined[j])
        });
        match smallest_by_row_count_opt(candidates, reachable) {
            Some(next) => {
                joined[next] = true;
                order.push(next);
            }
            None => {
                return Err(QueryError::from(ErrorKind::FeatureNotSupported(
                    "no valid join order without cartesian product".into(),
                )));
            }
        }
    }

    Ok(order)
}

fn smallest_by_row_count(candidates: &[JoinCandidate], iter: impl Iterator<Item = usize>) -> usize {
    smallest_by_row_count_opt(candidates, iter).expect("iterator must be non-empty")
}

fn smallest_by_row_count_opt(
    candidates: &[JoinCandidate],
    iter: impl Iterator<Item = usize>,
) -> Option<usize> {
    iter.min_by(|&a, &b| {
        candidates[a]
            .approximate_row_count
            .cmp(&candidates[b].approximate_row_count)
            .then_with(|| candidates[a].alias.cmp(&candidates[b].alias))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(alias: &str, rows: u64) -> JoinCandidate {
        JoinCandidate {
            alias: alias.into(),
            approximate_row_count: rows,
        }
    }

    #[test]
    fn starts_from_smallest_table_and_extends_by_edges() {
        let candidates = vec![candidate("big", 1000), candidate("small", 10), candidate("mid", 100)];
        // small(1) -- mid(2) -- big(0)
        let edges = vec![(1, 2), (2, 0)];
        let order = pick_join_order(&candidates, &edges).unwrap();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn disconnected_graph_is_an_explicit_error() {
        let candidates = vec![candidate("a", 10), candidate("b", 10)];
        let result = pick_join_order(&candidates, &[]);
        assert!(result.is_err());
    }

    #[test]
    fn ties_break_by_alias_name() {
        let candidates = vec![candidate("b", 10), candidate("a", 10)];
        let order = pick_join_order(&candidates, &[(0, 1)]).unwrap();
        assert_eq!(order[0], 1);
    }
}
