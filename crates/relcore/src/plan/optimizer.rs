//! Cost-based Optimizer: decides index + join order per filter. A
//! compliant collaborator may replace the rule-based picker
//! entirely; this module provides the trait seam plus a rule-based
//! `Optimizer` implementation built on `plan::join_order`.

use crate::error::Result;
use crate::plan::join_order::{pick_join_order, JoinCandidate};

///
/// AccessChoice
///
/// Per-filter access path decision: which index (by name, `None` means
/// full scan) and scan direction.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessChoice {
    pub filter_index: usize,
    pub chosen_index: Option<String>,
    pub reverse: bool,
    pub estimated_cost: u64,
}

///
/// OptimizedPlan
///
/// Result of running the optimizer over a FROM clause: a join order (as
/// filter indexes) plus the access choice for each.
///

#[derive(Clone, Debug)]
pub struct OptimizedPlan {
    pub join_order: Vec<usize>,
    pub choices: Vec<AccessChoice>,
    pub total_cost: u64,
}

/// Seam for a cost-based optimizer collaborator: any implementation may
/// replace the rule-based picker below. The core guarantees only that
/// after `preparePlan` returns, exactly one top filter is set — it does
/// not mandate the algorithm.
pub trait Optimizer {
    fn optimize(&self, candidates: &[JoinCandidate], edges: &[(usize, usize)]) -> Result<OptimizedPlan>;
}

/// Default rule-based optimizer: defers join ordering to
/// `join_order::pick_join_order` and leaves every filter on a full scan
/// (no index choice) with a cost equal to its approximate row count. A
/// real deployment is expected to supply a richer `Optimizer` that
/// consults index selectivity; this default exists so the planner is
/// runnable with zero external cost model.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleBasedOptimizer;

impl Optimizer for RuleBasedOptimizer {
    fn optimize(&self, candidates: &[JoinCandidate], edges: &[(usize, usize)]) -> Result<OptimizedPlan> {
        let join_order = pick_join_order(candidates, edges)?;
        let mut total_cost = 0u64;
        let choices = join_order
            .iter()
            .map(|&filter_index| {
                let cost = candidates[filter_index].approximate_row_count;
                total_cost = total_cost.saturating_add(cost);
                AccessChoice {
                    filter_index,
                    chosen_index: None,
                    reverse: false,
                    estimated_cost: cost,
                }
            })
            .collect();

        Ok(OptimizedPlan {
            join_order,
            choices,
            total_cost,
        })
    }
}

/// Distinct-via-index eligibility: single filter, single
/// visible column, no WHERE, DISTINCT, the column's selectivity below
/// `threshold`, and an index available over that column.
#[must_use]
pub fn distinct_via_index_eligible(
    is_single_filter: bool,
    visible_column_count: usize,
    has_where: bool,
    is_distinct: bool,
    column_selectivity: Option<f64>,
    threshold: f64,
) -> bool {
    is_single_filter
        && visible_column_count == 1
        && !has_where
        && is_distinct
        && column_selectivity.is_some_and(|s| s < threshold)
}
