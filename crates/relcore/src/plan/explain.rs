//! EXPLAIN / diagnostics surface. Purely descriptive: building an
//! `ExplainPlan` never changes query semantics, it only projects the
//! already-chosen plan for inspection.

use crate::exec::ExecutionMode;

///
/// AccessKind
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AccessKind {
    FullScan,
    RowId,
    Index { name: String, reverse: bool },
}

///
/// ExplainFilter
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExplainFilter {
    pub alias: String,
    pub access: AccessKind,
}

///
/// ExplainPlan
///
/// A serializable snapshot of: chosen access path per filter (in join
/// order), whether an in-memory sort was eliminated, the resolved
/// `ExecutionMode`, and whether DISTINCT was rewritten to
/// distinct-via-index.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExplainPlan {
    pub filters: Vec<ExplainFilter>,
    pub order_eliminated: bool,
    pub execution_mode: ExecutionMode,
    pub distinct_via_index: bool,
}

impl ExplainPlan {
    #[must_use]
    pub const fn new(
        filters: Vec<ExplainFilter>,
        order_eliminated: bool,
        execution_mode: ExecutionMode,
        distinct_via_index: bool,
    ) -> Self {
        Self {
            filters,
            order_eliminated,
            execution_mode,
            distinct_via_index,
        }
    }
}

/// Generic visitor for walking the access-plan/index-sort shape that
/// produces an `ExplainPlan`'s filter list. Kept separate from
/// `ExplainPlan` construction so other diagnostic projections (e.g. a
/// future cost breakdown) can reuse the same walk.
pub trait AccessPlanProjection {
    type Output;
    fn project_filter(&mut self, alias: &str, access: &AccessKind) -> Self::Output;
}

/// Walk `filters` in join order, applying `projection` to each and
/// collecting the results.
pub fn project_access_plan<P: AccessPlanProjection>(
    filters: &[(String, AccessKind)],
    mut projection: P,
) -> Vec<P::Output> {
    filters
        .iter()
        .map(|(alias, access)| projection.project_filter(alias, access))
        .collect()
}
