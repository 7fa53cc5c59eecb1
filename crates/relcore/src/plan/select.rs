//! Select: the heart of the engine. Owns the filters, conditions,
//! expressions, and flags a prepared SELECT carries, and drives it
//! through init → prepare_expressions → prepare_plan → query.
//!
//! Scope note: real join execution across multiple `TableFilter`s
//! (nested-loop advancement driven by the chosen join order) belongs to
//! the storage/cursor layer this core treats as external. This module
//! plans join order and per-filter access paths for any number of
//! filters (see `plan::join_order`, `plan::optimizer`), but the `query_*`
//! methods execute only the single-filter case. A multi-filter
//! nested-loop executor is future work once a concrete multi-table
//! storage collaborator exists.
//!
//! Scope note 2: GROUP BY's aggregation math, window functions, and quick
//! aggregate's index metadata are all external collaborators (see
//! `external::SelectGroups`). Rather than store boxed closures as plan
//! state, the mode-specific
//! `query_grouped`/`query_windowed`/`query_quick_aggregate` methods take
//! the needed collaborator as a parameter, matching how `table`/`session`
//! are threaded through the rest of this crate.

use crate::direction::SortOrder;
use crate::error::{ErrorKind, QueryError, Result};
use crate::exec::quick_aggregate::{run_quick_aggregate, QuickAggregateKind, QuickAggregateSource};
use crate::exec::{self, ExecutionMode, ModeFlags};
use crate::external::{Database, Expression, Index, SelectGroups, Session, Table, TableFilter};
use crate::model::offset_fetch::resolve_offset_fetch;
use crate::model::ForUpdate;
use crate::plan::cache::ResultCache;
use crate::plan::column_resolver::{resolve_group_by, GroupByResolution, SelectListItem};
use crate::plan::explain::{AccessKind, ExplainFilter, ExplainPlan};
use crate::plan::fingerprint::PlanFingerprint;
use crate::plan::index_sort::{plan_index_sort, CandidateIndex, IndexSort};
use crate::plan::join_order::JoinCandidate;
use crate::plan::optimizer::{distinct_via_index_eligible, Optimizer};
use crate::plan::wildcard::{self, WildcardSpec};
use crate::value::{Row, Value};

fn project_row(expressions: &[Box<dyn Expression>], row: &Row) -> Result<Row> {
    expressions.iter().map(|e| e.evaluate(row)).collect()
}

fn group_key(expressions: &[Box<dyn Expression>], resolution: &[GroupByResolution], row: &Row) -> Row {
    let raw: Row = resolution
        .iter()
        .map(|g| expressions[g.expression_index].evaluate(row).unwrap_or(Value::Null))
        .collect();
    let copies: Vec<Option<usize>> = resolution.iter().map(|g| g.copy_of).collect();
    exec::group_hashed::apply_group_by_copies(raw, &copies)
}

///
/// Select
///
/// Generic over one `TableFilter` implementation — a Select holds a set
/// of TableFilter, one per FROM source; see the module-level scope note
/// on why execution only drives the single-filter case.
///

pub struct Select<F: TableFilter> {
    pub filters: Vec<F>,
    pub where_condition: Option<Box<dyn Expression>>,
    pub having: Option<Box<dyn Expression>>,
    pub qualify: Option<Box<dyn Expression>>,
    pub expressions: Vec<Box<dyn Expression>>,
    pub distinct: bool,
    /// `DISTINCT ON (...)` source text, one entry per expression; resolved
    /// by `init` into `distinct_indexes`. Mutually exclusive with plain
    /// `distinct` in practice (a caller sets one or the other), though
    /// nothing here enforces it.
    pub distinct_on_sql: Vec<String>,
    pub distinct_indexes: Vec<usize>,
    pub group_by_sql: Vec<String>,
    pub group_resolution: Vec<GroupByResolution>,
    pub order_by_columns: Vec<usize>,
    pub sort_order: Option<SortOrder>,
    pub offset: Option<Box<dyn Expression>>,
    pub fetch: Option<Box<dyn Expression>>,
    pub fetch_percent: bool,
    pub with_ties: bool,
    pub random_access_result: bool,
    pub visible_column_count: usize,
    pub for_update: Option<ForUpdate>,
    /// Mode flags not derivable from plan state alone (`is_window_query`,
    /// `is_quick_aggregate_query`) are the caller's responsibility to set
    /// before `prepare_plan`; `is_group_query`/`is_group_sorted_query`/
    /// `is_distinct_query` are filled in by `prepare_plan` itself.
    pub mode_flags: ModeFlags,
    pub index_sort: Option<IndexSort>,
    pub cache: ResultCache,
    check_init: bool,
    expressions_prepared: bool,
    prepared: bool,
    fingerprint: Option<PlanFingerprint>,
}

impl<F: TableFilter> Select<F> {
    #[must_use]
    pub fn new(filters: Vec<F>, expressions: Vec<Box<dyn Expression>>) -> Self {
        let visible_column_count = expressions.len();
        Self {
            filters,
            where_condition: None,
            having: None,
            qualify: None,
            expressions,
            distinct: false,
            distinct_on_sql: Vec::new(),
            distinct_indexes: Vec::new(),
            group_by_sql: Vec::new(),
            group_resolution: Vec::new(),
            order_by_columns: Vec::new(),
            sort_order: None,
            offset: None,
            fetch: None,
            fetch_percent: false,
            with_ties: false,
            random_access_result: false,
            visible_column_count,
            for_update: None,
            mode_flags: ModeFlags::default(),
            index_sort: None,
            cache: ResultCache::new(),
            check_init: false,
            expressions_prepared: false,
            prepared: false,
            fingerprint: None,
        }
    }

    /// Wildcard expansion: `init()`'s life-cycle precursor. Replaces every
    /// `*` / `t.*` / `* EXCEPT(...)` placeholder in `expressions` with the
    /// caller's expansion of it (column enumeration, the USING/NATURAL
    /// COALESCE rule, and expression construction are all catalog-backed
    /// work this crate does not own — see `plan::wildcard`). Naturally
    /// idempotent: once no `Wildcard` expressions remain, a second call is
    /// a no-op.
    ///
    /// Call this, then build `select_list` from the (now expanded)
    /// `expressions`, before calling `init` — `init`'s own GROUP BY/
    /// DISTINCT ON resolution assumes `select_list` already matches
    /// `expressions` one-to-one.
    pub fn expand_wildcards(
        &mut self,
        max_columns: usize,
        equals_identifiers: impl Fn(&str, &str) -> bool,
        expand: impl FnMut(&WildcardSpec) -> Result<Vec<Box<dyn Expression>>>,
    ) -> Result<()> {
        wildcard::expand_wildcards(&mut self.expressions, &self.filters, max_columns, &equals_identifiers, expand)?;
        self.visible_column_count = self.expressions.len();
        Ok(())
    }

    /// `init()`: idempotent, enforces `MAX_COLUMNS`, refuses WITH TIES
    /// without ORDER BY, rejects FOR UPDATE on a DISTINCT or GROUP BY
    /// query, resolves GROUP BY against the select list.
    ///
    /// Assumes `expand_wildcards` has already run: no `Wildcard`
    /// expression may remain in `expressions` (the §3 invariant), checked
    /// defensively below rather than trusted silently.
    ///
    /// GROUP BY terms that are neither already in the select list (by SQL
    /// identity) nor an alias of one are rejected rather than silently
    /// appended: conjuring a fresh `Expression` for an arbitrary SQL
    /// string would require the external expression tree this crate does
    /// not own. A caller whose GROUP BY references a term outside the
    /// select list must add it as a hidden select-list entry itself before
    /// constructing `Select`.
    pub fn init(
        &mut self,
        max_columns: usize,
        select_list: &[SelectListItem],
        equals_identifiers: impl Fn(&str, &str) -> bool,
    ) -> Result<()> {
        if self.check_init {
            return Ok(());
        }

        if let Some(position) = self.expressions.iter().position(|e| e.as_wildcard().is_some()) {
            return Err(QueryError::from(ErrorKind::Internal(format!(
                "unexpanded wildcard at expression position {position}; call expand_wildcards before init"
            ))));
        }

        if self.expressions.len() > max_columns {
            return Err(QueryError::from(ErrorKind::TooManyColumns {
                found: self.expressions.len(),
                limit: max_columns,
            }));
        }

        if self.with_ties && self.order_by_columns.is_empty() {
            return Err(QueryError::from(ErrorKind::WithTiesWithoutOrderBy));
        }

        if self.for_update.is_some()
            && (self.distinct || !self.distinct_on_sql.is_empty() || !self.group_by_sql.is_empty())
        {
            return Err(QueryError::from(
                ErrorKind::ForUpdateNotAllowedInDistinctOrGroupedSelect,
            ));
        }

        if !self.distinct_on_sql.is_empty() {
            let distinct_on_sql = self.distinct_on_sql.clone();
            let mut unresolved: Option<String> = None;
            let resolution = resolve_group_by(&distinct_on_sql, select_list, &equals_identifiers, |sql| {
                unresolved.get_or_insert_with(|| sql.to_string());
                usize::MAX
            });
            if let Some(term) = unresolved {
                return Err(QueryError::from(ErrorKind::AmbiguousColumn(format!(
                    "DISTINCT ON term `{term}` is not in the select list"
                ))));
            }
            self.distinct_indexes = resolution.iter().map(|r| r.expression_index).collect();
        }

        if !self.group_by_sql.is_empty() {
            let group_by_sql = self.group_by_sql.clone();
            let mut unresolved: Option<String> = None;
            let resolution = resolve_group_by(&group_by_sql, select_list, &equals_identifiers, |sql| {
                unresolved.get_or_insert_with(|| sql.to_string());
                usize::MAX
            });
            if let Some(term) = unresolved {
                return Err(QueryError::from(ErrorKind::AmbiguousColumn(format!(
                    "GROUP BY term `{term}` is not in the select list"
                ))));
            }
            self.group_resolution = resolution;
        }

        self.check_init = true;
        Ok(())
    }

    /// `prepareExpressions()`: builds the materialized `SortOrder` and
    /// removes constant ORDER BY terms from it — the term stays in
    /// `expressions`, it just stops affecting the comparator. Idempotent.
    pub fn prepare_expressions(&mut self, order_by: &SortOrder) -> Result<()> {
        if self.expressions_prepared {
            return Ok(());
        }

        let mut pruned = order_by.clone();
        let mut to_remove = Vec::new();
        for (position, (column, _)) in order_by.iter().enumerate() {
            if self.expressions.get(column).is_some_and(|expr| expr.is_constant()) {
                to_remove.push(position);
            }
        }
        for position in to_remove.into_iter().rev() {
            pruned.remove(position);
        }
        self.sort_order = Some(pruned);
        self.expressions_prepared = true;
        Ok(())
    }

    /// `preparePlan()`: picks join order via `optimizer`,
    /// decides distinct-via-index, plans order elimination, and detects
    /// group-sorted eligibility. Idempotent via a cached `PlanFingerprint`.
    pub fn prepare_plan(
        &mut self,
        database: &impl Database,
        optimizer: &impl Optimizer,
        join_edges: &[(usize, usize)],
        top_filter_candidate_indexes: &[CandidateIndex],
        top_filter_columns: &[Option<usize>],
        top_filter_row_id_index_name: Option<&str>,
        distinct_column_selectivity: Option<f64>,
    ) -> Result<PlanFingerprint> {
        let fingerprint = self.compute_fingerprint();
        if self.prepared {
            return Ok(self.fingerprint.unwrap_or(fingerprint));
        }

        let candidates: Vec<JoinCandidate> = self
            .filters
            .iter()
            .map(|f| JoinCandidate {
                alias: f.table_alias().to_string(),
                approximate_row_count: f.table().approximate_row_count(),
            })
            .collect();

        // Join order/access choice is consumed by `explain()`; this core
        // does not yet execute a multi-filter nested-loop join (see the
        // module scope note), so the result itself is discarded here.
        let _optimized = optimizer.optimize(&candidates, join_edges)?;

        let is_single_filter = self.filters.len() == 1;
        self.mode_flags.is_distinct_query = distinct_via_index_eligible(
            is_single_filter,
            self.visible_column_count,
            self.where_condition.is_some(),
            self.distinct,
            distinct_column_selectivity,
            database.distinct_via_index_selectivity_threshold(),
        );

        if let Some(order) = &self.sort_order {
            let mut chosen = plan_index_sort(order, top_filter_columns, top_filter_candidate_indexes);
            if let Some(candidate) = &chosen {
                let satisfies_row_id = self.for_update.is_none()
                    || top_filter_row_id_index_name.is_some_and(|rid| rid == candidate.index_name);
                if !satisfies_row_id {
                    chosen = None;
                }
            }
            self.index_sort = chosen;
        }

        self.mode_flags.is_group_query = !self.group_by_sql.is_empty();
        if self.mode_flags.is_group_query {
            self.mode_flags.is_group_sorted_query = self
                .index_sort
                .as_ref()
                .is_some_and(|sort| sort.sorted_columns >= self.group_by_sql.len());
        }

        self.prepared = true;
        self.fingerprint = Some(fingerprint);
        Ok(fingerprint)
    }

    fn compute_fingerprint(&self) -> PlanFingerprint {
        let mut signature = String::new();
        for expr in &self.expressions {
            signature.push_str(&expr.sql());
            signature.push(';');
        }
        signature.push_str(&format!(
            "distinct={} distinct_on={:?} group={:?} with_ties={} fetch_percent={}",
            self.distinct, self.distinct_on_sql, self.group_by_sql, self.with_ties, self.fetch_percent
        ));
        PlanFingerprint::of(&signature)
    }

    #[must_use]
    pub fn explain(&self) -> ExplainPlan {
        let filters = self
            .filters
            .iter()
            .map(|f| ExplainFilter {
                alias: f.table_alias().to_string(),
                access: f.index().map_or(AccessKind::FullScan, |idx| AccessKind::Index {
                    name: idx.name().to_string(),
                    reverse: false,
                }),
            })
            .collect();

        let order_eliminated = self
            .sort_order
            .as_ref()
            .is_some_and(|o| self.index_sort.as_ref().is_some_and(|s| s.is_fully_sorted(o.len())));

        ExplainPlan::new(
            filters,
            order_eliminated,
            exec::select_mode(self.mode_flags),
            self.mode_flags.is_distinct_query,
        )
    }

    fn max_modification_id(&self) -> u64 {
        self.filters.iter().map(|f| f.table().max_data_modification_id()).max().unwrap_or(0)
    }

    /// Apply OFFSET/FETCH/WITH TIES, then (when enabled) store `rows` in
    /// the result cache, matching every `query_*` method's finishing step.
    fn finish_and_cache<S: Session>(
        &mut self,
        session: &mut S,
        parameters: &[Option<Value>],
        limit: Option<u64>,
        statement_mod_id: u64,
        rows: Vec<Row>,
    ) -> Result<Vec<Row>> {
        let total_rows = Some(rows.len() as u64);
        let resolved = resolve_offset_fetch(
            self.offset.as_deref(),
            self.fetch.as_deref(),
            self.fetch_percent,
            self.with_ties,
            total_rows,
        )?;
        // Pre-skip accounting (quick offset) is future work for the
        // single-filter producers above, which currently always pass
        // quick_offset=0; this step applies the full offset against the
        // already-filtered row set regardless.
        let sorted_prefix_len = self.index_sort.as_ref().map(|s| s.sorted_columns);
        let finished = exec::finish::finish(&rows, 0, resolved, self.sort_order.as_ref(), sorted_prefix_len);

        if session.database().optimize_reuse_results() {
            self.cache.store(
                parameters.to_vec(),
                finished.clone(),
                self.max_modification_id(),
                statement_mod_id,
                limit,
            );
        }
        Ok(finished)
    }

    /// `query(limit)` for `Flat`/`DistinctViaIndex` modes: the only modes
    /// needing no external aggregation/window collaborator. Consults the
    /// result cache first.
    pub fn query<S: Session>(&mut self, session: &mut S, parameters: &[Option<Value>], limit: Option<u64>) -> Result<Vec<Row>> {
        let mode = exec::select_mode(self.mode_flags);
        if !matches!(mode, ExecutionMode::Flat | ExecutionMode::DistinctViaIndex) {
            return Err(QueryError::from(ErrorKind::FeatureNotSupported(
                "this execution mode requires query_grouped/query_windowed/query_quick_aggregate".into(),
            )));
        }

        let statement_mod_id = session.statement_modification_data_id();
        if session.database().optimize_reuse_results() {
            if let Some(hit) = self.cache.try_get(parameters, limit, statement_mod_id) {
                return Ok(hit);
            }
        }

        if self.filters.len() != 1 {
            return Err(QueryError::from(ErrorKind::FeatureNotSupported(
                "multi-filter join execution is not wired in this core".into(),
            )));
        }

        let Self {
            filters,
            expressions,
            where_condition,
            for_update,
            ..
        } = self;
        let filter = &mut filters[0];
        let where_ref = where_condition.as_deref();
        let project = |row: &Row| project_row(expressions, row);

        let mut rows = match mode {
            ExecutionMode::Flat => exec::flat::run_flat(filter, where_ref, &project, *for_update, 0, 0)?.rows,
            ExecutionMode::DistinctViaIndex => {
                let flat = exec::flat::run_flat(filter, where_ref, &project, None, 0, 0)?;
                exec::distinct::run_distinct_via_index(flat.rows.into_iter(), 0, 0, None, false).rows
            }
            _ => unreachable!("checked above"),
        };

        // DISTINCT ON relies on the caller having sorted `rows` by
        // `ORDER BY` already (its own columns first): first-occurrence per
        // key is what makes the tiebreaker deterministic.
        if !self.distinct_indexes.is_empty() {
            rows = exec::distinct::run_distinct_on(rows.into_iter(), &self.distinct_indexes);
        }

        self.finish_and_cache(session, parameters, limit, statement_mod_id, rows)
    }

    /// `query_grouped` for `Group { sorted, .. }` mode: requires a
    /// caller-supplied `SelectGroups` cursor, since group aggregation
    /// math is external.
    pub fn query_grouped<S: Session, G: SelectGroups>(
        &mut self,
        session: &mut S,
        parameters: &[Option<Value>],
        limit: Option<u64>,
        groups: &mut G,
    ) -> Result<Vec<Row>> {
        let mode = exec::select_mode(self.mode_flags);
        let ExecutionMode::Group { sorted } = mode else {
            return Err(QueryError::from(ErrorKind::FeatureNotSupported(
                "query_grouped called but the resolved execution mode is not Group".into(),
            )));
        };

        let statement_mod_id = session.statement_modification_data_id();
        if session.database().optimize_reuse_results() {
            if let Some(hit) = self.cache.try_get(parameters, limit, statement_mod_id) {
                return Ok(hit);
            }
        }

        if self.filters.len() != 1 {
            return Err(QueryError::from(ErrorKind::FeatureNotSupported(
                "multi-filter join execution is not wired in this core".into(),
            )));
        }

        let Self {
            filters,
            expressions,
            where_condition,
            having,
            qualify,
            group_resolution,
            ..
        } = self;
        let filter = &mut filters[0];
        let where_ref = where_condition.as_deref();
        let having_ref = having.as_deref();
        let qualify_ref = qualify.as_deref();
        let key_of = |row: &Row| group_key(expressions, group_resolution, row);

        let flat = exec::flat::run_flat(filter, where_ref, &|row| Ok(row.clone()), None, 0, 0)?;

        let copies: Vec<Option<usize>> = group_resolution.iter().map(|g| g.copy_of).collect();
        let rows = if sorted {
            exec::group_sorted::run_group_sorted(flat.rows.into_iter(), key_of, &copies, groups, having_ref, qualify_ref, 0)?.rows
        } else {
            exec::group_hashed::run_group_hashed(flat.rows.into_iter(), key_of, groups, having_ref, qualify_ref, 0)?.rows
        };

        self.finish_and_cache(session, parameters, limit, statement_mod_id, rows)
    }

    /// `query_windowed` for `Window { .. }` mode: `apply_windows` is the
    /// external window-function runtime; `group_having` is required only
    /// when `group_and_window` is true.
    pub fn query_windowed<S: Session>(
        &mut self,
        session: &mut S,
        parameters: &[Option<Value>],
        limit: Option<u64>,
        apply_windows: &dyn Fn(&[Row]) -> Result<Vec<Row>>,
        group_having: Option<&dyn Fn(&[Row]) -> Result<bool>>,
    ) -> Result<Vec<Row>> {
        let mode = exec::select_mode(self.mode_flags);
        let ExecutionMode::Window { group_and_window } = mode else {
            return Err(QueryError::from(ErrorKind::FeatureNotSupported(
                "query_windowed called but the resolved execution mode is not Window".into(),
            )));
        };

        let statement_mod_id = session.statement_modification_data_id();
        if session.database().optimize_reuse_results() {
            if let Some(hit) = self.cache.try_get(parameters, limit, statement_mod_id) {
                return Ok(hit);
            }
        }

        if self.filters.len() != 1 {
            return Err(QueryError::from(ErrorKind::FeatureNotSupported(
                "multi-filter join execution is not wired in this core".into(),
            )));
        }

        let Self {
            filters,
            expressions,
            where_condition,
            qualify,
            group_resolution,
            ..
        } = self;
        let filter = &mut filters[0];
        let where_ref = where_condition.as_deref();
        let qualify_ref = qualify.as_deref();

        let flat = exec::flat::run_flat(filter, where_ref, &|row| Ok(row.clone()), None, 0, 0)?;

        let rows = if group_and_window {
            let group_having = group_having.ok_or_else(|| {
                QueryError::from(ErrorKind::FeatureNotSupported(
                    "group+window mode requires a group_having collaborator".into(),
                ))
            })?;
            let key_of = |row: &Row| group_key(expressions, group_resolution, row);
            exec::window::run_window_group(flat.rows, &key_of, group_having, apply_windows, qualify_ref)?
        } else {
            exec::window::run_window_plain(flat.rows, apply_windows, qualify_ref)?
        };

        self.finish_and_cache(session, parameters, limit, statement_mod_id, rows)
    }

    /// `query_quick_aggregate` for `QuickAggregate` mode: bypasses
    /// OFFSET/FETCH/caching entirely, since it always produces exactly
    /// one row computed from index metadata rather than a scan.
    pub fn query_quick_aggregate(&self, specs: &[QuickAggregateKind], source: &impl QuickAggregateSource) -> Result<Row> {
        let mode = exec::select_mode(self.mode_flags);
        if mode != ExecutionMode::QuickAggregate {
            return Err(QueryError::from(ErrorKind::FeatureNotSupported(
                "query_quick_aggregate called but the resolved execution mode is not QuickAggregate".into(),
            )));
        }
        run_quick_aggregate(specs, source)
    }

    /// `exists(Q) = (query(Q, 1).next() == true)`. Only meaningful for
    /// the `Flat`/`DistinctViaIndex` modes `query()` itself covers.
    pub fn exists<S: Session>(&mut self, session: &mut S, parameters: &[Option<Value>]) -> Result<bool> {
        let statement_mod_id = session.statement_modification_data_id();
        if session.database().optimize_reuse_results() {
            if let Some(verdict) = self.cache.try_get_exists(parameters, statement_mod_id) {
                return Ok(verdict);
            }
        }
        let rows = self.query(session, parameters, Some(1))?;
        let verdict = !rows.is_empty();
        if session.database().optimize_reuse_results() {
            self.cache.store_exists(parameters.to_vec(), verdict, statement_mod_id, statement_mod_id);
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::testing::{MemDatabase, MemSession, MemTable, MemTableFilter};
    use QuickAggregateKind as QAK;

    struct ColumnRef(usize);
    impl Expression for ColumnRef {
        fn is_constant(&self) -> bool {
            false
        }
        fn evaluate(&self, row: &Row) -> Result<Value> {
            Ok(row.get(self.0).cloned().unwrap_or(Value::Null))
        }
        fn sql(&self) -> String {
            format!("col{}", self.0)
        }
    }

    fn session() -> MemSession {
        MemSession {
            database: MemDatabase {
                reuse_results: true,
                ..Default::default()
            },
            statement_mod_id: 1,
            snapshot_mod_id: 1,
            lazy: false,
            canceled: false,
        }
    }

    fn mem_table(rows: Vec<Row>) -> MemTable {
        MemTable {
            name: "t".into(),
            rows,
            row_lockable: false,
            max_modification_id: 0,
            locked_rows: std::collections::HashSet::new(),
            scan_index: 0,
        }
    }

    #[test]
    fn flat_query_runs_on_a_single_filter() {
        let table = mem_table(vec![vec![Value::Int(1), Value::Int(10)], vec![Value::Int(2), Value::Int(20)]]);
        let filter = MemTableFilter::new(table, "t");
        let expressions: Vec<Box<dyn Expression>> = vec![Box::new(ColumnRef(1))];
        let mut select = Select::new(vec![filter], expressions);
        let mut sess = session();
        let rows = select.query(&mut sess, &[], None).unwrap();
        assert_eq!(rows, vec![vec![Value::Int(10)], vec![Value::Int(20)]]);
    }

    #[test]
    fn distinct_on_keeps_one_row_per_key_from_select_list_positions() {
        // dept (0), name (1), salary (2) — already ordered by dept, salary.
        let table = mem_table(vec![
            vec![Value::Text("e".into()), Value::Text("B".into()), Value::Int(90)],
            vec![Value::Text("e".into()), Value::Text("A".into()), Value::Int(100)],
            vec![Value::Text("s".into()), Value::Text("C".into()), Value::Int(80)],
            vec![Value::Text("s".into()), Value::Text("D".into()), Value::Int(80)],
        ]);
        let filter = MemTableFilter::new(table, "users");
        let expressions: Vec<Box<dyn Expression>> = vec![Box::new(ColumnRef(0)), Box::new(ColumnRef(1))];
        let mut select = Select::new(vec![filter], expressions);
        select.distinct_indexes = vec![0];
        let mut sess = session();
        let rows = select.query(&mut sess, &[], None).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Value::Text("e".into()), Value::Text("B".into())],
                vec![Value::Text("s".into()), Value::Text("C".into())],
            ]
        );
    }

    #[test]
    fn init_resolves_distinct_on_sql_against_the_select_list() {
        let table = mem_table(vec![]);
        let filter = MemTableFilter::new(table, "users");
        let expressions: Vec<Box<dyn Expression>> = vec![Box::new(ColumnRef(0)), Box::new(ColumnRef(1))];
        let mut select = Select::new(vec![filter], expressions);
        select.distinct_on_sql = vec!["col0".to_string()];
        let select_list = vec![
            SelectListItem { alias: None, sql: "col0".into() },
            SelectListItem { alias: None, sql: "col1".into() },
        ];
        select.init(1000, &select_list, |a, b| a == b).unwrap();
        assert_eq!(select.distinct_indexes, vec![0]);
    }

    #[test]
    fn init_rejects_distinct_on_term_outside_the_select_list() {
        let table = mem_table(vec![]);
        let filter = MemTableFilter::new(table, "users");
        let expressions: Vec<Box<dyn Expression>> = vec![Box::new(ColumnRef(0))];
        let mut select = Select::new(vec![filter], expressions);
        select.distinct_on_sql = vec!["missing".to_string()];
        let select_list = vec![SelectListItem { alias: None, sql: "col0".into() }];
        assert!(select.init(1000, &select_list, |a, b| a == b).is_err());
    }

    #[test]
    fn second_query_call_hits_the_cache() {
        let table = mem_table(vec![vec![Value::Int(1)]]);
        let filter = MemTableFilter::new(table, "t");
        let expressions: Vec<Box<dyn Expression>> = vec![Box::new(ColumnRef(0))];
        let mut select = Select::new(vec![filter], expressions);
        let mut sess = session();
        let first = select.query(&mut sess, &[], None).unwrap();
        let second = select.query(&mut sess, &[], None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn exists_short_circuits_after_the_first_row() {
        let table = mem_table(vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        let filter = MemTableFilter::new(table, "t");
        let expressions: Vec<Box<dyn Expression>> = vec![Box::new(ColumnRef(0))];
        let mut select = Select::new(vec![filter], expressions);
        let mut sess = session();
        assert!(select.exists(&mut sess, &[]).unwrap());
    }

    struct FakeAggSource;
    impl QuickAggregateSource for FakeAggSource {
        fn row_count(&self) -> u64 {
            7
        }
        fn min_value(&self, _column: usize) -> Option<Value> {
            Some(Value::Int(1))
        }
        fn max_value(&self, _column: usize) -> Option<Value> {
            Some(Value::Int(9))
        }
    }

    #[test]
    fn quick_aggregate_mode_rejects_query_quick_aggregate_when_flag_unset() {
        let table = mem_table(vec![]);
        let filter = MemTableFilter::new(table, "t");
        let select: Select<MemTableFilter> = Select::new(vec![filter], vec![]);
        let specs = vec![QAK::CountStar];
        assert!(select.query_quick_aggregate(&specs, &FakeAggSource).is_err());
    }

    #[test]
    fn quick_aggregate_mode_runs_when_flag_set() {
        let table = mem_table(vec![]);
        let filter = MemTableFilter::new(table, "t");
        let mut select: Select<MemTableFilter> = Select::new(vec![filter], vec![]);
        select.mode_flags.is_quick_aggregate_query = true;
        let specs = vec![QAK::CountStar];
        let row = select.query_quick_aggregate(&specs, &FakeAggSource).unwrap();
        assert_eq!(row, vec![Value::Int(7)]);
    }

    struct StarExpr;
    impl Expression for StarExpr {
        fn is_constant(&self) -> bool {
            false
        }
        fn evaluate(&self, _row: &Row) -> Result<Value> {
            Ok(Value::Null)
        }
        fn sql(&self) -> String {
            "*".to_string()
        }
        fn as_wildcard(&self) -> Option<WildcardSpec> {
            Some(WildcardSpec::All { except: Vec::new() })
        }
    }

    #[test]
    fn init_rejects_an_unexpanded_wildcard() {
        let table = mem_table(vec![]);
        let filter = MemTableFilter::new(table, "t");
        let expressions: Vec<Box<dyn Expression>> = vec![Box::new(StarExpr)];
        let mut select = Select::new(vec![filter], expressions);
        let err = select.init(1000, &[], |a, b| a == b).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Internal(_)));
    }

    #[test]
    fn expand_wildcards_splices_expansion_in_place_then_init_succeeds() {
        let table = mem_table(vec![vec![Value::Int(1), Value::Int(2)]]);
        let filter = MemTableFilter::new(table, "t");
        let expressions: Vec<Box<dyn Expression>> = vec![Box::new(StarExpr)];
        let mut select = Select::new(vec![filter], expressions);

        select
            .expand_wildcards(1000, |a, b| a == b, |_spec| {
                Ok(vec![Box::new(ColumnRef(0)) as Box<dyn Expression>, Box::new(ColumnRef(1))])
            })
            .unwrap();
        assert_eq!(select.expressions.len(), 2);
        assert_eq!(select.visible_column_count, 2);

        select.init(1000, &[], |a, b| a == b).unwrap();
        let mut sess = session();
        let rows = select.query(&mut sess, &[], None).unwrap();
        assert_eq!(rows, vec![vec![Value::Int(1), Value::Int(2)]]);
    }

    #[test]
    fn expand_wildcards_rejects_unknown_qualified_alias() {
        let table = mem_table(vec![]);
        let filter = MemTableFilter::new(table, "t");
        struct QualifiedStar;
        impl Expression for QualifiedStar {
            fn is_constant(&self) -> bool {
                false
            }
            fn evaluate(&self, _row: &Row) -> Result<Value> {
                Ok(Value::Null)
            }
            fn sql(&self) -> String {
                "missing.*".to_string()
            }
            fn as_wildcard(&self) -> Option<WildcardSpec> {
                Some(WildcardSpec::Qualified { alias: "missing".to_string(), except: Vec::new() })
            }
        }
        let expressions: Vec<Box<dyn Expression>> = vec![Box::new(QualifiedStar)];
        let mut select = Select::new(vec![filter], expressions);

        let err = select.expand_wildcards(1000, |a, b| a == b, |_| Ok(Vec::new())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownTableAlias("missing".to_string()));
    }
}
