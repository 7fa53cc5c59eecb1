//! Collaborator traits. The parser/binder, storage engine, expression
//! tree, and catalog all live outside this crate; these traits are the
//! entire surface this core calls into them through. No extra methods
//! invented beyond what the planner and evaluator actually call.

use crate::direction::SortDirection;
use crate::error::Result;
use crate::value::{NullOrdering, Row, Value};

/// Monotonic counter advanced by data mutations. Used to invalidate the
/// result cache.
pub type ModificationId = u64;

///
/// Session
///

pub trait Session {
    type Database: Database;

    fn database(&self) -> &Self::Database;
    fn statement_modification_data_id(&self) -> ModificationId;
    fn snapshot_data_modification_id(&self) -> ModificationId;
    fn is_lazy_query_execution(&self) -> bool;
    fn set_lazy_query_execution(&mut self, lazy: bool);
    fn is_canceled(&self) -> bool;
    fn compare(&self, a: &Value, b: &Value) -> std::cmp::Ordering;
}

///
/// Database
///
/// The catalog root. Owns the behavior-affecting configuration flags the
/// planner and evaluator consult.
///

pub trait Database {
    fn optimize_reuse_results(&self) -> bool;
    fn optimize_insert_from_select(&self) -> bool;
    fn optimize_distinct(&self) -> bool;
    fn optimize_evaluatable_subqueries(&self) -> bool;
    fn equals_identifiers(&self, a: &str, b: &str) -> bool;
    fn default_null_ordering(&self) -> NullOrdering;
    fn max_columns(&self) -> usize;
    /// Selectivity threshold below which distinct-via-index applies,
    /// expressed as a fraction in (0, 1].
    fn distinct_via_index_selectivity_threshold(&self) -> f64;
}

///
/// Index
///
/// A single physical access path over one table.
///

pub trait Index {
    /// Column positions this index covers, in key order.
    fn index_columns(&self) -> &[usize];
    fn is_row_id_index(&self) -> bool;
    fn is_scan(&self) -> bool;
    fn is_hash(&self) -> bool;
    fn name(&self) -> &str;
    /// Fraction of distinct keys over total rows for `column`, used by the
    /// distinct-via-index decision and by the join-order picker's row
    /// count estimate.
    fn selectivity(&self, column: usize) -> f64;
    fn approximate_row_count(&self) -> u64;
}

///
/// Table
///

pub trait Table {
    fn name(&self) -> &str;
    fn is_row_lockable(&self) -> bool;
    fn max_data_modification_id(&self) -> ModificationId;
    fn get_scan_index(&self) -> usize;
    fn approximate_row_count(&self) -> u64;
    /// Attempt to lock `row` for the current session. `timeout_millis` of
    /// `None` means wait indefinitely (DEFAULT with no session timeout
    /// configured maps to `Some(session_timeout)` by the caller); `Some(0)`
    /// means NOWAIT.
    fn lock_row(&self, row: &Row, timeout_millis: Option<u64>) -> Result<LockOutcome>;
}

///
/// LockOutcome
///
/// Per-row FOR UPDATE result, modeled as an explicit enum rather than a
/// boolean plus out-parameter so the caller cannot forget to check for a
/// replaced snapshot.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LockOutcome {
    /// Lock acquired, row unchanged.
    Locked,
    /// Lock acquired, but a newer snapshot replaced the row; the caller
    /// must re-evaluate WHERE against the fresh row before emitting.
    LockedRowReplaced,
    /// Could not acquire within `timeout_millis`. What this means to the
    /// caller depends on the `ForUpdate` mode in effect (lock-timeout
    /// error, or silent skip under SKIP LOCKED) — decided by
    /// `exec::lock::apply_for_update`, not by the table itself.
    Contended,
}

///
/// TableFilter
///
/// One FROM source plus its chosen access path.
///

pub trait TableFilter {
    type Tbl: Table;
    type Idx: Index;

    fn table(&self) -> &Self::Tbl;
    fn index(&self) -> Option<&Self::Idx>;
    fn set_index(&mut self, index_name: &str, reverse: bool);
    /// Advance to the next matching row. Returns `false` at end of stream.
    fn next(&mut self) -> Result<bool>;
    fn reset(&mut self);
    fn current_row(&self) -> Option<&Row>;
    fn is_join_outer(&self) -> bool;
    fn table_alias(&self) -> &str;
}

///
/// Expression
///
/// The full expression tree is external; this trait exposes only what the
/// planner and evaluator need to call through it.
///

pub trait Expression {
    fn is_constant(&self) -> bool;
    fn evaluate(&self, row: &Row) -> Result<Value>;
    fn sql(&self) -> String;

    /// `Some` when this expression is a `*` / `t.*` / `* EXCEPT(...)`
    /// placeholder awaiting wildcard expansion (see
    /// `plan::wildcard::expand_wildcards`). `None` for every ordinary,
    /// already-concrete expression.
    fn as_wildcard(&self) -> Option<crate::plan::wildcard::WildcardSpec> {
        None
    }
}

///
/// SelectGroups
///
/// Opaque per-group aggregator state holder. The core treats it purely
/// as a cursor; aggregation math lives in the external runtime.
///

pub trait SelectGroups {
    fn reset(&mut self);
    fn reset_lazy(&mut self);
    /// Feed one qualifying source row into its group (identified by
    /// `key`). `row` is the full projected row, not just the key, so
    /// aggregate state can read whatever non-key columns it needs.
    fn next_source(&mut self, key: Row, row: &Row);
    /// Advance to the next completed group; `None` at end.
    fn next(&mut self) -> Option<Row>;
    fn next_lazy_group(&mut self, key: &Row);
    fn next_lazy_row(&mut self, row: &Row);
    fn done(&self) -> bool;
}

/// Minimal in-memory collaborator implementations for exercising the
/// engine end to end without a real parser or storage engine plugged in
/// underneath. Deterministic and small on purpose — this is test tooling,
/// not a reference storage engine.
#[cfg(any(test, feature = "test-support"))]
pub mod testing {
    use super::{Database, Index, LockOutcome, ModificationId, Session, Table, TableFilter};
    use crate::error::Result;
    use crate::value::{NullOrdering, Row};
    use std::cmp::Ordering;

    #[derive(Clone, Debug)]
    pub struct MemIndex {
        pub name: String,
        pub columns: Vec<usize>,
        pub row_id: bool,
        pub scan: bool,
        pub hash: bool,
        pub selectivity_by_column: Vec<f64>,
        pub row_count: u64,
    }

    impl Index for MemIndex {
        fn index_columns(&self) -> &[usize] {
            &self.columns
        }
        fn is_row_id_index(&self) -> bool {
            self.row_id
        }
        fn is_scan(&self) -> bool {
            self.scan
        }
        fn is_hash(&self) -> bool {
            self.hash
        }
        fn name(&self) -> &str {
            &self.name
        }
        fn selectivity(&self, column: usize) -> f64 {
            self.selectivity_by_column.get(column).copied().unwrap_or(1.0)
        }
        fn approximate_row_count(&self) -> u64 {
            self.row_count
        }
    }

    #[derive(Clone, Debug)]
    pub struct MemTable {
        pub name: String,
        pub rows: Vec<Row>,
        pub row_lockable: bool,
        pub max_modification_id: ModificationId,
        pub locked_rows: std::collections::HashSet<usize>,
        pub scan_index: usize,
    }

    impl Table for MemTable {
        fn name(&self) -> &str {
            &self.name
        }
        fn is_row_lockable(&self) -> bool {
            self.row_lockable
        }
        fn max_data_modification_id(&self) -> ModificationId {
            self.max_modification_id
        }
        fn get_scan_index(&self) -> usize {
            self.scan_index
        }
        fn approximate_row_count(&self) -> u64 {
            self.rows.len() as u64
        }
        fn lock_row(&self, row: &Row, _timeout_millis: Option<u64>) -> Result<LockOutcome> {
            let position = self.rows.iter().position(|r| r == row);
            if position.is_some_and(|p| self.locked_rows.contains(&p)) {
                Ok(LockOutcome::Contended)
            } else {
                Ok(LockOutcome::Locked)
            }
        }
    }

    pub struct MemTableFilter {
        pub table: MemTable,
        pub index: Option<MemIndex>,
        pub alias: String,
        pub outer: bool,
        cursor: Option<usize>,
        order: Vec<usize>,
    }

    impl MemTableFilter {
        #[must_use]
        pub fn new(table: MemTable, alias: impl Into<String>) -> Self {
            let order: Vec<usize> = (0..table.rows.len()).collect();
            Self {
                table,
                index: None,
                alias: alias.into(),
                outer: false,
                cursor: None,
                order,
            }
        }
    }

    impl TableFilter for MemTableFilter {
        type Tbl = MemTable;
        type Idx = MemIndex;

        fn table(&self) -> &Self::Tbl {
            &self.table
        }

        fn index(&self) -> Option<&Self::Idx> {
            self.index.as_ref()
        }

        fn set_index(&mut self, index_name: &str, reverse: bool) {
            if let Some(idx) = &self.index {
                if idx.name == index_name {
                    if reverse {
                        self.order.reverse();
                    }
                    return;
                }
            }
        }

        fn next(&mut self) -> Result<bool> {
            let next = match self.cursor {
                None => 0,
                Some(c) => c + 1,
            };
            self.cursor = Some(next);
            Ok(next < self.order.len())
        }

        fn reset(&mut self) {
            self.cursor = None;
        }

        fn current_row(&self) -> Option<&Row> {
            let c = self.cursor?;
            let idx = *self.order.get(c)?;
            self.table.rows.get(idx)
        }

        fn is_join_outer(&self) -> bool {
            self.outer
        }

        fn table_alias(&self) -> &str {
            &self.alias
        }
    }

    #[derive(Clone, Copy, Debug, Default)]
    pub struct MemDatabase {
        pub reuse_results: bool,
        pub insert_from_select: bool,
        pub distinct: bool,
        pub evaluatable_subqueries: bool,
        pub null_ordering: NullOrderingConfig,
    }

    #[derive(Clone, Copy, Debug, Default)]
    pub struct NullOrderingConfig(pub NullOrdering);

    impl Default for NullOrdering {
        fn default() -> Self {
            Self::NullsLast
        }
    }

    impl Database for MemDatabase {
        fn optimize_reuse_results(&self) -> bool {
            self.reuse_results
        }
        fn optimize_insert_from_select(&self) -> bool {
            self.insert_from_select
        }
        fn optimize_distinct(&self) -> bool {
            self.distinct
        }
        fn optimize_evaluatable_subqueries(&self) -> bool {
            self.evaluatable_subqueries
        }
        fn equals_identifiers(&self, a: &str, b: &str) -> bool {
            a.eq_ignore_ascii_case(b)
        }
        fn default_null_ordering(&self) -> NullOrdering {
            self.null_ordering.0
        }
        fn max_columns(&self) -> usize {
            1000
        }
        fn distinct_via_index_selectivity_threshold(&self) -> f64 {
            0.20
        }
    }

    pub struct MemSession {
        pub database: MemDatabase,
        pub statement_mod_id: ModificationId,
        pub snapshot_mod_id: ModificationId,
        pub lazy: bool,
        pub canceled: bool,
    }

    impl Session for MemSession {
        type Database = MemDatabase;

        fn database(&self) -> &Self::Database {
            &self.database
        }
        fn statement_modification_data_id(&self) -> ModificationId {
            self.statement_mod_id
        }
        fn snapshot_data_modification_id(&self) -> ModificationId {
            self.snapshot_mod_id
        }
        fn is_lazy_query_execution(&self) -> bool {
            self.lazy
        }
        fn set_lazy_query_execution(&mut self, lazy: bool) {
            self.lazy = lazy;
        }
        fn is_canceled(&self) -> bool {
            self.canceled
        }
        fn compare(&self, a: &crate::value::Value, b: &crate::value::Value) -> Ordering {
            crate::value::compare_values(a, b, self.database.null_ordering.0)
        }
    }
}
