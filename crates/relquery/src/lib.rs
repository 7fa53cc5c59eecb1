//! # relquery
//!
//! Public facade crate over [`relcore`], the embeddable relational query
//! engine's core: logical query model, join-order/access-path planner,
//! and row evaluator.
//!
//! Engine internals (the planner, the per-mode executors, the result
//! cache) live in `relcore` and are re-exported here under stable,
//! flattened paths so downstream crates depend on `relquery` alone.
//!
//! ## Crate layout
//!
//! - [`query`] — the three `Query` variants (`Select`, `SelectUnion`,
//!   `TableValueConstructor`) and their planning/execution entry points.
//! - [`external`] — the collaborator traits a caller implements
//!   (`Session`, `Database`, `Table`, `Index`, `TableFilter`,
//!   `Expression`, `SelectGroups`).
//! - [`value`] — the minimal `Value`/`Row` representation.
//! - [`prelude`] — the common imports for code that builds and runs
//!   queries against this engine.

pub use relcore::error;
pub use relcore::error::{ErrorKind, QueryError, Result};
pub use relcore::external;
pub use relcore::value;

pub mod query {
    pub use relcore::model::{ForUpdate, QueryOrderBy, SequenceOptions};
    pub use relcore::plan::{
        explain::{AccessKind, ExplainFilter, ExplainPlan},
        index_sort::{CandidateIndex, IndexSort},
        join_order::JoinCandidate,
        optimizer::{AccessChoice, Optimizer, OptimizedPlan, RuleBasedOptimizer},
        union::{GlobalConditionSides, SelectUnion},
        values::TableValueConstructor,
        wildcard::WildcardSpec,
        Select,
    };
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::error::{ErrorKind, QueryError, Result};
    pub use crate::external::{Database, Expression, Index, Session, Table, TableFilter};
    pub use crate::query::{ForUpdate, Select, SelectUnion, TableValueConstructor};
    pub use crate::value::{NullOrdering, Row, Value};
}

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
