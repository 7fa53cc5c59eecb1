//! Query planning: join order, access-path and index-sort selection,
//! the result cache, and the three `Query` variants (`Select`,
//! `SelectUnion`, `TableValueConstructor`) that own the planned,
//! cacheable, prepared state.

pub mod cache;
pub mod column_resolver;
pub mod explain;
pub mod fingerprint;
pub mod global_condition;
pub mod index_sort;
pub mod join_order;
pub mod optimizer;
pub mod select;
pub mod union;
pub mod values;
pub mod wildcard;

pub use cache::ResultCache;
pub use explain::ExplainPlan;
pub use fingerprint::PlanFingerprint;
pub use index_sort::IndexSort;
pub use optimizer::{Optimizer, RuleBasedOptimizer};
pub use select::Select;
pub use union::SelectUnion;
pub use values::TableValueConstructor;
pub use wildcard::WildcardSpec;
