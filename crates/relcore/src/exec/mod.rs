//! Row evaluator: the execution-mode producers plus the shared
//! OFFSET/FETCH/WITH TIES finishing path that every mode funnels
//! through.

pub mod distinct;
pub mod finish;
pub mod flat;
pub mod group_hashed;
pub mod group_sorted;
pub mod lock;
pub mod quick_aggregate;
pub mod set_ops;
pub mod values_exec;
pub mod window;

pub use lock::{apply_for_update, ForUpdateDecision};

///
/// ExecutionMode
///
/// Tagged union over the five producer families, chosen by
/// `select_mode` according to the fixed precedence order: quick-aggregate
/// ≻ window (plain or group+window) ≻ group (sorted or hashed) ≻
/// distinct-via-index ≻ flat. Making this an enum rather than a cluster of
/// booleans means an invalid combination (e.g. both quick-aggregate and
/// group-hashed) is unrepresentable.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecutionMode {
    QuickAggregate,
    Window { group_and_window: bool },
    Group { sorted: bool },
    DistinctViaIndex,
    Flat,
}

///
/// ModeFlags
///
/// The query-level booleans `select_mode` resolves into a mode. These
/// mirror `Select`'s own `is_quick_aggregate_query`/`is_window_query`/
/// `is_group_query`/`is_group_sorted_query`/`is_distinct_query` fields
/// one-to-one.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ModeFlags {
    pub is_quick_aggregate_query: bool,
    pub is_window_query: bool,
    pub is_group_query: bool,
    pub is_group_sorted_query: bool,
    pub is_distinct_query: bool,
}

#[must_use]
pub const fn select_mode(flags: ModeFlags) -> ExecutionMode {
    if flags.is_quick_aggregate_query {
        return ExecutionMode::QuickAggregate;
    }
    if flags.is_window_query {
        return ExecutionMode::Window {
            group_and_window: flags.is_group_query,
        };
    }
    if flags.is_group_query {
        return ExecutionMode::Group {
            sorted: flags.is_group_sorted_query,
        };
    }
    if flags.is_distinct_query {
        return ExecutionMode::DistinctViaIndex;
    }
    ExecutionMode::Flat
}
