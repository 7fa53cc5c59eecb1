//! Result cache: per-query single-slot reuse of the last result, keyed
//! by parameters and guarded by modification-id. The admission/eviction
//! policy and the process-wide hit/miss counters follow this codebase's
//! existing plan cache: `OnceLock`-guarded lazy init, `AtomicUsize`
//! counters, and a thread-local disable switch for tests.

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::OnceLock;

use crate::external::ModificationId;
use crate::value::{Row, Value};

thread_local! {
    static CACHE_DISABLED: Cell<bool> = const { Cell::new(false) };
}

/// Disable the result cache for the current thread for the duration of
/// `f`, restoring the previous setting afterward. Test-only lever for
/// exercising the uncached path deterministically.
pub fn with_cache_disabled<R>(f: impl FnOnce() -> R) -> R {
    let previous = CACHE_DISABLED.with(|flag| flag.replace(true));
    let result = f();
    CACHE_DISABLED.with(|flag| flag.set(previous));
    result
}

fn cache_enabled_here() -> bool {
    !CACHE_DISABLED.with(Cell::get)
}

fn stats_cell() -> &'static (AtomicUsize, AtomicUsize) {
    static STATS: OnceLock<(AtomicUsize, AtomicUsize)> = OnceLock::new();
    STATS.get_or_init(|| (AtomicUsize::new(0), AtomicUsize::new(0)))
}

///
/// CacheStats
///
/// Process-wide, diagnostics-only aggregate. Never consulted by cache
/// logic itself.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

#[must_use]
pub fn stats() -> CacheStats {
    let (hits, misses) = stats_cell();
    CacheStats {
        hits: hits.load(AtomicOrdering::Relaxed),
        misses: misses.load(AtomicOrdering::Relaxed),
    }
}

fn record_hit() {
    stats_cell().0.fetch_add(1, AtomicOrdering::Relaxed);
}

fn record_miss() {
    stats_cell().1.fetch_add(1, AtomicOrdering::Relaxed);
}

/// Parameter-value equality with derived-table wildcard semantics: a
/// `None` slot on either side matches anything, since derived tables may
/// carry null parameter gaps.
fn parameters_match(cached: &[Option<Value>], requested: &[Option<Value>]) -> bool {
    if cached.len() != requested.len() {
        return false;
    }
    cached.iter().zip(requested).all(|(c, r)| match (c, r) {
        (None, _) | (_, None) => true,
        (Some(a), Some(b)) => a == b,
    })
}

///
/// ResultCache
///
/// One slot, embedded in every prepared query: last parameters, last
/// result handle, last modification-id, last limit, last EXISTS verdict.
///

#[derive(Clone, Debug, Default)]
pub struct ResultCache {
    last_parameters: Option<Vec<Option<Value>>>,
    last_result: Option<Vec<Row>>,
    last_modification_id: Option<ModificationId>,
    last_limit: Option<u64>,
    last_exists: Option<(Vec<Option<Value>>, bool, ModificationId)>,
}

impl ResultCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_parameters: None,
            last_result: None,
            last_modification_id: None,
            last_limit: None,
            last_exists: None,
        }
    }

    /// Attempt a hit for `query(limit)` given the current statement
    /// modification id. On hit, returns a shallow copy of the stored rows.
    pub fn try_get(
        &self,
        parameters: &[Option<Value>],
        limit: Option<u64>,
        statement_modification_id: ModificationId,
    ) -> Option<Vec<Row>> {
        if !cache_enabled_here() {
            return None;
        }
        let cached_params = self.last_parameters.as_ref()?;
        let cached_result = self.last_result.as_ref()?;
        let cached_mod_id = self.last_modification_id?;

        if self.last_limit != limit {
            record_miss();
            return None;
        }
        if cached_mod_id > statement_modification_id {
            record_miss();
            return None;
        }
        if !parameters_match(cached_params, parameters) {
            record_miss();
            return None;
        }
        record_hit();
        Some(cached_result.clone())
    }

    /// Populate the slot after a fresh execution, unless the new result's
    /// modification id already exceeds the session's statement id — in
    /// that case the slot is silently cleared instead.
    pub fn store(
        &mut self,
        parameters: Vec<Option<Value>>,
        result: Vec<Row>,
        result_modification_id: ModificationId,
        statement_modification_id: ModificationId,
        limit: Option<u64>,
    ) {
        if result_modification_id > statement_modification_id {
            self.clear();
            return;
        }
        self.last_parameters = Some(parameters);
        self.last_result = Some(result);
        self.last_modification_id = Some(result_modification_id);
        self.last_limit = limit;
    }

    pub fn clear(&mut self) {
        self.last_parameters = None;
        self.last_result = None;
        self.last_modification_id = None;
        self.last_limit = None;
    }

    /// Separate EXISTS verdict cache with the identical admission rules.
    pub fn try_get_exists(
        &self,
        parameters: &[Option<Value>],
        statement_modification_id: ModificationId,
    ) -> Option<bool> {
        if !cache_enabled_here() {
            return None;
        }
        let (cached_params, verdict, cached_mod_id) = self.last_exists.as_ref()?;
        if *cached_mod_id > statement_modification_id {
            return None;
        }
        if !parameters_match(cached_params, parameters) {
            return None;
        }
        Some(*verdict)
    }

    pub fn store_exists(
        &mut self,
        parameters: Vec<Option<Value>>,
        verdict: bool,
        result_modification_id: ModificationId,
        statement_modification_id: ModificationId,
    ) {
        if result_modification_id > statement_modification_id {
            self.last_exists = None;
            return;
        }
        self.last_exists = Some((parameters, verdict, result_modification_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_returns_stored_rows_when_mod_id_not_advanced() {
        let mut cache = ResultCache::new();
        let params = vec![Some(Value::Int(1))];
        cache.store(params.clone(), vec![vec![Value::Int(42)]], 5, 5, Some(10));
        let hit = cache.try_get(&params, Some(10), 5);
        assert_eq!(hit, Some(vec![vec![Value::Int(42)]]));
    }

    #[test]
    fn miss_when_modification_id_regresses() {
        let mut cache = ResultCache::new();
        let params = vec![Some(Value::Int(1))];
        cache.store(params.clone(), vec![vec![Value::Int(1)]], 5, 5, None);
        assert!(cache.try_get(&params, None, 4).is_none());
    }

    #[test]
    fn wildcard_none_parameter_matches_anything() {
        let mut cache = ResultCache::new();
        cache.store(vec![None], vec![vec![Value::Int(9)]], 1, 1, None);
        assert!(cache.try_get(&[Some(Value::Int(123))], None, 1).is_some());
    }

    #[test]
    fn store_with_future_modification_id_clears_slot() {
        let mut cache = ResultCache::new();
        cache.store(vec![], vec![vec![]], 10, 1, None);
        assert!(cache.try_get(&[], None, 10).is_none());
    }

    #[test]
    fn disabling_cache_forces_miss() {
        let mut cache = ResultCache::new();
        cache.store(vec![], vec![vec![]], 1, 1, None);
        with_cache_disabled(|| {
            assert!(cache.try_get(&[], None, 1).is_none());
        });
        assert!(cache.try_get(&[], None, 1).is_some());
    }
}
