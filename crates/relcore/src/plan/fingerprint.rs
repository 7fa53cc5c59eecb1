//! PlanFingerprint: a deterministic hash of a prepared logical plan,
//! used both by the result cache and by `prepare()`'s idempotency guard
//! and EXPLAIN diagnostics.

use sha2::{Digest, Sha256};

/// A deterministic, content-addressed identity for a prepared plan.
/// Computed with `Sha256` rather than `std::hash::DefaultHasher` (whose
/// algorithm is explicitly unspecified across compiler versions), so
/// fingerprints are reproducible across runs and toolchains. The digest
/// is folded into a `u64` since that's all callers (the result cache,
/// `prepare()`'s idempotency check) need as a cache/dedup key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PlanFingerprint(pub u64);

impl PlanFingerprint {
    #[must_use]
    pub fn of(signature: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"planfp:v1");
        hasher.update(signature.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(bytes))
    }
}
