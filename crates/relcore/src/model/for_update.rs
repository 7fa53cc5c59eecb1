//! FOR UPDATE clause descriptor and locking-mode semantics.

///
/// ForUpdate
///
/// Canonicalized at construction: `Wait(0)` collapses to `NoWait` so
/// downstream code only ever matches one NOWAIT shape.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ForUpdate {
    Default,
    Wait { millis: u64 },
    NoWait,
    SkipLocked,
}

impl ForUpdate {
    #[must_use]
    pub const fn wait(millis: u64) -> Self {
        if millis == 0 {
            Self::NoWait
        } else {
            Self::Wait { millis }
        }
    }

    /// `timeoutMillis` sentinel encoding: DEFAULT is -1, NOWAIT is 0,
    /// SKIP LOCKED is -2, WAIT n is n.
    #[must_use]
    pub const fn timeout_millis_sentinel(self) -> i64 {
        match self {
            Self::Default => -1,
            Self::NoWait => 0,
            Self::SkipLocked => -2,
            Self::Wait { millis } => millis as i64,
        }
    }

    /// A query with this FOR UPDATE clause can never surface a
    /// user-visible lock-timeout, so callers may always retry it freely.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::SkipLocked)
    }
}
