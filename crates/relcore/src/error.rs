//! Structured query-engine errors: a flat taxonomy plus optional SQL context.
//!
//! Mirrors the shape used throughout this codebase for runtime errors: one
//! classification enum, one carrier struct, `thiserror` for `Display`/`Error`.

use std::fmt;
use thiserror::Error as ThisError;

/// Marker a caller can embed in SQL text to suppress the snippet from an
/// error's user-visible rendering (e.g. because the statement carries
/// sensitive literals). Not a SQL keyword; purely a convention checked by
/// `SqlContext::new`.
const HIDE_MARKER: &str = "\u{0}--hide--";

///
/// ErrorKind
///
/// Domain error taxonomy. Four buckets: schema, value, concurrency,
/// internal. Not a stable wire format; variants may grow.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ErrorKind {
    // -- schema --
    #[error("table or view not found: {0}")]
    TableOrViewNotFound(String),
    #[error("column count does not match")]
    ColumnCountDoesNotMatch,
    #[error("order by expression not in result")]
    OrderByNotInResult,
    #[error("ambiguous column: {0}")]
    AmbiguousColumn(String),
    #[error("WITH TIES requires ORDER BY")]
    WithTiesWithoutOrderBy,
    #[error("too many columns: {found} exceeds limit {limit}")]
    TooManyColumns { found: usize, limit: usize },
    #[error("FOR UPDATE is not allowed in a DISTINCT or GROUP BY query")]
    ForUpdateNotAllowedInDistinctOrGroupedSelect,
    #[error("unknown table alias: {0}")]
    UnknownTableAlias(String),

    // -- value --
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("feature not supported: {0}")]
    FeatureNotSupported(String),
    #[error("a second primary key cannot be declared")]
    SecondPrimaryKey,

    // -- concurrency --
    #[error("lock timeout")]
    LockTimeout,
    #[error("statement canceled")]
    StatementCanceled,

    // -- internal --
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Broad bucket this variant belongs to, for callers that branch on class
    /// rather than on the specific variant (e.g. retry policy).
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::TableOrViewNotFound(_)
            | Self::ColumnCountDoesNotMatch
            | Self::OrderByNotInResult
            | Self::AmbiguousColumn(_)
            | Self::WithTiesWithoutOrderBy
            | Self::TooManyColumns { .. }
            | Self::ForUpdateNotAllowedInDistinctOrGroupedSelect
            | Self::UnknownTableAlias(_) => ErrorClass::Schema,
            Self::InvalidValue(_) | Self::FeatureNotSupported(_) | Self::SecondPrimaryKey => {
                ErrorClass::Value
            }
            Self::LockTimeout | Self::StatementCanceled => ErrorClass::Concurrency,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Schema,
    Value,
    Concurrency,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::Value => "value",
            Self::Concurrency => "concurrency",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// SqlContext
///
/// The offending statement plus the index of the problem character, for
/// syntax-like errors. Construction returns `None` when the SQL text carries
/// the hide-marker, so the snippet is never attached to the error.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SqlContext {
    pub sql: String,
    pub error_index: Option<usize>,
}

impl SqlContext {
    #[must_use]
    pub fn new(sql: impl Into<String>, error_index: Option<usize>) -> Option<Self> {
        let sql = sql.into();
        if sql.contains(HIDE_MARKER) {
            return None;
        }
        Some(Self { sql, error_index })
    }

    /// Render the statement with a caret under the offending character.
    #[must_use]
    pub fn render(&self) -> String {
        match self.error_index {
            Some(index) => {
                let caret_line = " ".repeat(index) + "^";
                format!("{}\n{caret_line}", self.sql)
            }
            None => self.sql.clone(),
        }
    }
}

///
/// QueryError
///
/// Every error this crate returns. Carries an `ErrorKind`, optional SQL
/// context, and an optional cause from a collaborator (storage, index, etc).
///

#[derive(Debug, ThisError)]
#[error("{kind}")]
pub struct QueryError {
    pub kind: ErrorKind,
    pub sql: Option<SqlContext>,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl QueryError {
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            sql: None,
            cause: None,
        }
    }

    #[must_use]
    pub fn with_sql(mut self, sql: SqlContext) -> Self {
        self.sql = Some(sql);
        self
    }

    #[must_use]
    pub fn with_cause(
        mut self,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    #[must_use]
    pub const fn is_retryable_class(&self) -> bool {
        !matches!(self.kind.class(), ErrorClass::Concurrency)
    }
}

impl From<ErrorKind> for QueryError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hide_marker_suppresses_sql_context() {
        let hidden = format!("SELECT 1{HIDE_MARKER}");
        assert!(SqlContext::new(hidden, Some(7)).is_none());
        assert!(SqlContext::new("SELECT 1", Some(7)).is_some());
    }

    #[test]
    fn render_places_caret_under_error_index() {
        let ctx = SqlContext::new("SELECT x FROM t", Some(7)).unwrap();
        let rendered = ctx.render();
        assert_eq!(rendered, "SELECT x FROM t\n       ^");
    }

    #[test]
    fn class_buckets_match_the_four_error_buckets() {
        assert_eq!(
            ErrorKind::TableOrViewNotFound("t".into()).class(),
            ErrorClass::Schema
        );
        assert_eq!(ErrorKind::InvalidValue("x".into()).class(), ErrorClass::Value);
        assert_eq!(ErrorKind::LockTimeout.class(), ErrorClass::Concurrency);
        assert_eq!(ErrorKind::Internal("x".into()).class(), ErrorClass::Internal);
    }
}
