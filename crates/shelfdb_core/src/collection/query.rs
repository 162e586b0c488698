//! Record selection.

use super::record::{Record, ID_FIELD};
use crate::value::is_match;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Selects records of a list collection, or elements of an array.
///
/// Queries are evaluated by a linear scan.
#[derive(Clone, Default)]
pub enum Query {
    /// Matches everything.
    #[default]
    All,
    /// Matches values that structurally contain the pattern.
    Match(Value),
    /// Matches values for which the predicate returns true.
    Filter(Predicate),
}

impl Query {
    /// A query matching everything.
    #[must_use]
    pub const fn all() -> Self {
        Self::All
    }

    /// A structural pattern query. See [`is_match`](crate::value::is_match).
    #[must_use]
    pub fn matching(pattern: Value) -> Self {
        Self::Match(pattern)
    }

    /// A predicate query.
    pub fn filter<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Filter(Arc::new(predicate))
    }

    /// Tests a value against the query.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Match(pattern) => is_match(value, pattern),
            Self::Filter(predicate) => predicate(value),
        }
    }

    /// Tests a record against the query.
    #[must_use]
    pub fn matches_record(&self, record: &Record) -> bool {
        self.matches(record.as_value())
    }

    /// The id named by a structural pattern, if it names one.
    #[must_use]
    pub fn id_hint(&self) -> Option<u64> {
        match self {
            Self::Match(pattern) => pattern
                .get(ID_FIELD)
                .and_then(Value::as_u64)
                .filter(|id| *id != 0),
            _ => None,
        }
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Match(pattern) => f.debug_tuple("Match").field(pattern).finish(),
            Self::Filter(_) => f.write_str("Filter(..)"),
        }
    }
}

impl From<Value> for Query {
    fn from(pattern: Value) -> Self {
        Self::Match(pattern)
    }
}
