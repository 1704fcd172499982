//! Aggregation error types.
//!
//! Every fallible operation in this crate returns [`anyhow::Result`]. Failures
//! raised by the aggregators themselves are [`AggregateError`]s and can be
//! recovered with `err.downcast_ref::<AggregateError>()`; errors returned by
//! user-supplied closures are passed through untouched.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// A map-building aggregator without a merge function saw the same key twice.
    #[error("duplicate key {key} (attempted merging values {existing} and {incoming})")]
    DuplicateKey {
        key: String,
        existing: String,
        incoming: String,
    },

    #[error("aggregator has no shared accumulation path")]
    SharedAccumulationUnsupported,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

impl AggregateError {
    pub(crate) fn duplicate_key<K, V>(key: &K, existing: &V, incoming: &V) -> Self
    where
        K: std::fmt::Debug,
        V: std::fmt::Debug,
    {
        Self::DuplicateKey {
            key: format!("{key:?}"),
            existing: format!("{existing:?}"),
            incoming: format!("{incoming:?}"),
        }
    }

    /// The offending key of a [`DuplicateKey`](Self::DuplicateKey) error.
    #[must_use]
    pub fn conflicting_key(&self) -> Option<&str> {
        match self {
            Self::DuplicateKey { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_names_key_and_values() {
        let err = AggregateError::duplicate_key(&"a", &1, &2);
        assert_eq!(
            err.to_string(),
            "duplicate key \"a\" (attempted merging values 1 and 2)"
        );
        assert_eq!(err.conflicting_key(), Some("\"a\""));
    }

    #[test]
    fn survives_anyhow_roundtrip() {
        let err: anyhow::Error = AggregateError::SharedAccumulationUnsupported.into();
        assert_eq!(
            err.downcast_ref::<AggregateError>(),
            Some(&AggregateError::SharedAccumulationUnsupported)
        );
    }
}
