//! Error types for the domain services.
//!
//! Two-way taxonomy: `Validation` for domain-rule violations raised before
//! any persistence call, `Storage` for database failures. "Not found" is not
//! an error — lookups return `Option` and state-dependent operations return
//! `false`, and the caller must check.

use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A domain rule was violated; nothing was persisted.
    #[error("{0}")]
    Validation(String),

    /// The storage layer failed; propagated to the caller, never retried.
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl ServiceError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    /// True when the error is a domain-rule violation (vs. a storage fault).
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_passthrough() {
        let err = ServiceError::validation("Name is required");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn test_storage_wraps_db_error() {
        let err: ServiceError = DbError::Migration("boom".to_string()).into();
        assert!(!err.is_validation());
        assert!(err.to_string().contains("boom"));
    }
}
