//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures of the subscription workflow.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Subscriber store is not connected")]
    Unavailable,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate subscriber: {0}")]
    Duplicate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors reported by a subscriber store adapter.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Store is not connected")]
    Unavailable,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Query execution failed: {0}")]
    Query(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Unavailable => DomainError::Unavailable,
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}
