//! Domain-level error taxonomy.

use thiserror::Error;

/// Errors raised by domain and handler logic (spec §7, handler layer).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("station not found: {0}")]
    StationNotFound(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(i32),

    #[error("station {0} already has an open transaction on connector {1}")]
    TransactionAlreadyActive(String, u32),

    #[error("station {0} is not connected")]
    StationOffline(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors raised by the persistence layer (spec §4.F, §7).
///
/// The distinction between `Transient` and `Permanent` drives retry
/// policy: transient failures (pool exhaustion, connection drop) are
/// retried with backoff by the caller; permanent failures (constraint
/// violations, bad data) are surfaced immediately.
#[derive(Debug, Error, Clone)]
pub enum RepositoryError {
    #[error("transient storage error: {0}")]
    Transient(String),

    #[error("permanent storage error: {0}")]
    Permanent(String),
}

impl RepositoryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type RepositoryResult<T> = Result<T, RepositoryError>;
