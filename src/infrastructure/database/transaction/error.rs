//! Typed failure of a transaction run

use thiserror::Error;

use crate::support::{AppError, DomainError};

/// Why the executor gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionFailure {
    /// A business rule rejected the operation (spot taken, unknown id, bad input).
    /// Permanent: retrying cannot help.
    Rejected,
    /// Non-retryable store error (constraint violation, malformed query).
    Fatal,
    /// Transient failures persisted through every allowed attempt.
    RetriesExhausted,
}

impl TransactionFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::Fatal => "fatal",
            Self::RetriesExhausted => "retries_exhausted",
        }
    }
}

#[derive(Debug, Error)]
#[error("Transaction failed after {attempts} attempt(s): {cause}")]
pub struct TransactionError {
    kind: TransactionFailure,
    attempts: u32,
    #[source]
    cause: AppError,
}

impl TransactionError {
    pub fn new(kind: TransactionFailure, attempts: u32, cause: AppError) -> Self {
        Self {
            kind,
            attempts,
            cause,
        }
    }

    pub fn kind(&self) -> TransactionFailure {
        self.kind
    }

    /// Attempt number at which the executor gave up (1-indexed).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn cause(&self) -> &AppError {
        &self.cause
    }

    pub fn into_cause(self) -> AppError {
        self.cause
    }

    /// The business error behind a `Rejected` failure.
    pub fn domain_error(&self) -> Option<&DomainError> {
        match &self.cause {
            AppError::Domain(e) => Some(e),
            AppError::Infra(_) => None,
        }
    }

    /// `true` when the caller may try again later (system degraded).
    pub fn is_temporary(&self) -> bool {
        self.kind == TransactionFailure::RetriesExhausted
    }
}
