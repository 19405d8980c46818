//! Retry with exponential backoff
//!
//! Classifies failures as transient (deadlock, lock wait timeout, dropped
//! connection, serialization failure, attempt timeout) or permanent, and
//! drives the attempt loop used by the transaction executor.

use std::future::Future;
use std::time::Duration;

use sea_orm::{DbErr, SqlErr};
use tracing::{info, warn};

use super::error::{TransactionError, TransactionFailure};
use crate::support::{AppError, InfraError};

/// Lower-cased fragments of driver messages that mark a transient failure.
/// Covers Postgres (`40001`, `40P01`), MySQL (1205, 1213), SQLite busy and
/// socket-level errors.
const TRANSIENT_PATTERNS: &[&str] = &[
    "deadlock",
    "lock wait timeout",
    "lock timeout",
    "could not serialize",
    "serialization failure",
    "database is locked",
    "database table is locked",
    "connection reset",
    "connection refused",
    "connection closed",
    "broken pipe",
    "econnreset",
    "etimedout",
    "pool timed out",
    "40001",
    "40p01",
];

/// Whether `err` is worth another attempt on a fresh transaction.
pub fn is_retryable(err: &AppError) -> bool {
    match err {
        AppError::Domain(_) => false,
        AppError::Infra(InfraError::Timeout(_)) => true,
        AppError::Infra(InfraError::Database(e)) => is_transient_db_error(e),
        AppError::Infra(_) => false,
    }
}

fn is_transient_db_error(e: &DbErr) -> bool {
    if matches!(
        e.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_)) | Some(SqlErr::ForeignKeyConstraintViolation(_))
    ) {
        return false;
    }

    match e {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        _ => {
            let message = e.to_string().to_lowercase();
            TRANSIENT_PATTERNS.iter().any(|p| message.contains(p))
        }
    }
}

/// Outcome of evaluating one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for `delay`, then run the whole unit of work again.
    Retry { delay: Duration },
    /// Stop and surface the failure.
    GiveUp(TransactionFailure),
}

/// Attempt ceiling plus exponential backoff (no jitter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after every further failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay after failed attempt `attempt` (1-indexed): `base × 2^(attempt-1)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    pub fn decide(&self, attempt: u32, err: &AppError) -> RetryDecision {
        if matches!(err, AppError::Domain(_)) {
            return RetryDecision::GiveUp(TransactionFailure::Rejected);
        }
        if !is_retryable(err) {
            return RetryDecision::GiveUp(TransactionFailure::Fatal);
        }
        if attempt >= self.max_attempts.max(1) {
            return RetryDecision::GiveUp(TransactionFailure::RetriesExhausted);
        }
        RetryDecision::Retry {
            delay: self.backoff_delay(attempt),
        }
    }
}

/// Run `operation` until it succeeds or `policy` gives up.
///
/// Every attempt receives its 1-indexed number and is bounded by
/// `attempt_timeout`; an elapsed attempt counts as a transient failure.
pub async fn run_with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    attempt_timeout: Duration,
    operation_name: &str,
    mut operation: F,
) -> Result<T, TransactionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;

    loop {
        metrics::counter!("db_transaction_attempts_total").increment(1);

        let outcome = match tokio::time::timeout(attempt_timeout, operation(attempt)).await {
            Ok(result) => result,
            Err(_) => Err(InfraError::Timeout(attempt_timeout).into()),
        };

        let err = match outcome {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        match policy.decide(attempt, &err) {
            RetryDecision::Retry { delay } => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Transient failure, retrying"
                );
                metrics::counter!("db_transaction_retries_total").increment(1);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            RetryDecision::GiveUp(kind) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    kind = kind.as_str(),
                    error = %err,
                    "Transaction failed"
                );
                metrics::counter!("db_transaction_failures_total", "kind" => kind.as_str())
                    .increment(1);
                return Err(TransactionError::new(kind, attempt, err));
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
