//! Transactional execution with retry
//!
//! - `options`: per-call settings (attempt ceiling, backoff base, timeout, isolation)
//! - `retry`: transient-failure classification and the backoff loop
//! - `executor`: one store transaction per attempt, plus batch and atomic helpers
//! - `error`: what the caller gets back when the executor gives up

pub mod error;
pub mod executor;
pub mod options;
pub mod retry;

pub use error::{TransactionError, TransactionFailure};
pub use executor::{tx_operation, TransactionExecutor, TxFuture, TxOperation};
pub use options::{Isolation, TransactionOptions};
pub use retry::{is_retryable, run_with_retry, RetryDecision, RetryPolicy};
