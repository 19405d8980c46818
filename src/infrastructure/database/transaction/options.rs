//! Transaction options

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::retry::RetryPolicy;

/// Isolation level requested when a transaction is opened.
///
/// SQLite ignores the level (it always serializes writers); Postgres and
/// MySQL apply it per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Isolation {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl From<Isolation> for sea_orm::IsolationLevel {
    fn from(level: Isolation) -> Self {
        match level {
            Isolation::ReadUncommitted => sea_orm::IsolationLevel::ReadUncommitted,
            Isolation::ReadCommitted => sea_orm::IsolationLevel::ReadCommitted,
            Isolation::RepeatableRead => sea_orm::IsolationLevel::RepeatableRead,
            Isolation::Serializable => sea_orm::IsolationLevel::Serializable,
        }
    }
}

/// Options for one `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Maximum number of attempts, including the first one.
    pub max_retries: u32,
    /// Base delay of the exponential backoff.
    pub retry_delay: Duration,
    /// Upper bound for a single attempt.
    pub timeout: Duration,
    pub isolation_level: Isolation,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            timeout: Duration::from_millis(10_000),
            isolation_level: Isolation::ReadCommitted,
        }
    }
}

impl TransactionOptions {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_isolation(mut self, isolation_level: Isolation) -> Self {
        self.isolation_level = isolation_level;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay)
    }
}
