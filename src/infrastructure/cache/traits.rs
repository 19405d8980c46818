//! Cache backend trait definitions

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend unavailable")]
    Unavailable,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Value at {0} is not an integer")]
    NotAnInteger(String),

    #[error("Cache operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Raw key/value operations; values are already-serialized JSON strings.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn ping(&self) -> CacheResult<()>;

    // Single keys
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Delete `keys`, returning how many existed.
    async fn delete(&self, keys: &[String]) -> CacheResult<u64>;

    /// Keys matching a glob pattern (`*`, `?`).
    async fn keys_matching(&self, pattern: &str) -> CacheResult<Vec<String>>;

    // Multi-key, one round trip
    async fn get_many(&self, keys: &[String]) -> CacheResult<Vec<Option<String>>>;
    async fn set_many(&self, entries: Vec<(String, String, Duration)>) -> CacheResult<()>;

    /// Add `delta` to an integer counter, creating it at zero. `ttl` is applied
    /// only when this call created the counter.
    async fn increment_by(&self, key: &str, delta: i64, ttl: Option<Duration>) -> CacheResult<i64>;

    // Stats
    async fn key_count(&self) -> CacheResult<u64>;
    async fn memory_used(&self) -> CacheResult<Option<String>>;
}
