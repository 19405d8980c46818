//! Cache-aside layer
//!
//! [`Cache`] wraps an optional [`CacheBackend`] and never fails a request:
//! an absent or unreachable backend turns reads into misses and writes into
//! no-ops, with a warning in the log. Only the counter operations surface
//! errors.

pub mod keys;
mod memory;
mod redis_backend;
mod traits;

pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;
pub use traits::{CacheBackend, CacheError, CacheResult};

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::support::ShutdownSignal;

/// Snapshot reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub backend: &'static str,
    pub connected: bool,
    pub keys_count: u64,
    pub memory_used: Option<String>,
}

#[derive(Clone)]
pub struct Cache {
    backend: Option<Arc<dyn CacheBackend>>,
    shutdown: ShutdownSignal,
}

impl Cache {
    /// Detached writes started by [`get_or_set`](Self::get_or_set) are
    /// abandoned once `shutdown` fires.
    pub fn new(backend: Arc<dyn CacheBackend>, shutdown: ShutdownSignal) -> Self {
        Self {
            backend: Some(backend),
            shutdown,
        }
    }

    /// A cache with no backend: every read misses, every write is dropped.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map_or("none", |b| b.name())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.backend.as_ref()?;
        match backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(key, "Cache HIT");
                    Some(value)
                }
                Err(e) => {
                    warn!(key, error = %e, "Discarding unreadable cached value");
                    None
                }
            },
            Ok(None) => {
                debug!(key, "Cache MISS");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Cache GET skipped");
                None
            }
        }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Cache SET skipped: value not serializable");
                return false;
            }
        };
        match backend.set(key, raw, ttl).await {
            Ok(()) => {
                debug!(key, ttl_secs = ttl.as_secs(), "Cache SET");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Cache SET skipped");
                false
            }
        }
    }

    /// `true` when the key existed.
    pub async fn delete(&self, key: &str) -> bool {
        self.delete_keys(&[key.to_string()]).await > 0
    }

    /// Delete every key matching a glob pattern; returns how many went away.
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };
        let keys = match backend.keys_matching(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(pattern, error = %e, "Cache DEL pattern skipped");
                return 0;
            }
        };
        let deleted = self.delete_keys(&keys).await;
        debug!(pattern, deleted, "Cache DEL pattern");
        deleted
    }

    pub async fn exists(&self, key: &str) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        backend.exists(key).await.unwrap_or_else(|e| {
            warn!(key, error = %e, "Cache EXISTS failed");
            false
        })
    }

    /// Return the cached value for `key`, or run `compute`, return its value
    /// and store it in the background.
    ///
    /// Errors from `compute` are returned as-is and nothing is cached. The
    /// background write never delays the caller, and its failure is only
    /// logged.
    pub async fn get_or_set<T, E, F, Fut>(&self, key: &str, compute: F, ttl: Duration) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key).await {
            return Ok(hit);
        }

        debug!(key, "Cache miss, computing");
        let value = compute().await?;
        self.store_detached(key, &value, ttl);
        Ok(value)
    }

    fn store_detached<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(backend) = self.backend.clone() else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to cache result: value not serializable");
                return;
            }
        };
        let key = key.to_string();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    debug!(key = %key, "Cache write abandoned at shutdown");
                }
                result = backend.set(&key, raw, ttl) => {
                    if let Err(e) = result {
                        warn!(key = %key, error = %e, "Failed to cache result");
                    }
                }
            }
        });
    }

    /// Drop `keys` after the data behind them changed.
    pub async fn invalidate(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        let deleted = self.delete_keys(keys).await;
        info!(keys = ?keys, deleted, "Cache invalidated");
    }

    /// Fetch several keys in one round trip; misses and unreadable values are
    /// left out of the map.
    pub async fn get_multi<T: DeserializeOwned>(&self, keys: &[String]) -> HashMap<String, T> {
        let mut found = HashMap::new();
        let Some(backend) = self.backend.as_ref() else {
            return found;
        };
        let values = match backend.get_many(keys).await {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "Cache GET multi skipped");
                return found;
            }
        };

        for (key, raw) in keys.iter().zip(values) {
            let Some(raw) = raw else { continue };
            match serde_json::from_str(&raw) {
                Ok(value) => {
                    found.insert(key.clone(), value);
                }
                Err(e) => warn!(key = %key, error = %e, "Failed to parse cached value"),
            }
        }
        debug!(requested = keys.len(), found = found.len(), "Cache GET multi");
        found
    }

    /// Store several `(key, value, ttl)` entries in one round trip.
    pub async fn set_multi<T: Serialize>(&self, entries: &[(String, T, Duration)]) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        let mut raw_entries = Vec::with_capacity(entries.len());
        for (key, value, ttl) in entries {
            match serde_json::to_string(value) {
                Ok(raw) => raw_entries.push((key.clone(), raw, *ttl)),
                Err(e) => {
                    warn!(key = %key, error = %e, "Cache SET multi skipped: value not serializable");
                    return false;
                }
            }
        }
        let count = raw_entries.len();
        match backend.set_many(raw_entries).await {
            Ok(()) => {
                debug!(count, "Cache SET multi");
                true
            }
            Err(e) => {
                warn!(error = %e, "Cache SET multi skipped");
                false
            }
        }
    }

    /// Add `amount` to a counter. `ttl` applies when this call creates it.
    pub async fn increment(&self, key: &str, amount: i64, ttl: Option<Duration>) -> CacheResult<i64> {
        let backend = self.backend.as_ref().ok_or(CacheError::Unavailable)?;
        backend.increment_by(key, amount, ttl).await.inspect_err(|e| {
            warn!(key, error = %e, "Cache INCREMENT failed");
        })
    }

    pub async fn decrement(&self, key: &str, amount: i64) -> CacheResult<i64> {
        let backend = self.backend.as_ref().ok_or(CacheError::Unavailable)?;
        backend.increment_by(key, -amount, None).await.inspect_err(|e| {
            warn!(key, error = %e, "Cache DECREMENT failed");
        })
    }

    pub async fn is_connected(&self) -> bool {
        match self.backend.as_ref() {
            Some(backend) => backend.ping().await.is_ok(),
            None => false,
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let disconnected = CacheStats {
            backend: self.backend_name(),
            connected: false,
            keys_count: 0,
            memory_used: None,
        };
        let Some(backend) = self.backend.as_ref() else {
            return disconnected;
        };

        let keys_count = match backend.key_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Failed to get cache stats");
                return disconnected;
            }
        };
        let memory_used = backend.memory_used().await.unwrap_or(None);

        CacheStats {
            backend: backend.name(),
            connected: true,
            keys_count,
            memory_used,
        }
    }

    async fn delete_keys(&self, keys: &[String]) -> u64 {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };
        match backend.delete(keys).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(keys = ?keys, error = %e, "Cache DEL skipped");
                0
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
