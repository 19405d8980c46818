//! In-memory cache backend for development and testing

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::traits::{CacheBackend, CacheError, CacheResult};

/// Writes between two sweeps of expired entries.
const SWEEP_EVERY: u64 = 256;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Process-local cache with per-key TTLs.
///
/// Can be switched offline with [`set_available`](Self::set_available); every
/// call then fails with [`CacheError::Unavailable`], like an unreachable redis.
///
/// Expired entries are dropped when read, and swept in bulk every
/// [`SWEEP_EVERY`] writes and on [`key_count`](CacheBackend::key_count).
pub struct MemoryBackend {
    entries: DashMap<String, Entry>,
    available: AtomicBool,
    writes: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            available: AtomicBool::new(true),
            writes: AtomicU64::new(0),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> CacheResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable)
        }
    }

    fn live(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let entry = self.entries.get(key)?;
        if entry.is_live(now) {
            return Some(entry.value.clone());
        }
        drop(entry);
        self.entries.remove_if(key, |_, e| !e.is_live(now));
        None
    }

    fn insert(&self, key: &str, value: String, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Some(Instant::now() + ttl),
            },
        );
        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0 {
            self.sweep_expired();
        }
    }

    fn sweep_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, e| e.is_live(now));
    }

    /// Stored entries, expired or not.
    #[cfg(test)]
    fn stored(&self) -> usize {
        self.entries.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> CacheResult<()> {
        self.check()
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        Ok(self.live(key))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.insert(key, value, ttl);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.check()?;
        Ok(self.live(key).is_some())
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        self.check()?;
        let now = Instant::now();
        let removed = keys
            .iter()
            .filter_map(|k| self.entries.remove(k))
            .filter(|(_, e)| e.is_live(now))
            .count();
        Ok(removed as u64)
    }

    async fn keys_matching(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.check()?;
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|e| e.value().is_live(now) && glob_match(pattern, e.key()))
            .map(|e| e.key().clone())
            .collect())
    }

    async fn get_many(&self, keys: &[String]) -> CacheResult<Vec<Option<String>>> {
        self.check()?;
        Ok(keys.iter().map(|k| self.live(k)).collect())
    }

    async fn set_many(&self, entries: Vec<(String, String, Duration)>) -> CacheResult<()> {
        self.check()?;
        for (key, value, ttl) in entries {
            self.insert(&key, value, ttl);
        }
        Ok(())
    }

    async fn increment_by(&self, key: &str, delta: i64, ttl: Option<Duration>) -> CacheResult<i64> {
        self.check()?;
        let now = Instant::now();
        let mut created = false;
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| {
            created = true;
            Entry {
                value: "0".to_string(),
                expires_at: None,
            }
        });
        if !entry.is_live(now) {
            created = true;
            entry.value = "0".to_string();
            entry.expires_at = None;
        }

        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| CacheError::NotAnInteger(key.to_string()))?;
        let next = current.saturating_add(delta);
        entry.value = next.to_string();
        if created {
            if let Some(ttl) = ttl {
                entry.expires_at = Some(now + ttl);
            }
        }
        Ok(next)
    }

    async fn key_count(&self) -> CacheResult<u64> {
        self.check()?;
        self.sweep_expired();
        Ok(self.entries.len() as u64)
    }

    async fn memory_used(&self) -> CacheResult<Option<String>> {
        self.check()?;
        let bytes: usize = self
            .entries
            .iter()
            .map(|e| e.key().len() + e.value().value.len())
            .sum();
        Ok(Some(format!("{:.2}K", bytes as f64 / 1024.0)))
    }
}

/// Redis-style glob: `*` any run, `?` one character.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if let Some((star, matched)) = backtrack {
            pi = star + 1;
            ti = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}
