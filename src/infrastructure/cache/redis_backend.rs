//! Redis cache backend
//!
//! One multiplexed [`ConnectionManager`] shared by every request; it
//! reconnects on its own after a dropped connection. Every command is bounded
//! by the response timeout, so a stalled server fails fast instead of hanging
//! the request that touched the cache.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::Client;
use tracing::info;

use super::traits::{CacheBackend, CacheError, CacheResult};

/// Keys fetched per SCAN round trip.
const SCAN_COUNT: usize = 200;

#[derive(Clone)]
pub struct RedisBackend {
    manager: ConnectionManager,
}

impl RedisBackend {
    /// Connect to `url`, giving up after `connect_timeout`. Commands that get
    /// no reply within `response_timeout` fail with an I/O timeout.
    pub async fn connect(
        url: &str,
        connect_timeout: Duration,
        response_timeout: Duration,
    ) -> CacheResult<Self> {
        let client = Client::open(url)?;
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(connect_timeout)
            .set_response_timeout(response_timeout);
        let manager = tokio::time::timeout(
            connect_timeout,
            ConnectionManager::new_with_config(client, config),
        )
        .await
        .map_err(|_| CacheError::Timeout(connect_timeout))??;
        info!("Redis connected");
        Ok(Self { manager })
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn();
        let count: u64 = redis::cmd("EXISTS").arg(key).query_async(&mut conn).await?;
        Ok(count > 0)
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn();
        let removed: u64 = redis::cmd("DEL").arg(keys).query_async(&mut conn).await?;
        Ok(removed)
    }

    async fn keys_matching(&self, pattern: &str) -> CacheResult<Vec<String>> {
        // SCAN instead of KEYS so a large keyspace never blocks the server.
        let mut conn = self.conn();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn get_many(&self, keys: &[String]) -> CacheResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn();
        let values: Vec<Option<String>> = redis::cmd("MGET").arg(keys).query_async(&mut conn).await?;
        Ok(values)
    }

    async fn set_many(&self, entries: Vec<(String, String, Duration)>) -> CacheResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        for (key, value, ttl) in entries {
            pipe.cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(ttl_secs(ttl))
                .ignore();
        }
        let mut conn = self.conn();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn increment_by(&self, key: &str, delta: i64, ttl: Option<Duration>) -> CacheResult<i64> {
        let mut conn = self.conn();
        let value: i64 = redis::cmd("INCRBY")
            .arg(key)
            .arg(delta)
            .query_async(&mut conn)
            .await
            .map_err(|e| match e.kind() {
                redis::ErrorKind::ResponseError => CacheError::NotAnInteger(key.to_string()),
                _ => CacheError::Redis(e),
            })?;

        // First increment created the key
        if let Some(ttl) = ttl {
            if value == delta {
                let _: () = redis::cmd("EXPIRE")
                    .arg(key)
                    .arg(ttl_secs(ttl))
                    .query_async(&mut conn)
                    .await?;
            }
        }
        Ok(value)
    }

    async fn key_count(&self) -> CacheResult<u64> {
        let mut conn = self.conn();
        let count: u64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;
        Ok(count)
    }

    async fn memory_used(&self) -> CacheResult<Option<String>> {
        let mut conn = self.conn();
        let info: String = redis::cmd("INFO").arg("memory").query_async(&mut conn).await?;
        Ok(parse_used_memory(&info))
    }
}

fn parse_used_memory(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("used_memory_human:"))
        .map(|v| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::Cache;
    use crate::support::ShutdownSignal;
    use std::sync::Arc;

    #[test]
    fn used_memory_is_read_from_info_section() {
        let info = "# Memory\r\nused_memory:1048576\r\nused_memory_human:1.00M\r\nused_memory_rss:2097152\r\n";
        assert_eq!(parse_used_memory(info).as_deref(), Some("1.00M"));
        assert_eq!(parse_used_memory("# Memory\r\n"), None);
    }

    #[test]
    fn sub_second_ttl_rounds_up_to_one_second() {
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::from_secs(300)), 300);
    }

    #[tokio::test]
    async fn connect_to_unreachable_server_fails_fast() {
        let result = RedisBackend::connect(
            "redis://127.0.0.1:1/",
            Duration::from_millis(500),
            Duration::from_millis(500),
        )
        .await;
        assert!(result.is_err());
    }

    /// Answers the connection handshake with `+OK`, then never replies to a GET.
    async fn stalling_server() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut stalled = false;
            loop {
                let n = match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                let chunk = String::from_utf8_lossy(&buf[..n]);
                if stalled || chunk.contains("\r\nGET\r\n") {
                    stalled = true;
                    continue;
                }
                let commands = chunk.split("\r\n").filter(|l| l.starts_with('*')).count();
                let reply = "+OK\r\n".repeat(commands.max(1));
                if socket.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
        });
        format!("redis://{addr}/")
    }

    #[tokio::test]
    async fn stalled_server_times_out_instead_of_hanging() {
        let url = stalling_server().await;
        let backend = RedisBackend::connect(&url, Duration::from_secs(1), Duration::from_millis(200))
            .await
            .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), backend.get("availability:lot:1")).await;

        let outcome = result.expect("cache get should give up on its own");
        assert!(outcome.is_err());

        let cache = Cache::new(Arc::new(backend), ShutdownSignal::new());
        let miss = tokio::time::timeout(
            Duration::from_secs(5),
            cache.get::<String>("availability:lot:1"),
        )
        .await
        .expect("facade read should degrade to a miss");
        assert_eq!(miss, None);
    }
}
