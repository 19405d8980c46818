//! Infrastructure layer: the relational store and the cache

pub mod cache;
pub mod database;

pub use cache::{Cache, CacheBackend, MemoryBackend, RedisBackend};
pub use database::{init_database, DatabaseConfig, TransactionExecutor, TransactionOptions};
