//! Expiring key/value storage for source results.
//!
//! Three backends are available: Redis for deployments sharing a cache
//! across processes, an in-process moka cache, and a no-op store that
//! always misses. The backend is chosen once at startup and passed to the
//! components that need it.
use crate::config::CacheBackend;
use async_trait::async_trait;
use moka::Expiry;
use moka::sync::Cache;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    /// Used by the readiness probe.
    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

pub async fn build_cache(backend: &CacheBackend) -> Result<Arc<dyn CacheStore>, CacheError> {
    match backend {
        CacheBackend::Redis { url } => Ok(Arc::new(RedisCache::connect(url).await?)),
        CacheBackend::Memory { max_capacity } => Ok(Arc::new(MemoryCache::new(*max_capacity))),
        CacheBackend::Noop => {
            tracing::warn!("Running without a cache backend, every request queries all sources");
            Ok(Arc::new(NoopCache))
        }
    }
}

/// Always misses and discards writes.
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set_with_ttl(
        &self,
        _key: &str,
        _value: &str,
        _ttl_secs: u64,
    ) -> Result<(), CacheError> {
        Ok(())
    }
}

#[derive(Clone)]
struct MemoryEntry {
    value: String,
    ttl: Duration,
}

// Each entry carries its own time to live. Overwriting an entry restarts it.
struct PerEntryTtl;

impl Expiry<String, MemoryEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache, bounded by entry count.
pub struct MemoryCache {
    cache: Cache<String, MemoryEntry>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        MemoryCache { cache }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key).map(|entry| entry.value))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        self.cache.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                ttl: Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }
}

pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        tracing::info!("Connected to redis cache");
        Ok(RedisCache { connection })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
