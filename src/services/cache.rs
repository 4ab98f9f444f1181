//! Redis caching of computed estimate views.
//!
//! Estimates, tiered views and pricing responses are cached per bid with a
//! TTL. Every key carries the bid's generation; invalidation bumps the
//! generation, so a value read before a write and stored after it lands on
//! a key no reader asks for again. The cache is best-effort: Redis failures
//! are logged and requests fall through to PostgreSQL.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Redis cache client with connection pooling.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: Duration,
}

impl RedisCache {
    pub async fn new(redis_url: &str, default_ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!(ttl_secs = default_ttl_seconds, "Redis cache connected");

        Ok(Self {
            conn,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        })
    }

    /// Get a value from cache. Misses, errors and stale shapes all read as `None`.
    #[instrument(skip(self), fields(cache_hit))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();

        let hit = match conn.get::<_, Option<String>>(key).await {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cached value");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Redis get failed");
                None
            }
        };
        tracing::Span::current().record("cache_hit", hit.is_some());
        hit
    }

    /// Store a value with the default TTL, logging rather than failing.
    #[instrument(skip(self, value))]
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.set_with_ttl(key, value, self.default_ttl).await {
            warn!(key, error = %e, "Failed to cache value");
        }
    }

    async fn set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();

        let data = serde_json::to_string(value).context("Failed to serialize value for cache")?;

        conn.set_ex::<_, _, ()>(key, data, ttl.as_secs())
            .await
            .context("Failed to set cache value")?;

        debug!(key, ttl_secs = ttl.as_secs(), "Cached value");
        Ok(())
    }

    /// Current cache generation of a bid. `None` when Redis cannot be read,
    /// in which case the caller skips the cache.
    pub async fn bid_generation(&self, bid_id: Uuid) -> Option<u64> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<u64>>(keys::generation(bid_id)).await {
            Ok(generation) => Some(generation.unwrap_or(0)),
            Err(e) => {
                warn!(%bid_id, error = %e, "Redis generation read failed");
                None
            }
        }
    }

    /// Key of one cached view of a bid at its current generation.
    ///
    /// Resolve the key before reading PostgreSQL so a concurrent
    /// invalidation retires it.
    pub async fn bid_key(&self, bid_id: Uuid, view: fn(Uuid, u64) -> String) -> Option<String> {
        self.bid_generation(bid_id)
            .await
            .map(|generation| view(bid_id, generation))
    }

    /// Retire every cached view of one bid. Entries of older generations
    /// expire with their TTL.
    #[instrument(skip(self))]
    pub async fn invalidate_bid(&self, bid_id: Uuid) {
        let mut conn = self.conn.clone();

        match conn.incr::<_, _, u64>(keys::generation(bid_id), 1).await {
            Ok(generation) => debug!(%bid_id, generation, "Invalidated bid cache"),
            Err(e) => warn!(%bid_id, error = %e, "Failed to invalidate bid cache"),
        }
    }

    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis health check failed")?;
        Ok(())
    }
}

/// Cache key builders for consistent key formats.
pub mod keys {
    use uuid::Uuid;

    /// Counter bumped on every invalidation of the bid
    pub fn generation(bid_id: Uuid) -> String {
        format!("bid:generation:{}", bid_id)
    }

    pub fn estimate(bid_id: Uuid, generation: u64) -> String {
        format!("estimate:bid:{}:g{}", bid_id, generation)
    }

    pub fn tiered_estimate(bid_id: Uuid, generation: u64) -> String {
        format!("estimate:tiered:bid:{}:g{}", bid_id, generation)
    }

    pub fn pricing(bid_id: Uuid, generation: u64) -> String {
        format!("pricing:bid:{}:g{}", bid_id, generation)
    }
}
