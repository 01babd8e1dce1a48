//! Redis-backed route cache.
//!
//! Payloads are stored as JSON documents under `route:v1:<key>` with a
//! per-entry expiry (`SETEX`). A stored value that no longer decodes is
//! treated as a miss so a schema change never turns into request failures.

use std::marker::PhantomData;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::{self, AsyncCommands};
use bb8_redis::RedisConnectionManager;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::ports::{RouteCache, RouteCacheError, RouteCacheKey};

/// Namespace prepended to every stored key.
pub const REDIS_KEY_PREFIX: &str = "route:v1:";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(1);

/// Shared [`RouteCache`] backed by a Redis connection pool.
pub struct RedisRouteCache<P> {
    pool: Mutex<Option<Pool<RedisConnectionManager>>>,
    ttl_secs: u64,
    _plan: PhantomData<fn() -> P>,
}

impl<P> RedisRouteCache<P> {
    /// Build a pool for `url`. No connection is opened until first use.
    ///
    /// # Errors
    ///
    /// Returns [`RouteCacheError::Backend`] when the URL is not a valid Redis
    /// connection string or the pool cannot be built.
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, RouteCacheError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|error| RouteCacheError::backend(format!("invalid redis url: {error}")))?;
        let pool = Pool::builder()
            .connection_timeout(CONNECT_TIMEOUT)
            .build(manager)
            .await
            .map_err(|error| RouteCacheError::backend(format!("redis pool build failed: {error}")))?;
        Ok(Self {
            pool: Mutex::new(Some(pool)),
            ttl_secs: ttl.as_secs().max(1),
            _plan: PhantomData,
        })
    }

    /// Round-trip a `PING` to prove the server is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`RouteCacheError::Backend`] when no connection can be made or
    /// the server does not answer in time.
    pub async fn ping(&self) -> Result<(), RouteCacheError> {
        let pool = self.pool()?;
        let mut conn = checkout(&pool).await?;
        let reply: String =
            with_timeout("PING", redis::cmd("PING").query_async(&mut *conn)).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(RouteCacheError::backend(format!("unexpected PING reply: {reply}")))
        }
    }

    fn pool(&self) -> Result<Pool<RedisConnectionManager>, RouteCacheError> {
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| RouteCacheError::backend("redis route cache is closed"))
    }
}

fn storage_key(key: &RouteCacheKey) -> String {
    format!("{REDIS_KEY_PREFIX}{key}")
}

async fn checkout(
    pool: &Pool<RedisConnectionManager>,
) -> Result<PooledConnection<'_, RedisConnectionManager>, RouteCacheError> {
    pool.get()
        .await
        .map_err(|error| RouteCacheError::backend(format!("redis connection failed: {error}")))
}

async fn with_timeout<T>(
    command: &str,
    fut: impl Future<Output = redis::RedisResult<T>>,
) -> Result<T, RouteCacheError> {
    match tokio::time::timeout(COMMAND_TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(RouteCacheError::backend(format!(
            "redis {command} failed: {error}"
        ))),
        Err(_) => Err(RouteCacheError::backend(format!(
            "redis {command} timed out after {COMMAND_TIMEOUT:?}"
        ))),
    }
}

/// Encode a payload as the JSON document stored in Redis.
pub(crate) fn encode_payload<P: Serialize>(plan: &P) -> Result<String, RouteCacheError> {
    serde_json::to_string(plan).map_err(|error| RouteCacheError::serialization(error.to_string()))
}

/// Decode a stored document, logging and discarding anything unreadable.
pub(crate) fn decode_payload<P: DeserializeOwned>(key: &RouteCacheKey, raw: &str) -> Option<P> {
    match serde_json::from_str(raw) {
        Ok(plan) => Some(plan),
        Err(error) => {
            warn!(%key, %error, "failed to decode cached route payload; treating as miss");
            None
        }
    }
}

#[async_trait]
impl<P> RouteCache for RedisRouteCache<P>
where
    P: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    type Plan = P;

    async fn get(&self, key: &RouteCacheKey) -> Result<Option<P>, RouteCacheError> {
        let pool = self.pool()?;
        let mut conn = checkout(&pool).await?;
        let raw: Option<String> = with_timeout("GET", conn.get(storage_key(key))).await?;
        Ok(raw.and_then(|raw| decode_payload(key, &raw)))
    }

    async fn put(&self, key: &RouteCacheKey, plan: &P) -> Result<(), RouteCacheError> {
        let payload = encode_payload(plan)?;
        let pool = self.pool()?;
        let mut conn = checkout(&pool).await?;
        with_timeout::<()>(
            "SETEX",
            conn.set_ex(storage_key(key), payload, self.ttl_secs),
        )
        .await
    }

    async fn clear(&self) -> Result<(), RouteCacheError> {
        let pool = self.pool()?;
        let mut conn = checkout(&pool).await?;
        with_timeout::<()>("FLUSHDB", redis::cmd("FLUSHDB").query_async(&mut *conn)).await
    }

    async fn close(&self) -> Result<(), RouteCacheError> {
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
