//! Port interface for caching computed route responses.
//!
//! Backends (in-process, Redis) implement the same contract so the cache
//! manager can swap between them at runtime.
use async_trait::async_trait;

use super::{RouteCacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum RouteCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "route cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "route cache serialisation failed: {message}",
    }
}

/// Keyed store for computed route responses with per-entry expiry.
#[async_trait]
pub trait RouteCache: Send + Sync {
    /// Domain-specific payload stored under each key.
    type Plan: Send + Sync;

    /// Read a cached payload for the given key.
    ///
    /// Returns `Ok(None)` when the key was never stored or has expired.
    async fn get(&self, key: &RouteCacheKey) -> Result<Option<Self::Plan>, RouteCacheError>;

    /// Store a payload under the supplied key, replacing any previous value.
    async fn put(&self, key: &RouteCacheKey, plan: &Self::Plan) -> Result<(), RouteCacheError>;

    /// Remove every entry held by the backend.
    async fn clear(&self) -> Result<(), RouteCacheError>;

    /// Release backend resources. The default implementation holds none.
    async fn close(&self) -> Result<(), RouteCacheError> {
        Ok(())
    }
}
