//! Route cache configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

use super::manager::CacheBackendKind;
use super::memory::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};

/// Configuration values selecting and sizing the route cache backend.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROUTE_CACHE")]
pub struct RouteCacheSettings {
    /// Requested backend: `memory` (default) or `redis`.
    pub backend: Option<String>,
    /// Redis connection string, required by the `redis` backend.
    pub redis_url: Option<String>,
    /// Entry lifetime in seconds.
    pub ttl_secs: Option<u64>,
    /// In-process capacity.
    pub max_entries: Option<usize>,
}

impl RouteCacheSettings {
    /// Resolve the requested backend. Unknown names fall back to memory.
    pub fn backend_kind(&self) -> CacheBackendKind {
        match self.backend.as_deref().map(str::trim) {
            None | Some("") => CacheBackendKind::Memory,
            Some(raw) => match raw.parse() {
                Ok(kind) => kind,
                Err(()) => {
                    warn!(backend = raw, "unknown route cache backend; using memory");
                    CacheBackendKind::Memory
                }
            },
        }
    }

    /// Redis URL with surrounding whitespace removed, if set and non-empty.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Entry lifetime, falling back to [`DEFAULT_TTL`].
    pub fn ttl(&self) -> Duration {
        self.ttl_secs.map_or(DEFAULT_TTL, Duration::from_secs)
    }

    /// In-process capacity, falling back to [`DEFAULT_MAX_ENTRIES`].
    pub fn max_entries(&self) -> usize {
        self.max_entries.unwrap_or(DEFAULT_MAX_ENTRIES)
    }
}
