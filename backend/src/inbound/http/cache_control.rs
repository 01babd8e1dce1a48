//! Shared cache-control policies for HTTP handlers.

/// Probe and diagnostic responses must never be cached.
pub const NO_STORE: &str = "no-store";

/// Route responses are per-query and already cached server-side.
pub const PRIVATE_NO_CACHE: &str = "private, no-cache";
