//! Health endpoints: liveness and readiness probes for orchestrators, plus a
//! cache diagnostic reporting which backend is serving requests.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;

use crate::inbound::http::cache_control::NO_STORE;
use crate::inbound::http::state::HttpState;

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as draining so liveness checks fail during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response.insert_header((header::CACHE_CONTROL, NO_STORE)).finish()
    }
}

/// Readiness probe. 200 once the server is wired up, 503 before that.
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. 200 while alive, 503 once draining.
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Body of the cache diagnostic endpoint.
#[derive(Debug, Serialize)]
pub struct CacheStatus {
    /// Configuration name of the active backend (`memory` or `redis`).
    pub backend: &'static str,
    /// Adapter type serving the backend.
    pub adapter: &'static str,
}

/// Report the active route cache backend.
#[get("/health/cache")]
pub async fn cache_status(state: web::Data<HttpState>) -> HttpResponse {
    let kind = state.cache.backend_kind();
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, NO_STORE))
        .json(CacheStatus {
            backend: kind.as_str(),
            adapter: state.cache.backend_name(),
        })
}
