//! Backend entry-point: loads settings, wires adapters, and runs the HTTP
//! server until it is asked to stop.

mod server;

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use route_weather::domain::MultiRouteResponse;
use route_weather::domain::ports::RouteCache;
use route_weather::inbound::http::health::HealthState;
use route_weather::outbound::cache::{RouteCacheManager, RouteCacheSettings};
#[cfg(feature = "metrics")]
use server::build_metrics;
use server::{LogFormat, ServerConfig, ServerSettings, build_http_state, create_server};

const PROGRAM_NAME: &str = "route-weather";

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Settings are read from the environment and config files only.
    let settings = ServerSettings::load_from_iter([OsString::from(PROGRAM_NAME)])
        .map_err(|e| std::io::Error::other(format!("server settings: {e}")))?;
    init_tracing(settings.log_format());

    let cache_settings = RouteCacheSettings::load_from_iter([OsString::from(PROGRAM_NAME)])
        .map_err(|e| std::io::Error::other(format!("route cache settings: {e}")))?;
    let cache = Arc::new(RouteCacheManager::<MultiRouteResponse>::new());
    cache.configure(&cache_settings).await;

    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::other(format!("invalid bind address: {e}")))?;
    let cors_origin = settings
        .frontend_origin()
        .map(|origin| Url::parse(origin).map(|_| origin))
        .transpose()
        .map_err(|e| std::io::Error::other(format!("invalid frontend origin: {e}")))?;
    let http_state = web::Data::new(build_http_state(&settings, cache.clone())?);
    let health_state = web::Data::new(HealthState::new());

    let config = ServerConfig::new(bind_addr).with_cors_origin(cors_origin);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(build_metrics()?));

    let server = create_server(health_state.clone(), http_state, config)?;
    info!(%bind_addr, cache_backend = %cache.backend_kind(), "route-weather listening");

    let outcome = server.await;
    health_state.mark_unhealthy();
    if let Err(error) = cache.close().await {
        warn!(%error, "closing route cache failed");
    }
    info!("route-weather stopped");
    outcome
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Plain => builder.try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
