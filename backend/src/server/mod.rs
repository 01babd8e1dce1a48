//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{LogFormat, ServerConfig, ServerSettings};
#[cfg(feature = "metrics")]
pub(crate) use metrics::build_metrics;
pub use state_builders::build_http_state;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use route_weather::Trace;
use route_weather::inbound::http::error::json_error_handler;
use route_weather::inbound::http::health::{HealthState, cache_status, live, ready};
use route_weather::inbound::http::routes::plan_routes;
use route_weather::inbound::http::state::HttpState;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cors_origin: Option<String>,
}

const CORS_MAX_AGE_SECS: usize = 600;

/// Browser access for the configured frontend: `POST` and preflight only,
/// any request header. With no origin every cross-origin request is refused.
fn build_cors(origin: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allowed_methods([Method::POST, Method::OPTIONS])
        .allow_any_header()
        .expose_headers([
            header::HeaderName::from_static(route_weather::domain::REQUEST_ID_HEADER),
            header::HeaderName::from_static(route_weather::domain::TRACE_ID_HEADER),
        ])
        .max_age(CORS_MAX_AGE_SECS);
    match origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors,
    }
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        cors_origin,
    } = deps;

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(build_cors(cors_origin.as_deref()))
        .wrap(Trace)
        .service(plan_routes)
        .service(cache_status)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server over the prepared handler state.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        cors_origin,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            cors_origin: cors_origin.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
