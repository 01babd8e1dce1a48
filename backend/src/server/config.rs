//! Server settings loaded via OrthoConfig, and the configuration object
//! handed to [`super::create_server`].

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable lines.
    Plain,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "plain" | "text" => Ok(Self::Plain),
            _ => Err(()),
        }
    }
}

/// Process-level settings for the HTTP server and upstream clients.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROUTE_WEATHER")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Google Maps API key used for directions lookups.
    pub google_maps_api_key: Option<String>,
    /// Whole-request timeout for upstream calls, in seconds.
    pub upstream_timeout_secs: Option<u64>,
    /// `json` (default) or `plain`.
    pub log_format: Option<String>,
    /// Browser origin allowed to call the API cross-origin.
    pub frontend_origin: Option<String>,
}

impl ServerSettings {
    /// Address to bind, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Google Maps API key, if set and non-blank.
    pub fn google_maps_api_key(&self) -> Option<&str> {
        self.google_maps_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Upstream request timeout, falling back to thirty seconds.
    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout_secs
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_UPSTREAM_TIMEOUT, Duration::from_secs)
    }

    /// Allowed cross-origin caller, if set and non-blank. Trailing slashes are
    /// dropped because browsers never send them in `Origin`.
    pub fn frontend_origin(&self) -> Option<&str> {
        self.frontend_origin
            .as_deref()
            .map(|origin| origin.trim().trim_end_matches('/'))
            .filter(|origin| !origin.is_empty())
    }

    /// Requested log format. Unknown names fall back to JSON.
    pub fn log_format(&self) -> LogFormat {
        match self.log_format.as_deref() {
            None => LogFormat::default(),
            Some(raw) => raw.parse().unwrap_or_else(|()| {
                warn!(format = raw, "unknown log format; using json");
                LogFormat::default()
            }),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cors_origin: Option<String>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration listening on `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            cors_origin: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Allow browser calls from `origin`. Without one, cross-origin
    /// requests are refused.
    #[must_use]
    pub fn with_cors_origin(mut self, origin: Option<&str>) -> Self {
        self.cors_origin = origin.map(str::to_owned);
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "read by server construction tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("route-weather")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("ROUTE_WEATHER_BIND_ADDR", None::<String>),
            ("ROUTE_WEATHER_GOOGLE_MAPS_API_KEY", None::<String>),
            ("ROUTE_WEATHER_UPSTREAM_TIMEOUT_SECS", None::<String>),
            ("ROUTE_WEATHER_LOG_FORMAT", None::<String>),
            ("ROUTE_WEATHER_FRONTEND_ORIGIN", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal parses")
        );
        assert_eq!(settings.google_maps_api_key(), None);
        assert_eq!(settings.upstream_timeout(), Duration::from_secs(30));
        assert_eq!(settings.log_format(), LogFormat::Json);
        assert_eq!(settings.frontend_origin(), None);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ROUTE_WEATHER_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "ROUTE_WEATHER_GOOGLE_MAPS_API_KEY",
                Some("abc123".to_owned()),
            ),
            ("ROUTE_WEATHER_UPSTREAM_TIMEOUT_SECS", Some("5".to_owned())),
            ("ROUTE_WEATHER_LOG_FORMAT", Some("plain".to_owned())),
            (
                "ROUTE_WEATHER_FRONTEND_ORIGIN",
                Some("https://app.example.org".to_owned()),
            ),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("override parses"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal parses")
        );
        assert_eq!(settings.google_maps_api_key(), Some("abc123"));
        assert_eq!(settings.upstream_timeout(), Duration::from_secs(5));
        assert_eq!(settings.log_format(), LogFormat::Plain);
        assert_eq!(settings.frontend_origin(), Some("https://app.example.org"));
    }

    #[rstest]
    #[case(Some("json"), LogFormat::Json)]
    #[case(Some(" PLAIN "), LogFormat::Plain)]
    #[case(Some("yaml"), LogFormat::Json)]
    #[case(None, LogFormat::Json)]
    fn log_format_names_resolve(#[case] raw: Option<&str>, #[case] expected: LogFormat) {
        let settings = ServerSettings {
            log_format: raw.map(str::to_owned),
            ..ServerSettings::default()
        };
        assert_eq!(settings.log_format(), expected);
    }

    #[test]
    fn malformed_bind_addr_is_an_error() {
        let settings = ServerSettings {
            bind_addr: Some("not-an-address".to_owned()),
            ..ServerSettings::default()
        };
        assert!(settings.bind_addr().is_err());
    }

    #[test]
    fn zero_timeout_uses_default() {
        let settings = ServerSettings {
            upstream_timeout_secs: Some(0),
            ..ServerSettings::default()
        };
        assert_eq!(settings.upstream_timeout(), DEFAULT_UPSTREAM_TIMEOUT);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let settings = ServerSettings {
            google_maps_api_key: Some("  ".to_owned()),
            ..ServerSettings::default()
        };
        assert_eq!(settings.google_maps_api_key(), None);
    }

    #[rstest]
    #[case(Some("https://app.example.org/"), Some("https://app.example.org"))]
    #[case(Some("  http://localhost:5173 "), Some("http://localhost:5173"))]
    #[case(Some(" "), None)]
    #[case(None, None)]
    fn frontend_origin_is_normalised(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let settings = ServerSettings {
            frontend_origin: raw.map(str::to_owned),
            ..ServerSettings::default()
        };
        assert_eq!(settings.frontend_origin(), expected);
    }
}
