//! Driven port for issuing one outbound HTTP call.
//!
//! The domain owns the request and response shapes so retry orchestration can
//! classify failures without depending on a particular HTTP client. Adapters
//! translate client-specific errors into [`HttpTransportError`] variants; the
//! variant decides whether a retry is worthwhile.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::define_port_error;

/// HTTP methods used by upstream adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call options layered onto the method and URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub json_body: Option<Value>,
}

impl RequestOptions {
    /// Append a query parameter.
    ///
    /// # Examples
    /// ```
    /// use route_weather::domain::ports::RequestOptions;
    ///
    /// let options = RequestOptions::default()
    ///     .with_query("mode", "driving")
    ///     .with_header("Accept", "application/json");
    /// assert_eq!(options.query, vec![("mode".to_owned(), "driving".to_owned())]);
    /// ```
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Append a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_json_body(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }
}

/// One fully described outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Target URL without the option query parameters.
    pub url: Url,
    /// Query, header, and body options.
    pub options: RequestOptions,
}

/// A response received from an upstream, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    /// Numeric status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl OutboundResponse {
    /// Build a response from a status and body bytes.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Return whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HttpTransportError::Decode`] when the body is not valid JSON
    /// for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpTransportError> {
        serde_json::from_slice(&self.body)
            .map_err(|error| HttpTransportError::decode(format!("invalid JSON body: {error}")))
    }

    /// Whitespace-collapsed body prefix for log and error messages.
    pub fn body_preview(&self) -> String {
        const PREVIEW_CHAR_LIMIT: usize = 160;

        let compact = String::from_utf8_lossy(&self.body)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
        if compact.chars().count() > PREVIEW_CHAR_LIMIT {
            format!("{preview}...")
        } else {
            preview
        }
    }
}

define_port_error! {
    /// Failures raised by the transport before a usable response exists.
    pub enum HttpTransportError {
        /// The connection could not be established.
        Connect { message: String } => "connection failed: {message}",
        /// The call exceeded its deadline.
        Timeout { message: String } => "request timed out: {message}",
        /// The connection failed while sending or receiving.
        Network { message: String } => "network failure: {message}",
        /// The request could not be built or was refused by the client.
        InvalidRequest { message: String } => "invalid outbound request: {message}",
        /// The body could not be decoded.
        Decode { message: String } => "response decode failed: {message}",
    }
}

impl HttpTransportError {
    /// Return whether a retry is expected to help.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Timeout { .. } | Self::Network { .. }
        )
    }
}

/// Port for sending a single HTTP request without retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` once and return whatever status the upstream produced.
    async fn send(&self, request: &OutboundRequest) -> Result<OutboundResponse, HttpTransportError>;
}
