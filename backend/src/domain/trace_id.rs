//! Correlation identifiers for inbound requests.
//!
//! A caller may bring its own identifier in `X-Request-ID` or `trace-id`;
//! anything that is not a non-nil UUID is ignored and a fresh v4 UUID is
//! issued instead. The accepted identifier lives in a Tokio task-local for
//! the life of the request, so errors and log spans pick it up without being
//! handed it. Spawned tasks start outside that scope: wrap them in
//! [`TraceId::scope`] to carry the identifier across.

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

/// Response header carrying the request correlation identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Conventional request-identifier header, read on the way in and echoed on
/// the way out.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

task_local! {
    static CURRENT: TraceId;
}

/// How a request obtained its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceIdSource {
    /// Supplied by the caller and accepted.
    Inbound,
    /// Issued by this service.
    Generated,
}

impl TraceIdSource {
    /// Lowercase label used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Generated => "generated",
        }
    }
}

/// Request correlation identifier.
///
/// # Examples
/// ```
/// use route_weather::TraceId;
/// use route_weather::domain::TraceIdSource;
///
/// let (id, source) = TraceId::resolve(["not-a-uuid", "6f1c9d3e-2f4b-4a7e-9c1d-5b8a7e3f2d10"]);
/// assert_eq!(source, TraceIdSource::Inbound);
/// assert_eq!(id.to_string(), "6f1c9d3e-2f4b-4a7e-9c1d-5b8a7e3f2d10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Issue a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Accept a caller-supplied identifier.
    ///
    /// Surrounding whitespace is ignored and the nil UUID is refused.
    pub fn parse_inbound(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim())
            .ok()
            .filter(|uuid| !uuid.is_nil())
            .map(Self)
    }

    /// Take the first acceptable candidate, or issue a fresh identifier.
    pub fn resolve<'a>(candidates: impl IntoIterator<Item = &'a str>) -> (Self, TraceIdSource) {
        match candidates.into_iter().find_map(Self::parse_inbound) {
            Some(id) => (id, TraceIdSource::Inbound),
            None => (Self::generate(), TraceIdSource::Generated),
        }
    }

    /// Identifier of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with this identifier as the current one.
    pub async fn scope<Fut>(self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(self, fut).await
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
