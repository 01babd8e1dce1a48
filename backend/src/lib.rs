//! Route-weather backend library.
//!
//! Fronts a driving-directions provider and an hourly-weather provider,
//! merges their answers into route responses, caches those responses behind a
//! switchable backend, and retries transient upstream failures.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::TraceId;
pub use middleware::Trace;
