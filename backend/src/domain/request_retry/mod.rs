//! Bounded retry around single outbound HTTP calls.
//!
//! The executor retries transient transport failures (connect, timeout,
//! network) and throttling/server statuses, sleeping for the next entry of a
//! fixed backoff schedule between attempts. The schedule length is the retry
//! budget, so a two-entry schedule allows three attempts in total.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::domain::ports::{
    HttpMethod, HttpTransport, HttpTransportError, OutboundRequest, OutboundResponse,
    RequestOptions,
};

mod outcome;

use outcome::AttemptOutcome;

/// Delays applied between attempts by default.
pub const DEFAULT_BACKOFF_SCHEDULE: [Duration; 2] =
    [Duration::from_millis(200), Duration::from_millis(500)];

/// Status codes treated as transient by default.
pub const DEFAULT_RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Async sleeping abstraction so tests can observe backoff without waiting.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    ///
    /// ```rust,no_run
    /// use async_trait::async_trait;
    /// use route_weather::domain::RetrySleeper;
    /// use std::sync::Mutex;
    /// use std::time::Duration;
    /// #[derive(Default)]
    /// struct CountingSleeper {
    ///     calls: Mutex<u32>,
    /// }
    /// #[async_trait]
    /// impl RetrySleeper for CountingSleeper {
    ///     async fn sleep(&self, _duration: Duration) {
    ///         *self.calls.lock().expect("calls mutex") += 1;
    ///     }
    /// }
    /// # async fn demo() {
    /// let sleeper = CountingSleeper::default();
    /// sleeper.sleep(Duration::from_millis(25)).await;
    /// assert_eq!(*sleeper.calls.lock().expect("calls mutex"), 1);
    /// # }
    /// ```
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Immutable retry policy: backoff schedule plus retryable statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    backoff_schedule: Vec<Duration>,
    retryable_statuses: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_SCHEDULE, DEFAULT_RETRYABLE_STATUSES)
    }
}

impl RetryPolicy {
    /// Build a policy from a backoff schedule and a set of retryable statuses.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use route_weather::domain::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new([Duration::from_millis(50)], [503]);
    /// assert_eq!(policy.max_attempts(), 2);
    /// assert!(policy.is_retryable_status(503));
    /// assert!(!policy.is_retryable_status(500));
    /// ```
    pub fn new(
        backoff_schedule: impl IntoIterator<Item = Duration>,
        retryable_statuses: impl IntoIterator<Item = u16>,
    ) -> Self {
        Self {
            backoff_schedule: backoff_schedule.into_iter().collect(),
            retryable_statuses: retryable_statuses.into_iter().collect(),
        }
    }

    /// Delays applied between consecutive attempts.
    pub fn backoff_schedule(&self) -> &[Duration] {
        &self.backoff_schedule
    }

    /// Total attempts, including the first call.
    pub fn max_attempts(&self) -> usize {
        self.backoff_schedule.len() + 1
    }

    /// Return whether `status` should be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }
}

/// Executes outbound requests with bounded retry.
///
/// The executor holds no per-call state, so one instance can be shared by
/// every upstream adapter and used concurrently.
#[derive(Clone)]
pub struct RetryingRequestExecutor {
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn RetrySleeper>,
    policy: RetryPolicy,
}

impl RetryingRequestExecutor {
    /// Build an executor with the default policy and a Tokio sleeper.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_runtime(transport, Arc::new(TokioSleeper), RetryPolicy::default())
    }

    /// Build an executor with an injected sleeper and policy.
    pub fn with_runtime(
        transport: Arc<dyn HttpTransport>,
        sleeper: Arc<dyn RetrySleeper>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    /// Active retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send one logical request, retrying transient failures.
    ///
    /// ```rust,ignore
    /// let response = executor
    ///     .execute(HttpMethod::Get, url, RequestOptions::default())
    ///     .await?;
    /// assert!(response.status >= 100);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable [`HttpTransportError`] immediately, or
    /// the last retryable one once the schedule is exhausted. Retryable status
    /// codes are never errors: after exhaustion the last such response is
    /// returned for the caller to interpret.
    pub async fn execute(
        &self,
        method: HttpMethod,
        url: Url,
        options: RequestOptions,
    ) -> Result<OutboundResponse, HttpTransportError> {
        let request = OutboundRequest {
            method,
            url,
            options,
        };
        let mut attempt = 0_usize;

        loop {
            let result = self.transport.send(&request).await;
            let outcome = AttemptOutcome::classify(result, &self.policy);
            let Some(delay) = self.policy.backoff_schedule.get(attempt).copied() else {
                return outcome.into_final();
            };

            match outcome {
                AttemptOutcome::Success(response) => return Ok(response),
                AttemptOutcome::Fatal(error) => return Err(error),
                AttemptOutcome::RetryableStatus(response) => {
                    debug!(
                        method = %request.method,
                        url = %request.url,
                        status = response.status,
                        attempt = attempt + 1,
                        ?delay,
                        "retrying after retryable status"
                    );
                }
                AttemptOutcome::RetryableFailure(error) => {
                    debug!(
                        method = %request.method,
                        url = %request.url,
                        %error,
                        attempt = attempt + 1,
                        ?delay,
                        "retrying after transport failure"
                    );
                }
            }

            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}
