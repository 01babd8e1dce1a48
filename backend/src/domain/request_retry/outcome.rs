//! Attempt-local classification for one outbound call.
//!
//! Every transport result lands in exactly one of four states.

use crate::domain::ports::{HttpTransportError, OutboundResponse};

use super::RetryPolicy;

#[derive(Debug)]
pub(super) enum AttemptOutcome {
    Success(OutboundResponse),
    RetryableStatus(OutboundResponse),
    RetryableFailure(HttpTransportError),
    Fatal(HttpTransportError),
}

impl AttemptOutcome {
    pub(super) fn classify(
        result: Result<OutboundResponse, HttpTransportError>,
        policy: &RetryPolicy,
    ) -> Self {
        match result {
            Ok(response) if policy.is_retryable_status(response.status) => {
                Self::RetryableStatus(response)
            }
            Ok(response) => Self::Success(response),
            Err(error) if error.is_retryable() => Self::RetryableFailure(error),
            Err(error) => Self::Fatal(error),
        }
    }

    /// Resolve the outcome once no retry budget remains.
    pub(super) fn into_final(self) -> Result<OutboundResponse, HttpTransportError> {
        match self {
            Self::Success(response) | Self::RetryableStatus(response) => Ok(response),
            Self::RetryableFailure(error) | Self::Fatal(error) => Err(error),
        }
    }
}
