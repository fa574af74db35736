//! HTTP status classification shared by the provider clients

use relay_core::{ProviderId, RelayError};
use reqwest::StatusCode;

/// Map a non-success status to the error taxonomy. Rate limits and server
/// errors are retryable; credential and client errors are fatal.
pub(crate) fn classify_status(provider: ProviderId, status: StatusCode) -> Option<RelayError> {
    if status.is_success() {
        return None;
    }

    Some(match status {
        StatusCode::TOO_MANY_REQUESTS => RelayError::RateLimited {
            provider: provider.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RelayError::Unauthorized {
            provider: provider.to_string(),
        },
        status if status.is_server_error() => {
            RelayError::Transient(format!("{provider} returned HTTP {status}"))
        }
        status => RelayError::InvalidArgument(format!("{provider} rejected the request: HTTP {status}")),
    })
}
