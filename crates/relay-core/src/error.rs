//! Error types for the tool-routing layer

use thiserror::Error;

/// Result type alias for routing operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors produced while dispatching a tool call.
///
/// The taxonomy splits into fatal errors, which are surfaced to the agent loop
/// immediately, and retryable errors, which the retry policy is allowed to
/// absorb up to its attempt cap. [`RelayError::is_retryable`] is the single
/// source of truth for that split.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Tool name not present in the registry
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// A tool name was registered twice
    #[error("tool already registered: {0}")]
    DuplicateTool(String),

    /// Missing or malformed request argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Provider reply is missing a promised field or carries an uncoercible value
    #[error("malformed response at `{field}`: {reason}")]
    MalformedResponse { field: String, reason: String },

    /// Provider signalled its request-rate ceiling
    #[error("rate limit exceeded for {provider}")]
    RateLimited { provider: String },

    /// Transport-level failure (connect, timeout, body decode)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Transient provider-side failure (5xx, truncated reply)
    #[error("transient provider failure: {0}")]
    Transient(String),

    /// Credentials rejected by the provider
    #[error("unauthorized by {provider}: check API key")]
    Unauthorized { provider: String },

    /// A retryable error survived every attempt
    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<RelayError>,
    },

    /// Startup configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Whether the retry policy may re-attempt after this error.
    ///
    /// Rate limits and transport failures are expected to clear on their own;
    /// everything else reflects a bug in the request or the provider contract
    /// and retrying would only burn quota.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Network(_) | Self::Transient(_)
        )
    }

    /// Shorthand for a malformed-response error at a given field path
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::UnknownTool("QUOTE".to_string());
        assert_eq!(err.to_string(), "unknown tool: QUOTE");

        let err = RelayError::malformed("Global Quote.05. price", "missing required field");
        assert_eq!(
            err.to_string(),
            "malformed response at `Global Quote.05. price`: missing required field"
        );
    }

    #[test]
    fn test_retryable_split() {
        assert!(
            RelayError::RateLimited {
                provider: "alpha_vantage".to_string()
            }
            .is_retryable()
        );
        assert!(RelayError::Transient("503".to_string()).is_retryable());

        assert!(!RelayError::UnknownTool("X".to_string()).is_retryable());
        assert!(!RelayError::InvalidArgument("empty symbol".to_string()).is_retryable());
        assert!(!RelayError::malformed("Name", "missing").is_retryable());
        assert!(
            !RelayError::Unauthorized {
                provider: "perplexity".to_string()
            }
            .is_retryable()
        );
        assert!(!RelayError::Config("no key".to_string()).is_retryable());
    }

    #[test]
    fn test_retry_exhausted_keeps_cause() {
        let err = RelayError::RetryExhausted {
            attempts: 3,
            source: Box::new(RelayError::RateLimited {
                provider: "alpha_vantage".to_string(),
            }),
        };

        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("alpha_vantage"));
        // The terminal wrapper itself is not retryable
        assert!(!err.is_retryable());
    }
}
