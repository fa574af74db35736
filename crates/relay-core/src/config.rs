//! Runtime configuration for the tool-routing layer
//!
//! Read once at process start into an immutable record; there is no
//! hot-reload. The Alpha Vantage key is the only hard requirement - without
//! it none of the financial-data tools can work, so startup fails fast.

use crate::error::{RelayError, Result};
use crate::record::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for the dispatcher, cache, rate limiting and providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Alpha Vantage API key (required)
    pub alpha_vantage_api_key: String,

    /// Perplexity API key; the research tool is unavailable without it
    pub perplexity_api_key: Option<String>,

    /// Perplexity Sonar model identifier
    pub research_model: String,

    /// Cache TTL for quote and series data
    pub cache_ttl_realtime: Duration,

    /// Cache TTL for overview and statement data
    pub cache_ttl_fundamentals: Duration,

    /// Cache TTL for news data
    pub cache_ttl_news: Duration,

    /// Minimum spacing between Alpha Vantage calls
    pub alpha_vantage_min_interval: Duration,

    /// Minimum spacing between Perplexity calls
    pub perplexity_min_interval: Duration,

    /// Maximum attempt count for retryable provider failures
    pub max_retries: u32,

    /// Initial backoff duration between retries
    pub retry_backoff_base: Duration,

    /// Backoff ceiling
    pub retry_backoff_max: Duration,

    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl RelayConfig {
    /// Create a new configuration builder
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::default()
    }

    /// Load configuration from process environment variables.
    ///
    /// Recognized variables: `ALPHA_VANTAGE_API_KEY` (required),
    /// `PERPLEXITY_API_KEY`, `PERPLEXITY_MODEL`, `RELAY_CACHE_TTL_SECS`
    /// (fundamentals tier), `RELAY_MIN_CALL_INTERVAL_MS` (Alpha Vantage).
    pub fn from_env() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = Self::builder();

        let api_key = get("ALPHA_VANTAGE_API_KEY").ok_or_else(|| {
            RelayError::Config("ALPHA_VANTAGE_API_KEY environment variable not set".to_string())
        })?;
        builder = builder.alpha_vantage_api_key(api_key);

        if let Some(key) = get("PERPLEXITY_API_KEY") {
            builder = builder.perplexity_api_key(key);
        }
        if let Some(model) = get("PERPLEXITY_MODEL") {
            builder = builder.research_model(model);
        }
        if let Some(secs) = get("RELAY_CACHE_TTL_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                RelayError::Config(format!("RELAY_CACHE_TTL_SECS is not a number: {secs}"))
            })?;
            builder = builder.cache_ttl_fundamentals(Duration::from_secs(secs));
        }
        if let Some(millis) = get("RELAY_MIN_CALL_INTERVAL_MS") {
            let millis: u64 = millis.parse().map_err(|_| {
                RelayError::Config(format!("RELAY_MIN_CALL_INTERVAL_MS is not a number: {millis}"))
            })?;
            builder = builder.alpha_vantage_min_interval(Duration::from_millis(millis));
        }

        builder.build()
    }

    /// Minimum call spacing for a provider
    pub fn min_interval(&self, provider: ProviderId) -> Duration {
        match provider {
            ProviderId::AlphaVantage => self.alpha_vantage_min_interval,
            ProviderId::Perplexity => self.perplexity_min_interval,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.alpha_vantage_api_key.trim().is_empty() {
            return Err(RelayError::Config(
                "Alpha Vantage API key must not be empty".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(RelayError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.alpha_vantage_min_interval.is_zero() || self.perplexity_min_interval.is_zero() {
            return Err(RelayError::Config(
                "provider minimum call intervals must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for RelayConfig
#[derive(Debug, Default)]
pub struct RelayConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    perplexity_api_key: Option<String>,
    research_model: Option<String>,
    cache_ttl_realtime: Option<Duration>,
    cache_ttl_fundamentals: Option<Duration>,
    cache_ttl_news: Option<Duration>,
    alpha_vantage_min_interval: Option<Duration>,
    perplexity_min_interval: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    retry_backoff_max: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl RelayConfigBuilder {
    /// Set the Alpha Vantage API key (required)
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the Perplexity API key
    pub fn perplexity_api_key(mut self, key: impl Into<String>) -> Self {
        self.perplexity_api_key = Some(key.into());
        self
    }

    /// Set the Sonar model identifier
    pub fn research_model(mut self, model: impl Into<String>) -> Self {
        self.research_model = Some(model.into());
        self
    }

    /// Set cache TTL for quote and series data
    pub fn cache_ttl_realtime(mut self, duration: Duration) -> Self {
        self.cache_ttl_realtime = Some(duration);
        self
    }

    /// Set cache TTL for overview and statement data
    pub fn cache_ttl_fundamentals(mut self, duration: Duration) -> Self {
        self.cache_ttl_fundamentals = Some(duration);
        self
    }

    /// Set cache TTL for news data
    pub fn cache_ttl_news(mut self, duration: Duration) -> Self {
        self.cache_ttl_news = Some(duration);
        self
    }

    /// Set minimum spacing between Alpha Vantage calls
    pub fn alpha_vantage_min_interval(mut self, duration: Duration) -> Self {
        self.alpha_vantage_min_interval = Some(duration);
        self
    }

    /// Set minimum spacing between Perplexity calls
    pub fn perplexity_min_interval(mut self, duration: Duration) -> Self {
        self.perplexity_min_interval = Some(duration);
        self
    }

    /// Set maximum retry attempts
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set initial retry backoff duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set retry backoff ceiling
    pub fn retry_backoff_max(mut self, duration: Duration) -> Self {
        self.retry_backoff_max = Some(duration);
        self
    }

    /// Set HTTP request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<RelayConfig> {
        let config = RelayConfig {
            alpha_vantage_api_key: self.alpha_vantage_api_key.ok_or_else(|| {
                RelayError::Config("Alpha Vantage API key is required".to_string())
            })?,
            perplexity_api_key: self.perplexity_api_key,
            research_model: self.research_model.unwrap_or_else(|| "sonar".to_string()),
            cache_ttl_realtime: self.cache_ttl_realtime.unwrap_or(Duration::from_secs(60)),
            cache_ttl_fundamentals: self
                .cache_ttl_fundamentals
                .unwrap_or(Duration::from_secs(3600)),
            cache_ttl_news: self.cache_ttl_news.unwrap_or(Duration::from_secs(300)),
            // Free tier allows 5 calls per minute
            alpha_vantage_min_interval: self
                .alpha_vantage_min_interval
                .unwrap_or(Duration::from_secs(12)),
            perplexity_min_interval: self
                .perplexity_min_interval
                .unwrap_or(Duration::from_secs(1)),
            max_retries: self.max_retries.unwrap_or(3),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(Duration::from_millis(500)),
            retry_backoff_max: self.retry_backoff_max.unwrap_or(Duration::from_secs(10)),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
        };

        config.validate()?;
        Ok(config)
    }
}
