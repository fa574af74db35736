//! Alpha Vantage API client
//!
//! A thin wrapper over the query endpoint. Every method returns the raw JSON
//! payload; typed extraction happens downstream in the normalizer. The client
//! also detects the provider's in-band error signalling: Alpha Vantage
//! replies `200 OK` with an `"Error Message"` body for bad requests and a
//! `"Note"`/`"Information"` body when the request-rate ceiling is hit.

use crate::status::classify_status;
use relay_core::{ProviderId, RelayError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
}

impl AlphaVantageClient {
    /// Create a new client with an API key and request timeout
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Issue one query-endpoint call and surface provider-level errors
    pub async fn call(&self, function: &str, params: &[(&str, &str)]) -> Result<Value> {
        let mut query: Vec<(&str, &str)> = vec![("function", function)];
        query.extend_from_slice(params);
        query.push(("apikey", self.api_key.as_str()));

        tracing::debug!(function, "calling Alpha Vantage");
        let response = self.client.get(BASE_URL).query(&query).send().await?;

        if let Some(err) = classify_status(ProviderId::AlphaVantage, response.status()) {
            return Err(err);
        }

        let data: Value = response.json().await?;
        if let Some(err) = inspect_body(&data) {
            return Err(err);
        }

        Ok(data)
    }

    /// Company overview and fundamental ratios
    pub async fn overview(&self, symbol: &str) -> Result<Value> {
        self.call("OVERVIEW", &[("symbol", symbol)]).await
    }

    /// Annual and quarterly income statements
    pub async fn income_statement(&self, symbol: &str) -> Result<Value> {
        self.call("INCOME_STATEMENT", &[("symbol", symbol)]).await
    }

    /// Annual and quarterly balance sheets
    pub async fn balance_sheet(&self, symbol: &str) -> Result<Value> {
        self.call("BALANCE_SHEET", &[("symbol", symbol)]).await
    }

    /// Annual and quarterly cash flow statements
    pub async fn cash_flow(&self, symbol: &str) -> Result<Value> {
        self.call("CASH_FLOW", &[("symbol", symbol)]).await
    }

    /// Reported and estimated earnings per share
    pub async fn earnings(&self, symbol: &str) -> Result<Value> {
        self.call("EARNINGS", &[("symbol", symbol)]).await
    }

    /// News articles with sentiment scoring
    pub async fn news_sentiment(&self, ticker: &str, limit: i64) -> Result<Value> {
        let limit = limit.to_string();
        self.call("NEWS_SENTIMENT", &[("tickers", ticker), ("limit", &limit)])
            .await
    }

    /// Latest global quote
    pub async fn quote(&self, symbol: &str) -> Result<Value> {
        self.call("GLOBAL_QUOTE", &[("symbol", symbol)]).await
    }

    /// Intraday OHLCV series
    pub async fn intraday(&self, symbol: &str, interval: &str) -> Result<Value> {
        self.call(
            "TIME_SERIES_INTRADAY",
            &[("symbol", symbol), ("interval", interval)],
        )
        .await
    }
}

/// Alpha Vantage signals most failures in a 200 body rather than the status
/// line.
fn inspect_body(data: &Value) -> Option<RelayError> {
    if let Some(message) = data.get("Error Message").and_then(Value::as_str) {
        return Some(RelayError::InvalidArgument(message.to_string()));
    }

    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Some(RelayError::RateLimited {
            provider: ProviderId::AlphaVantage.to_string(),
        });
    }

    // Unknown symbols come back as a bare empty object
    if data.as_object().is_some_and(serde_json::Map::is_empty) {
        return Some(RelayError::InvalidArgument(
            "empty reply from provider (unknown symbol?)".to_string(),
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_body_passes() {
        let body = json!({ "Name": "Apple Inc." });
        assert!(inspect_body(&body).is_none());
    }

    #[test]
    fn test_error_message_body_is_fatal() {
        let body = json!({
            "Error Message": "Invalid API call. Please retry or visit the documentation."
        });
        let err = inspect_body(&body).expect("detected");
        assert!(matches!(err, RelayError::InvalidArgument(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_note_body_is_rate_limit() {
        let body = json!({
            "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
        });
        let err = inspect_body(&body).expect("detected");
        assert!(matches!(err, RelayError::RateLimited { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_information_body_is_rate_limit() {
        let body = json!({ "Information": "API rate limit reached" });
        assert!(matches!(
            inspect_body(&body),
            Some(RelayError::RateLimited { .. })
        ));
    }

    #[test]
    fn test_empty_object_is_unknown_symbol() {
        let err = inspect_body(&json!({})).expect("detected");
        assert!(matches!(err, RelayError::InvalidArgument(_)));
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_live_overview() {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY").expect("key set");
        let client = AlphaVantageClient::new(api_key, Duration::from_secs(30));

        let data = client.overview("AAPL").await.expect("overview fetches");
        assert_eq!(data["Symbol"], "AAPL");
    }
}
