//! Provider-call handlers bound into tool descriptors
//!
//! Each handler receives the dispatcher's validated arguments and forwards
//! them to one client method. The argument checks here are a defensive
//! backstop; the dispatcher has already enforced the parameter table.

use crate::alpha_vantage::AlphaVantageClient;
use crate::perplexity::{PerplexityClient, ResearchFocus};
use async_trait::async_trait;
use relay_core::{RelayError, Result};
use relay_tools::{ProviderCall, ToolArgs};
use serde_json::Value;
use std::sync::Arc;

/// Which Alpha Vantage endpoint a tool maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AvEndpoint {
    Overview,
    IncomeStatement,
    BalanceSheet,
    CashFlow,
    Earnings,
    NewsSentiment,
    GlobalQuote,
    Intraday,
}

/// Binds one Alpha Vantage endpoint to the provider-call seam
pub(crate) struct AlphaVantageCall {
    pub client: Arc<AlphaVantageClient>,
    pub endpoint: AvEndpoint,
}

#[async_trait]
impl ProviderCall for AlphaVantageCall {
    async fn invoke(&self, args: ToolArgs) -> Result<Value> {
        match self.endpoint {
            AvEndpoint::Overview => self.client.overview(str_arg(&args, "symbol")?).await,
            AvEndpoint::IncomeStatement => {
                self.client.income_statement(str_arg(&args, "symbol")?).await
            }
            AvEndpoint::BalanceSheet => self.client.balance_sheet(str_arg(&args, "symbol")?).await,
            AvEndpoint::CashFlow => self.client.cash_flow(str_arg(&args, "symbol")?).await,
            AvEndpoint::Earnings => self.client.earnings(str_arg(&args, "symbol")?).await,
            AvEndpoint::NewsSentiment => {
                let ticker = str_arg(&args, "ticker")?;
                let limit = int_arg(&args, "limit").unwrap_or(50);
                self.client.news_sentiment(ticker, limit).await
            }
            AvEndpoint::GlobalQuote => self.client.quote(str_arg(&args, "symbol")?).await,
            AvEndpoint::Intraday => {
                let symbol = str_arg(&args, "symbol")?;
                let interval = str_arg(&args, "interval")?;
                self.client.intraday(symbol, interval).await
            }
        }
    }
}

/// Binds the research tool to the Perplexity client
pub(crate) struct PerplexityCall {
    pub client: Arc<PerplexityClient>,
}

#[async_trait]
impl ProviderCall for PerplexityCall {
    async fn invoke(&self, args: ToolArgs) -> Result<Value> {
        let query = str_arg(&args, "query")?;
        let focus = match args.get("focus").and_then(Value::as_str) {
            Some(text) => ResearchFocus::parse(text).ok_or_else(|| {
                RelayError::InvalidArgument(format!("unsupported research focus `{text}`"))
            })?,
            None => ResearchFocus::default(),
        };

        self.client.research(query, focus).await
    }
}

fn str_arg<'a>(args: &'a ToolArgs, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| RelayError::InvalidArgument(format!("missing argument `{name}`")))
}

fn int_arg(args: &ToolArgs, name: &str) -> Option<i64> {
    args.get(name).and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_arg() {
        let mut args = ToolArgs::new();
        args.insert("symbol".to_string(), json!("AAPL"));

        assert_eq!(str_arg(&args, "symbol").unwrap(), "AAPL");
        assert!(matches!(
            str_arg(&args, "interval").unwrap_err(),
            RelayError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_int_arg() {
        let mut args = ToolArgs::new();
        args.insert("limit".to_string(), json!(25));

        assert_eq!(int_arg(&args, "limit"), Some(25));
        assert_eq!(int_arg(&args, "missing"), None);
    }
}
