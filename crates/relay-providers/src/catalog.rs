//! The curated tool catalog
//!
//! A fixed table, not a runtime scan of the provider's full endpoint list:
//! the advertised set stays small to bound prompt size, and changing it means
//! editing this file. Two extra tools (quote, intraday series) are registered
//! without being advertised so operators can dispatch them directly.

use crate::alpha_vantage::AlphaVantageClient;
use crate::handler::{AlphaVantageCall, AvEndpoint, PerplexityCall};
use crate::perplexity::{PerplexityClient, ResearchFocus};
use relay_core::{ProviderId, RelayConfig, Result, StatementKind, ToolFamily};
use relay_tools::{
    ParamKind, ParamSpec, RateLimitedCache, RetryPolicy, ToolDescriptor, ToolDispatcher,
    ToolRegistry,
};
use std::sync::Arc;

const INTERVALS: &[&str] = &["1min", "5min", "15min", "30min", "60min"];

fn symbol_param() -> ParamSpec {
    ParamSpec::required("symbol", "Stock ticker symbol (e.g., AAPL, IBM)", ParamKind::Symbol)
}

fn av_tool(
    client: &Arc<AlphaVantageClient>,
    endpoint: AvEndpoint,
    name: &str,
    description: &str,
    params: Vec<ParamSpec>,
    family: ToolFamily,
    essential: bool,
) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        params,
        family,
        provider: ProviderId::AlphaVantage,
        essential,
        handler: Arc::new(AlphaVantageCall {
            client: Arc::clone(client),
            endpoint,
        }),
    }
}

fn research_tool(client: Arc<PerplexityClient>) -> ToolDescriptor {
    ToolDescriptor {
        name: "perplexity_research".to_string(),
        description: "Perform real-time web research on a topic using Perplexity's Sonar API. \
                      Use this for recent news, market analysis, company developments and other \
                      information not available in structured financial data. Returns cited \
                      research results."
            .to_string(),
        params: vec![
            ParamSpec::required(
                "query",
                "Research query or question. Be specific and include context such as the \
                 company name, ticker symbol or time period.",
                ParamKind::Text,
            ),
            ParamSpec::optional(
                "focus",
                "Focus area: 'news' for recent events, 'analysis' for expert opinions, \
                 'financial' for market context, 'general' for broad research.",
                ParamKind::Choice(ResearchFocus::CHOICES),
                "general",
            ),
        ],
        family: ToolFamily::Research,
        provider: ProviderId::Perplexity,
        essential: true,
        handler: Arc::new(PerplexityCall { client }),
    }
}

/// Build the tool registry from configuration.
///
/// The advertised set is the six Alpha Vantage research tools plus, when a
/// Perplexity key is configured, the web research tool. Without that key the
/// research tool is left out entirely rather than registered broken.
pub fn build_registry(config: &RelayConfig) -> Result<ToolRegistry> {
    let av = Arc::new(AlphaVantageClient::new(
        &config.alpha_vantage_api_key,
        config.request_timeout,
    ));

    let registry = ToolRegistry::new();

    registry.register(av_tool(
        &av,
        AvEndpoint::Overview,
        "OVERVIEW",
        "Get company overview and fundamental data: sector, industry, market \
         capitalization, P/E ratio, EPS, dividend yield and 52-week range.",
        vec![symbol_param()],
        ToolFamily::Fundamentals,
        true,
    ))?;

    registry.register(av_tool(
        &av,
        AvEndpoint::IncomeStatement,
        "INCOME_STATEMENT",
        "Get annual income statement data: revenue, gross profit, operating income \
         and net income per fiscal year.",
        vec![symbol_param()],
        ToolFamily::Statements(StatementKind::Income),
        true,
    ))?;

    registry.register(av_tool(
        &av,
        AvEndpoint::BalanceSheet,
        "BALANCE_SHEET",
        "Get annual balance sheet data: total assets, total liabilities and \
         shareholder equity per fiscal year.",
        vec![symbol_param()],
        ToolFamily::Statements(StatementKind::BalanceSheet),
        true,
    ))?;

    registry.register(av_tool(
        &av,
        AvEndpoint::CashFlow,
        "CASH_FLOW",
        "Get annual cash flow statement data: operating cash flow, capital \
         expenditures and net income per fiscal year.",
        vec![symbol_param()],
        ToolFamily::Statements(StatementKind::CashFlow),
        true,
    ))?;

    registry.register(av_tool(
        &av,
        AvEndpoint::Earnings,
        "EARNINGS",
        "Get reported earnings per share for each fiscal year.",
        vec![symbol_param()],
        ToolFamily::Statements(StatementKind::Earnings),
        true,
    ))?;

    registry.register(av_tool(
        &av,
        AvEndpoint::NewsSentiment,
        "NEWS_SENTIMENT",
        "Get recent news articles with sentiment analysis for a ticker.",
        vec![
            ParamSpec::required("ticker", "Stock ticker symbol", ParamKind::Symbol),
            ParamSpec::optional("limit", "Number of articles to return", ParamKind::Int, 50),
        ],
        ToolFamily::News,
        true,
    ))?;

    match &config.perplexity_api_key {
        Some(key) => {
            let perplexity = Arc::new(PerplexityClient::new(
                key,
                &config.research_model,
                config.request_timeout,
            ));
            registry.register(research_tool(perplexity))?;
        }
        None => {
            tracing::warn!("PERPLEXITY_API_KEY not set; web research tool disabled");
        }
    }

    // Resolvable but not advertised to the agent loop
    registry.register(av_tool(
        &av,
        AvEndpoint::GlobalQuote,
        "GLOBAL_QUOTE",
        "Get the latest price quote for a symbol.",
        vec![symbol_param()],
        ToolFamily::Quote,
        false,
    ))?;

    registry.register(av_tool(
        &av,
        AvEndpoint::Intraday,
        "TIME_SERIES_INTRADAY",
        "Get intraday OHLCV bars for a symbol.",
        vec![
            symbol_param(),
            ParamSpec::required("interval", "Bar interval", ParamKind::Choice(INTERVALS)),
        ],
        ToolFamily::Series,
        false,
    ))?;

    Ok(registry)
}

/// Build a ready-to-use dispatcher: registry, cache tiers, rate limiters and
/// retry policy all derived from one configuration record.
pub fn build_dispatcher(config: &RelayConfig) -> Result<ToolDispatcher> {
    let registry = Arc::new(build_registry(config)?);
    let cache = Arc::new(RateLimitedCache::new(config));
    Ok(ToolDispatcher::new(
        registry,
        cache,
        RetryPolicy::from_config(config),
    ))
}
