//! Normalized record shapes returned to the agent loop
//!
//! Each tool family maps to exactly one record shape. The normalizer promises
//! deterministic field presence per family: a field the shape declares is
//! either populated or `None`, never silently dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// External data provider identity, used for rate-limit bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    AlphaVantage,
    Perplexity,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlphaVantage => write!(f, "alpha_vantage"),
            Self::Perplexity => write!(f, "perplexity"),
        }
    }
}

/// Which financial statement a statements-family record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Income,
    BalanceSheet,
    CashFlow,
    Earnings,
}

/// Tool family: the group of tools sharing one response shape and one
/// normalization table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFamily {
    Quote,
    Fundamentals,
    Statements(StatementKind),
    News,
    Series,
    Research,
}

impl ToolFamily {
    /// Families whose responses are worth caching. Research replies depend on
    /// live web state and are always fetched fresh.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, Self::Research)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Fundamentals => "fundamentals",
            Self::Statements(_) => "statements",
            Self::News => "news",
            Self::Series => "series",
            Self::Research => "research",
        }
    }
}

/// Current price snapshot (GLOBAL_QUOTE)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    pub price: f64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<i64>,
    pub latest_trading_day: Option<String>,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

/// Company overview snapshot (OVERVIEW)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsRecord {
    pub name: String,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<i64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub book_value: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

/// One fiscal period from a financial statement.
///
/// Which columns are populated is determined by the statement kind; the rest
/// stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    pub fiscal_date_ending: String,
    pub total_revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub total_shareholder_equity: Option<f64>,
    pub operating_cashflow: Option<f64>,
    pub capital_expenditures: Option<f64>,
    pub reported_eps: Option<f64>,
}

impl FiscalPeriod {
    /// An all-`None` period for a given fiscal date; the normalizer fills in
    /// the columns its statement kind promises.
    pub fn empty(fiscal_date_ending: impl Into<String>) -> Self {
        Self {
            fiscal_date_ending: fiscal_date_ending.into(),
            total_revenue: None,
            gross_profit: None,
            operating_income: None,
            net_income: None,
            total_assets: None,
            total_liabilities: None,
            total_shareholder_equity: None,
            operating_cashflow: None,
            capital_expenditures: None,
            reported_eps: None,
        }
    }
}

/// Annual financial statement data (INCOME_STATEMENT, BALANCE_SHEET,
/// CASH_FLOW, EARNINGS)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementsRecord {
    pub symbol: String,
    pub statement: StatementKind,
    pub periods: Vec<FiscalPeriod>,
}

/// One article from a news-sentiment feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: Option<String>,
    pub source: Option<String>,
    pub time_published: Option<String>,
    pub summary: Option<String>,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<String>,
}

/// News and sentiment feed (NEWS_SENTIMENT)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub articles: Vec<NewsArticle>,
}

/// One OHLCV bar of a time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Historical price series (TIME_SERIES_INTRADAY)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub points: Vec<SeriesPoint>,
}

/// Web research result (perplexity_research)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRecord {
    pub content: String,
    /// Always a list; empty when the provider returned no citations
    pub citations: Vec<String>,
    pub model: Option<String>,
}

/// Stable, typed record handed back to the agent loop as tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum NormalizedRecord {
    Quote(QuoteRecord),
    Fundamentals(FundamentalsRecord),
    Statements(StatementsRecord),
    News(NewsRecord),
    Series(SeriesRecord),
    Research(ResearchRecord),
}
