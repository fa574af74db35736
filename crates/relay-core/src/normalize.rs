//! Response normalization
//!
//! Maps raw provider payloads (keyed by labels such as `"01. symbol"`) into
//! the stable record shapes in [`crate::record`]. Pure functions, no I/O.
//!
//! Each tool family has an explicit extraction table: source field path,
//! destination field, coercion rule. Coercion failures surface as
//! [`RelayError::MalformedResponse`] carrying the offending path - a price
//! that fails to parse is an error, never a silent zero. Alpha Vantage uses
//! the literal strings `"None"`, `"-"` and `""` as placeholders for absent
//! values; those count as missing, not malformed.

use crate::error::{RelayError, Result};
use crate::record::{
    FiscalPeriod, FundamentalsRecord, NewsArticle, NewsRecord, NormalizedRecord, QuoteRecord,
    ResearchRecord, SeriesPoint, SeriesRecord, StatementKind, StatementsRecord, ToolFamily,
};
use serde_json::Value;

/// Normalize a raw provider payload for the given tool family.
pub fn normalize(family: ToolFamily, raw: &Value) -> Result<NormalizedRecord> {
    match family {
        ToolFamily::Quote => normalize_quote(raw),
        ToolFamily::Fundamentals => normalize_fundamentals(raw),
        ToolFamily::Statements(kind) => normalize_statements(kind, raw),
        ToolFamily::News => normalize_news(raw),
        ToolFamily::Series => normalize_series(raw),
        ToolFamily::Research => normalize_research(raw),
    }
}

// ---------------------------------------------------------------------------
// Per-family extraction tables
// ---------------------------------------------------------------------------

fn normalize_quote(raw: &Value) -> Result<NormalizedRecord> {
    const ROOT: &str = "Global Quote";

    Ok(NormalizedRecord::Quote(QuoteRecord {
        symbol: req_string(raw, &[ROOT, "01. symbol"])?,
        price: req_number(raw, &[ROOT, "05. price"])?,
        open: opt_number(raw, &[ROOT, "02. open"])?,
        high: opt_number(raw, &[ROOT, "03. high"])?,
        low: opt_number(raw, &[ROOT, "04. low"])?,
        volume: opt_integer(raw, &[ROOT, "06. volume"])?,
        latest_trading_day: opt_string(raw, &[ROOT, "07. latest trading day"])?,
        previous_close: opt_number(raw, &[ROOT, "08. previous close"])?,
        change: opt_number(raw, &[ROOT, "09. change"])?,
        change_percent: opt_percent(raw, &[ROOT, "10. change percent"])?,
    }))
}

fn normalize_fundamentals(raw: &Value) -> Result<NormalizedRecord> {
    Ok(NormalizedRecord::Fundamentals(FundamentalsRecord {
        name: req_string(raw, &["Name"])?,
        symbol: opt_string(raw, &["Symbol"])?,
        description: opt_string(raw, &["Description"])?,
        exchange: opt_string(raw, &["Exchange"])?,
        sector: opt_string(raw, &["Sector"])?,
        industry: opt_string(raw, &["Industry"])?,
        market_cap: opt_integer(raw, &["MarketCapitalization"])?,
        pe_ratio: opt_number(raw, &["PERatio"])?,
        eps: opt_number(raw, &["EPS"])?,
        dividend_yield: opt_number(raw, &["DividendYield"])?,
        book_value: opt_number(raw, &["BookValue"])?,
        fifty_two_week_high: opt_number(raw, &["52WeekHigh"])?,
        fifty_two_week_low: opt_number(raw, &["52WeekLow"])?,
    }))
}

fn normalize_statements(kind: StatementKind, raw: &Value) -> Result<NormalizedRecord> {
    let symbol = req_string(raw, &["symbol"])?;

    // Earnings responses use their own array key; the three statements share one
    let key = match kind {
        StatementKind::Earnings => "annualEarnings",
        _ => "annualReports",
    };

    let reports = raw
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| RelayError::malformed(key, "missing required field"))?;

    let mut periods = Vec::with_capacity(reports.len());
    for (index, entry) in reports.iter().enumerate() {
        let prefix = format!("{key}[{index}]");
        let mut period = FiscalPeriod::empty(entry_req_string(entry, "fiscalDateEnding", &prefix)?);

        match kind {
            StatementKind::Income => {
                period.total_revenue = entry_opt_number(entry, "totalRevenue", &prefix)?;
                period.gross_profit = entry_opt_number(entry, "grossProfit", &prefix)?;
                period.operating_income = entry_opt_number(entry, "operatingIncome", &prefix)?;
                period.net_income = entry_opt_number(entry, "netIncome", &prefix)?;
            }
            StatementKind::BalanceSheet => {
                period.total_assets = entry_opt_number(entry, "totalAssets", &prefix)?;
                period.total_liabilities = entry_opt_number(entry, "totalLiabilities", &prefix)?;
                period.total_shareholder_equity =
                    entry_opt_number(entry, "totalShareholderEquity", &prefix)?;
            }
            StatementKind::CashFlow => {
                period.operating_cashflow = entry_opt_number(entry, "operatingCashflow", &prefix)?;
                period.capital_expenditures =
                    entry_opt_number(entry, "capitalExpenditures", &prefix)?;
                period.net_income = entry_opt_number(entry, "netIncome", &prefix)?;
            }
            StatementKind::Earnings => {
                period.reported_eps = entry_opt_number(entry, "reportedEPS", &prefix)?;
            }
        }

        periods.push(period);
    }

    Ok(NormalizedRecord::Statements(StatementsRecord {
        symbol,
        statement: kind,
        periods,
    }))
}

fn normalize_news(raw: &Value) -> Result<NormalizedRecord> {
    let feed = raw
        .get("feed")
        .and_then(Value::as_array)
        .ok_or_else(|| RelayError::malformed("feed", "missing required field"))?;

    let mut articles = Vec::with_capacity(feed.len());
    for (index, entry) in feed.iter().enumerate() {
        let prefix = format!("feed[{index}]");
        articles.push(NewsArticle {
            title: entry_req_string(entry, "title", &prefix)?,
            url: entry_opt_string(entry, "url", &prefix)?,
            source: entry_opt_string(entry, "source", &prefix)?,
            time_published: entry_opt_string(entry, "time_published", &prefix)?,
            summary: entry_opt_string(entry, "summary", &prefix)?,
            sentiment_score: entry_opt_number(entry, "overall_sentiment_score", &prefix)?,
            sentiment_label: entry_opt_string(entry, "overall_sentiment_label", &prefix)?,
        });
    }

    Ok(NormalizedRecord::News(NewsRecord { articles }))
}

/// Known series container keys. The payload carries exactly one of these
/// depending on the requested interval.
const SERIES_KEYS: &[&str] = &[
    "Time Series (1min)",
    "Time Series (5min)",
    "Time Series (15min)",
    "Time Series (30min)",
    "Time Series (60min)",
    "Time Series (Daily)",
];

fn normalize_series(raw: &Value) -> Result<NormalizedRecord> {
    let symbol = opt_string(raw, &["Meta Data", "2. Symbol"])?;
    let interval = opt_string(raw, &["Meta Data", "4. Interval"])?;

    let (series_key, series) = SERIES_KEYS
        .iter()
        .find_map(|key| raw.get(*key).map(|value| (*key, value)))
        .ok_or_else(|| RelayError::malformed("Time Series", "missing required field"))?;

    let entries = series
        .as_object()
        .ok_or_else(|| RelayError::malformed(series_key, "expected an object of bars"))?;

    let mut points = Vec::with_capacity(entries.len());
    for (timestamp, bar) in entries {
        let prefix = format!("{series_key}.{timestamp}");
        points.push(SeriesPoint {
            timestamp: timestamp.clone(),
            open: entry_req_number(bar, "1. open", &prefix)?,
            high: entry_req_number(bar, "2. high", &prefix)?,
            low: entry_req_number(bar, "3. low", &prefix)?,
            close: entry_req_number(bar, "4. close", &prefix)?,
            volume: entry_req_integer(bar, "5. volume", &prefix)?,
        });
    }

    Ok(NormalizedRecord::Series(SeriesRecord {
        symbol,
        interval,
        points,
    }))
}

fn normalize_research(raw: &Value) -> Result<NormalizedRecord> {
    let content = raw
        .get("content")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| RelayError::malformed("content", "missing required field"))?
        .to_string();

    let citations = match raw.get("citations") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut urls = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                // Newer Sonar responses wrap each citation in an object
                let url = item
                    .as_str()
                    .or_else(|| item.get("url").and_then(Value::as_str));
                match url {
                    Some(url) => urls.push(url.to_string()),
                    None => {
                        return Err(RelayError::malformed(
                            format!("citations[{index}]"),
                            "expected a citation URL",
                        ));
                    }
                }
            }
            urls
        }
        Some(_) => {
            return Err(RelayError::malformed("citations", "expected a list"));
        }
    };

    Ok(NormalizedRecord::Research(ResearchRecord {
        content,
        citations,
        model: opt_string(raw, &["model"])?,
    }))
}

// ---------------------------------------------------------------------------
// Extraction helpers
// ---------------------------------------------------------------------------

fn path_label(path: &[&str]) -> String {
    path.join(".")
}

fn lookup<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = raw;
    for segment in path {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Alpha Vantage marks absent values with placeholder strings rather than
/// omitting the key.
fn is_placeholder(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|text| matches!(text.trim(), "" | "-" | "None" | "none"))
}

fn string_at(value: &Value, label: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RelayError::malformed(label, "expected a string"))
}

fn number_at(value: &Value, label: &str) -> Result<f64> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| RelayError::malformed(label, "number out of range")),
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| {
            RelayError::malformed(label, format!("cannot parse `{text}` as a number"))
        }),
        other => Err(RelayError::malformed(
            label,
            format!("expected a number, got {other}"),
        )),
    }
}

fn integer_at(value: &Value, label: &str) -> Result<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| RelayError::malformed(label, "expected an integer")),
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| {
            RelayError::malformed(label, format!("cannot parse `{text}` as an integer"))
        }),
        other => Err(RelayError::malformed(
            label,
            format!("expected an integer, got {other}"),
        )),
    }
}

fn opt_string(raw: &Value, path: &[&str]) -> Result<Option<String>> {
    match lookup(raw, path) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if is_placeholder(value) => Ok(None),
        Some(value) => string_at(value, &path_label(path)).map(Some),
    }
}

fn req_string(raw: &Value, path: &[&str]) -> Result<String> {
    opt_string(raw, path)?
        .ok_or_else(|| RelayError::malformed(path_label(path), "missing required field"))
}

fn opt_number(raw: &Value, path: &[&str]) -> Result<Option<f64>> {
    match lookup(raw, path) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if is_placeholder(value) => Ok(None),
        Some(value) => number_at(value, &path_label(path)).map(Some),
    }
}

fn req_number(raw: &Value, path: &[&str]) -> Result<f64> {
    opt_number(raw, path)?
        .ok_or_else(|| RelayError::malformed(path_label(path), "missing required field"))
}

fn opt_integer(raw: &Value, path: &[&str]) -> Result<Option<i64>> {
    match lookup(raw, path) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if is_placeholder(value) => Ok(None),
        Some(value) => integer_at(value, &path_label(path)).map(Some),
    }
}

/// Percent values arrive as strings with a trailing `%`
fn opt_percent(raw: &Value, path: &[&str]) -> Result<Option<f64>> {
    match lookup(raw, path) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if is_placeholder(value) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim().trim_end_matches('%');
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| {
                    RelayError::malformed(
                        path_label(path),
                        format!("cannot parse `{text}` as a percentage"),
                    )
                })
        }
        Some(value) => number_at(value, &path_label(path)).map(Some),
    }
}

fn entry_req_string(entry: &Value, field: &str, prefix: &str) -> Result<String> {
    let label = format!("{prefix}.{field}");
    match entry.get(field) {
        None | Some(Value::Null) => Err(RelayError::malformed(label, "missing required field")),
        Some(value) if is_placeholder(value) => {
            Err(RelayError::malformed(label, "missing required field"))
        }
        Some(value) => string_at(value, &label),
    }
}

fn entry_opt_string(entry: &Value, field: &str, prefix: &str) -> Result<Option<String>> {
    match entry.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if is_placeholder(value) => Ok(None),
        Some(value) => string_at(value, &format!("{prefix}.{field}")).map(Some),
    }
}

fn entry_opt_number(entry: &Value, field: &str, prefix: &str) -> Result<Option<f64>> {
    match entry.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if is_placeholder(value) => Ok(None),
        Some(value) => number_at(value, &format!("{prefix}.{field}")).map(Some),
    }
}

fn entry_req_number(entry: &Value, field: &str, prefix: &str) -> Result<f64> {
    entry_opt_number(entry, field, prefix)?.ok_or_else(|| {
        RelayError::malformed(format!("{prefix}.{field}"), "missing required field")
    })
}

fn entry_req_integer(entry: &Value, field: &str, prefix: &str) -> Result<i64> {
    let label = format!("{prefix}.{field}");
    match entry.get(field) {
        None | Some(Value::Null) => Err(RelayError::malformed(label, "missing required field")),
        Some(value) if is_placeholder(value) => {
            Err(RelayError::malformed(label, "missing required field"))
        }
        Some(value) => integer_at(value, &label),
    }
}
