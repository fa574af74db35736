//! Command-line interface for finrelay
//!
//! A one-shot dispatch tool for debugging the catalog without an agent loop:
//! load configuration from the environment, dispatch a single tool call, and
//! print the normalized record as JSON.

use anyhow::Context;
use clap::Parser;
use relay_core::RelayConfig;
use relay_providers::build_dispatcher;
use relay_tools::ToolInvocationRequest;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "relay-cli")]
#[command(about = "Dispatch a finrelay tool call and print the normalized record", long_about = None)]
struct Args {
    /// Tool to dispatch (e.g. OVERVIEW, NEWS_SENTIMENT, perplexity_research)
    tool: Option<String>,

    /// Tool argument as key=value; repeat for multiple arguments
    #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE")]
    args: Vec<String>,

    /// List the tools advertised to the agent loop
    #[arg(short, long)]
    list: bool,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Parse a `key=value` argument. Values that read as JSON (numbers, booleans)
/// are kept typed; everything else passes through as a string.
fn parse_arg(raw: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("argument `{raw}` is not of the form key=value"))?;

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = RelayConfig::from_env()?;
    let dispatcher = build_dispatcher(&config)?;

    if args.list {
        for descriptor in dispatcher.registry().list_essential() {
            println!("{:<22} {}", descriptor.name, descriptor.description);
        }
        return Ok(());
    }

    let Some(tool) = args.tool else {
        println!("No tool given. Use --list to see the advertised tools.");
        return Ok(());
    };

    let mut request = ToolInvocationRequest::new(&tool);
    for raw in &args.args {
        let (key, value) = parse_arg(raw)?;
        request.arguments.insert(key, value);
    }

    info!(%tool, "dispatching");
    let record = dispatcher.dispatch(request).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg_keeps_json_types() {
        let (key, value) = parse_arg("limit=25").expect("parses");
        assert_eq!(key, "limit");
        assert_eq!(value, Value::from(25));
    }

    #[test]
    fn test_parse_arg_falls_back_to_string() {
        let (key, value) = parse_arg("symbol=AAPL").expect("parses");
        assert_eq!(key, "symbol");
        assert_eq!(value, Value::String("AAPL".to_string()));
    }

    #[test]
    fn test_parse_arg_rejects_bare_words() {
        assert!(parse_arg("symbol").is_err());
    }

    #[test]
    fn test_parse_arg_allows_equals_in_value() {
        let (key, value) = parse_arg("query=p=np research").expect("parses");
        assert_eq!(key, "query");
        assert_eq!(value, Value::String("p=np research".to_string()));
    }
}
