//! Provider clients for finrelay
//!
//! Thin HTTP wrappers around the two data providers plus the curated tool
//! catalog that wires them into a [`relay_tools::ToolRegistry`]:
//!
//! - [`AlphaVantageClient`]: financial data (fundamentals, statements, news,
//!   quotes, intraday series)
//! - [`PerplexityClient`]: real-time web research via the Sonar API
//!
//! The clients return raw `serde_json::Value` payloads; normalization into
//! typed records happens in the dispatcher so every reply goes through the
//! same extraction tables. Authentication, timeouts and status classification
//! live here; retry and rate limiting live upstream in `relay-tools`.

pub mod alpha_vantage;
pub mod catalog;
pub mod handler;
pub mod perplexity;
mod status;

pub use alpha_vantage::AlphaVantageClient;
pub use catalog::{build_dispatcher, build_registry};
pub use perplexity::{PerplexityClient, ResearchFocus};
