//! Core types for finrelay
//!
//! This crate holds everything the routing layer agrees on before any I/O
//! happens:
//!
//! - The error taxonomy ([`RelayError`]) shared by every component, with the
//!   retryable/fatal split the retry policy relies on
//! - The immutable runtime configuration ([`RelayConfig`]) read once at startup
//! - The normalized record shapes ([`NormalizedRecord`]) returned to the agent
//!   loop, one per tool family
//! - The pure response normalizer that maps raw provider payloads into those
//!   shapes
//!
//! Nothing in this crate performs I/O; the dispatcher, cache and provider
//! clients live in `relay-tools` and `relay-providers`.

pub mod config;
pub mod error;
pub mod normalize;
pub mod record;

// Re-export main types for convenience
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use normalize::normalize;
pub use record::{
    FiscalPeriod, FundamentalsRecord, NewsArticle, NewsRecord, NormalizedRecord, ProviderId,
    QuoteRecord, ResearchRecord, SeriesPoint, SeriesRecord, StatementKind, StatementsRecord,
    ToolFamily,
};
