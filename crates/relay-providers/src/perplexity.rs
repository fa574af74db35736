//! Perplexity Sonar API client
//!
//! Real-time web research through the OpenAI-compatible chat-completions
//! endpoint. The research reply is reshaped into a flat
//! `{content, citations, model}` payload before it leaves this module, so the
//! normalizer never sees the chat-completion envelope.

use crate::status::classify_status;
use relay_core::{ProviderId, Result};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

const API_URL: &str = "https://api.perplexity.ai/chat/completions";

/// Focus area for a research query. Steers the system prompt and query
/// framing the way the agent expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResearchFocus {
    News,
    Analysis,
    Financial,
    #[default]
    General,
}

impl ResearchFocus {
    /// All accepted focus values, in the order the tool schema advertises
    pub const CHOICES: &'static [&'static str] = &["news", "analysis", "general", "financial"];

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "news" => Some(Self::News),
            "analysis" => Some(Self::Analysis),
            "financial" => Some(Self::Financial),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Analysis => "analysis",
            Self::Financial => "financial",
            Self::General => "general",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            Self::News => {
                "You are a financial news research assistant. Provide recent news, \
                 events, and developments with sources."
            }
            Self::Analysis => {
                "You are a financial analysis assistant. Provide expert opinions, \
                 market analysis, and insights with sources."
            }
            Self::Financial => {
                "You are a financial market research assistant. Provide financial \
                 context, market trends, and economic factors with sources."
            }
            Self::General => {
                "You are a helpful research assistant that provides accurate, cited \
                 information."
            }
        }
    }

    fn query_prefix(&self) -> &'static str {
        match self {
            Self::News => "Recent news and events: ",
            Self::Analysis => "Expert analysis and opinions: ",
            Self::Financial => "Financial market context: ",
            Self::General => "",
        }
    }
}

/// Perplexity Sonar API client
#[derive(Debug, Clone)]
pub struct PerplexityClient {
    client: Client,
    api_key: String,
    model: String,
}

impl PerplexityClient {
    /// Create a new client with an API key, Sonar model and request timeout
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Run one research query and return the flattened payload
    pub async fn research(&self, query: &str, focus: ResearchFocus) -> Result<Value> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": focus.system_prompt() },
                { "role": "user", "content": format!("{}{}", focus.query_prefix(), query) }
            ],
            // Low temperature for factual research
            "temperature": 0.2,
            "max_tokens": 2000
        });

        tracing::debug!(focus = focus.as_str(), "calling Perplexity");
        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if let Some(err) = classify_status(ProviderId::Perplexity, response.status()) {
            return Err(err);
        }

        let data: Value = response.json().await?;
        Ok(flatten_completion(&data))
    }
}

/// Pull content, citations and model out of the chat-completion envelope.
/// Content stays absent when the reply carried none; the normalizer turns
/// that into a malformed-response error.
fn flatten_completion(data: &Value) -> Value {
    let mut payload = serde_json::Map::new();

    if let Some(content) = data
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        payload.insert("content".to_string(), json!(content));
    }

    payload.insert(
        "citations".to_string(),
        data.get("citations").cloned().unwrap_or_else(|| json!([])),
    );

    if let Some(model) = data.get("model").and_then(Value::as_str) {
        payload.insert("model".to_string(), json!(model));
    }

    Value::Object(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_parse_round_trip() {
        for name in ResearchFocus::CHOICES {
            let focus = ResearchFocus::parse(name).expect("known focus");
            assert_eq!(focus.as_str(), *name);
        }
        assert_eq!(ResearchFocus::parse("Financial"), Some(ResearchFocus::Financial));
        assert_eq!(ResearchFocus::parse("gossip"), None);
    }

    #[test]
    fn test_default_focus_has_no_prefix() {
        assert_eq!(ResearchFocus::General.query_prefix(), "");
        assert!(!ResearchFocus::News.query_prefix().is_empty());
    }

    #[test]
    fn test_flatten_completion() {
        let envelope = json!({
            "model": "sonar",
            "choices": [
                { "message": { "role": "assistant", "content": "Tesla reported..." } }
            ],
            "citations": ["https://example.com/a"]
        });

        let payload = flatten_completion(&envelope);
        assert_eq!(payload["content"], "Tesla reported...");
        assert_eq!(payload["citations"], json!(["https://example.com/a"]));
        assert_eq!(payload["model"], "sonar");
    }

    #[test]
    fn test_flatten_completion_without_citations() {
        let envelope = json!({
            "choices": [
                { "message": { "content": "No sources." } }
            ]
        });

        let payload = flatten_completion(&envelope);
        // Always a list, even when the provider omitted it
        assert_eq!(payload["citations"], json!([]));
    }

    #[test]
    fn test_flatten_completion_keeps_content_absent() {
        let payload = flatten_completion(&json!({ "choices": [] }));
        assert!(payload.get("content").is_none());
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_live_research() {
        let api_key = std::env::var("PERPLEXITY_API_KEY").expect("key set");
        let client = PerplexityClient::new(api_key, "sonar", Duration::from_secs(30));

        let payload = client
            .research("Apple Inc recent earnings", ResearchFocus::Financial)
            .await
            .expect("research completes");
        assert!(payload.get("content").is_some());
    }
}
