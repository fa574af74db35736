//! Tool dispatch
//!
//! The single entry point the agent loop calls. One dispatch resolves the
//! descriptor, validates and canonicalizes arguments, consults the cache,
//! gates the provider call behind the rate limiter and retry policy, and
//! routes the raw payload through the normalizer.
//!
//! Every failure comes back as an `Err` the agent loop can fold into its own
//! reasoning; nothing here panics or crashes the process.

use crate::cache::{CacheKey, RateLimitedCache};
use crate::registry::ToolRegistry;
use crate::retry::RetryPolicy;
use crate::tool::{ParamKind, ParamSpec, ToolArgs, ToolDescriptor, ToolInvocationRequest};
use relay_core::{NormalizedRecord, RelayError, Result, normalize};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Routes tool invocations from the agent loop to providers
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    cache: Arc<RateLimitedCache>,
    retry: RetryPolicy,
}

impl ToolDispatcher {
    /// Create a dispatcher over a registry, cache and retry policy
    pub fn new(registry: Arc<ToolRegistry>, cache: Arc<RateLimitedCache>, retry: RetryPolicy) -> Self {
        Self {
            registry,
            cache,
            retry,
        }
    }

    /// The registry backing this dispatcher (for advertising tools)
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Dispatch one tool invocation and return its normalized record.
    #[instrument(skip(self, request), fields(tool = %request.tool))]
    pub async fn dispatch(&self, request: ToolInvocationRequest) -> Result<NormalizedRecord> {
        let descriptor = self.registry.resolve(&request.tool)?;
        let args = validate_arguments(&descriptor, &request.arguments)?;

        let family = descriptor.family;
        let key = CacheKey::new(&descriptor.name, &args);
        let handler = Arc::clone(&descriptor.handler);
        let name = descriptor.name.clone();
        let retry = self.retry.clone();

        self.cache
            .get_or_compute(descriptor.provider, family, key, move || async move {
                let raw = retry
                    .execute(&name, || handler.invoke(args.clone()))
                    .await?;
                normalize(family, &raw)
            })
            .await
    }
}

/// Check the supplied arguments against the descriptor's parameter table and
/// produce the canonical argument map handed to the provider: required
/// parameters present, defaults filled in, symbols uppercased, choices
/// lowercased. Unknown arguments are dropped.
fn validate_arguments(descriptor: &ToolDescriptor, supplied: &ToolArgs) -> Result<ToolArgs> {
    let mut validated = ToolArgs::new();

    for param in &descriptor.params {
        let value = supplied
            .get(param.name)
            .filter(|value| !value.is_null())
            .cloned()
            .or_else(|| param.default.clone());

        let Some(value) = value else {
            if param.required {
                return Err(RelayError::InvalidArgument(format!(
                    "missing required parameter `{}` for {}",
                    param.name, descriptor.name
                )));
            }
            continue;
        };

        validated.insert(param.name.to_string(), coerce(descriptor, param, &value)?);
    }

    for name in supplied.keys() {
        if !descriptor.params.iter().any(|param| param.name == name) {
            tracing::debug!(tool = %descriptor.name, argument = %name, "ignoring unknown argument");
        }
    }

    Ok(validated)
}

fn coerce(descriptor: &ToolDescriptor, param: &ParamSpec, value: &Value) -> Result<Value> {
    let invalid = |reason: &str| {
        RelayError::InvalidArgument(format!(
            "parameter `{}` for {}: {}",
            param.name, descriptor.name, reason
        ))
    };

    match &param.kind {
        ParamKind::Symbol => {
            let text = value
                .as_str()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .ok_or_else(|| invalid("expected a non-empty ticker symbol"))?;
            Ok(Value::String(text.to_uppercase()))
        }
        ParamKind::Text => {
            let text = value
                .as_str()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .ok_or_else(|| invalid("expected non-empty text"))?;
            Ok(Value::String(text.to_string()))
        }
        ParamKind::Int => {
            let number = match value {
                Value::Number(number) => number.as_i64(),
                Value::String(text) => text.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| invalid("expected an integer"))?;

            if number < 1 {
                return Err(invalid("must be a positive integer"));
            }
            Ok(Value::from(number))
        }
        ParamKind::Choice(choices) => {
            let text = value
                .as_str()
                .map(|text| text.trim().to_lowercase())
                .ok_or_else(|| invalid("expected a string"))?;

            if choices.contains(&text.as_str()) {
                Ok(Value::String(text))
            } else {
                Err(invalid(&format!("must be one of {choices:?}")))
            }
        }
    }
}
