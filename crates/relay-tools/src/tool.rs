//! Tool descriptors and the provider-call seam

use async_trait::async_trait;
use relay_core::{ProviderId, Result, ToolFamily};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Validated tool arguments. A sorted map so cache keys derived from it are
/// deterministic regardless of the order the agent supplied them in.
pub type ToolArgs = BTreeMap<String, Value>;

/// One tool call raised by the agent loop
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocationRequest {
    pub tool: String,
    pub arguments: ToolArgs,
}

impl ToolInvocationRequest {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            arguments: ToolArgs::new(),
        }
    }

    /// Attach an argument (builder style)
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }
}

/// The single seam to a remote provider endpoint.
///
/// Implementations receive already-validated arguments and return the
/// provider's raw payload; normalization happens in the dispatcher so that
/// every provider reply passes through the same extraction tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderCall: Send + Sync {
    async fn invoke(&self, args: ToolArgs) -> Result<Value>;
}

/// Expected shape of one tool parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Ticker symbol: non-empty string, canonicalized to uppercase
    Symbol,
    /// Free text: non-empty string
    Text,
    /// Positive integer (numeric strings are accepted and coerced)
    Int,
    /// One of a fixed set of lowercase choices
    Choice(&'static [&'static str]),
}

/// Declared parameter of a tool
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(
        name: &'static str,
        description: &'static str,
        kind: ParamKind,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: Some(default.into()),
        }
    }

    fn schema(&self) -> Value {
        let mut schema = match &self.kind {
            ParamKind::Symbol | ParamKind::Text => json!({ "type": "string" }),
            ParamKind::Int => json!({ "type": "integer" }),
            ParamKind::Choice(choices) => json!({ "type": "string", "enum": choices }),
        };
        schema["description"] = json!(self.description);
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

/// A registered tool: name, schema, family, provider identity and the
/// invocation target. Immutable once registered.
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub family: ToolFamily,
    pub provider: ProviderId,
    /// Whether this tool is part of the curated set advertised to the agent
    pub essential: bool,
    pub handler: Arc<dyn ProviderCall>,
}

impl ToolDescriptor {
    /// JSON Schema for the tool's input, in the shape agent SDKs expect
    pub fn input_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            properties.insert(param.name.to_string(), param.schema());
            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("provider", &self.provider)
            .field("essential", &self.essential)
            .finish_non_exhaustive()
    }
}
