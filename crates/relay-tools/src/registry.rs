//! Tool registry
//!
//! A fixed, curated table built at process start. The registry may hold more
//! tools than it advertises: `list_essential` returns only the tools exposed
//! to the agent loop, a deliberately small set to bound prompt size, while
//! `resolve` reaches everything registered.

use crate::tool::ToolDescriptor;
use relay_core::{RelayError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry mapping tool names to descriptors
pub struct ToolRegistry {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    tools: HashMap<String, Arc<ToolDescriptor>>,
    /// Registration order, so the advertised list is stable
    order: Vec<String>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl ToolRegistry {
    /// Create a new, empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are unique; a second registration under the
    /// same name is a configuration bug, not an override.
    pub fn register(&self, descriptor: ToolDescriptor) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.tools.contains_key(&descriptor.name) {
            return Err(RelayError::DuplicateTool(descriptor.name));
        }

        tracing::debug!(tool = %descriptor.name, family = descriptor.family.name(), "registered tool");
        inner.order.push(descriptor.name.clone());
        inner
            .tools
            .insert(descriptor.name.clone(), Arc::new(descriptor));
        Ok(())
    }

    /// Look up a tool by exact name
    pub fn resolve(&self, name: &str) -> Result<Arc<ToolDescriptor>> {
        let inner = self.inner.read().unwrap();
        inner
            .tools
            .get(name)
            .cloned()
            .ok_or_else(|| RelayError::UnknownTool(name.to_string()))
    }

    /// The curated tools advertised to the agent loop, in registration order
    pub fn list_essential(&self) -> Vec<Arc<ToolDescriptor>> {
        let inner = self.inner.read().unwrap();
        inner
            .order
            .iter()
            .filter_map(|name| inner.tools.get(name))
            .filter(|descriptor| descriptor.essential)
            .cloned()
            .collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap();
        inner.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ProviderCall, ToolArgs};
    use async_trait::async_trait;
    use relay_core::{ProviderId, ToolFamily};
    use serde_json::Value;

    struct NullCall;

    #[async_trait]
    impl ProviderCall for NullCall {
        async fn invoke(&self, _args: ToolArgs) -> relay_core::Result<Value> {
            Ok(Value::Null)
        }
    }

    fn descriptor(name: &str, essential: bool) -> ToolDescriptor {
        ToolDescriptor {
            name: name.to_string(),
            description: format!("{name} tool"),
            params: vec![],
            family: ToolFamily::Fundamentals,
            provider: ProviderId::AlphaVantage,
            essential,
            handler: Arc::new(NullCall),
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = ToolRegistry::new();
        registry.register(descriptor("OVERVIEW", true)).unwrap();

        let resolved = registry.resolve("OVERVIEW").unwrap();
        assert_eq!(resolved.name, "OVERVIEW");
    }

    #[test]
    fn test_resolve_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.resolve("NO_SUCH_TOOL").unwrap_err();
        assert!(matches!(err, RelayError::UnknownTool(name) if name == "NO_SUCH_TOOL"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = ToolRegistry::new();
        registry.register(descriptor("OVERVIEW", true)).unwrap();

        let err = registry.register(descriptor("OVERVIEW", true)).unwrap_err();
        assert!(matches!(err, RelayError::DuplicateTool(name) if name == "OVERVIEW"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_essential_list_is_ordered_and_filtered() {
        let registry = ToolRegistry::new();
        registry.register(descriptor("OVERVIEW", true)).unwrap();
        registry.register(descriptor("GLOBAL_QUOTE", false)).unwrap();
        registry.register(descriptor("EARNINGS", true)).unwrap();

        let names: Vec<String> = registry
            .list_essential()
            .iter()
            .map(|descriptor| descriptor.name.clone())
            .collect();

        assert_eq!(names, vec!["OVERVIEW", "EARNINGS"]);
        // The non-essential tool is still resolvable
        assert!(registry.resolve("GLOBAL_QUOTE").is_ok());
    }
}
