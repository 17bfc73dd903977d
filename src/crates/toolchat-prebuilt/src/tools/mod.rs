//! Capabilities - typed executors the model can invoke
//!
//! A [`Capability`] is a named, described, schema-checked async function
//! from arguments to text. The [`CapabilityRegistry`] maps validated names
//! to executors and is the only way the tool node reaches them.
//!
//! # Implementing a Capability
//!
//! ```rust
//! use toolchat_prebuilt::{Capability, InputSchema, ParamType, Result};
//! use async_trait::async_trait;
//! use serde_json::{Map, Value};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Capability for Echo {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Repeat the input text"
//!     }
//!
//!     fn input_schema(&self) -> InputSchema {
//!         InputSchema::new().required("text", ParamType::String, "Text to repeat")
//!     }
//!
//!     async fn execute(&self, arguments: &Map<String, Value>) -> Result<String> {
//!         Ok(arguments["text"].as_str().unwrap_or_default().to_string())
//!     }
//! }
//! ```
//!
//! # Registration Rules
//!
//! - names are non-empty and use only ASCII letters, digits, `_` and `-`
//!   (what OpenAI-compatible providers accept as a function name)
//! - names are unique within a registry
//! - schemas declare each parameter once, with a non-empty name
//!
//! Definitions are reported in registration order so the model sees a
//! stable tool list.

use crate::error::{PrebuiltError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use toolchat_core::llm::ToolDefinition;

pub mod schema;

pub use schema::{InputSchema, ParamSpec, ParamType};

/// Capability trait for executors the model can call
#[async_trait]
pub trait Capability: Send + Sync {
    /// Unique name
    fn name(&self) -> &str;

    /// What the capability does; shown to the model
    fn description(&self) -> &str;

    /// Named parameters
    fn input_schema(&self) -> InputSchema {
        InputSchema::default()
    }

    /// Run with already validated arguments
    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String>;
}

/// Registry mapping capability names to executors
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    order: Vec<String>,
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability after checking its name and schema
    pub fn register(&mut self, capability: Arc<dyn Capability>) -> Result<()> {
        let name = capability.name().to_string();
        if name.is_empty() {
            return Err(PrebuiltError::Registration(
                "capability name is empty".to_string(),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(PrebuiltError::Registration(format!(
                "capability name '{}' contains unsupported characters",
                name
            )));
        }
        if self.capabilities.contains_key(&name) {
            return Err(PrebuiltError::Registration(format!(
                "capability '{}' is already registered",
                name
            )));
        }
        capability.input_schema().check().map_err(|e| {
            PrebuiltError::Registration(format!("capability '{}': {}", name, e))
        })?;

        self.order.push(name.clone());
        self.capabilities.insert(name, capability);
        Ok(())
    }

    /// Build a registry from a list, failing on the first rejected entry
    pub fn from_capabilities(capabilities: Vec<Arc<dyn Capability>>) -> Result<Self> {
        let mut registry = Self::new();
        for capability in capabilities {
            registry.register(capability)?;
        }
        Ok(registry)
    }

    /// A registry holding only the named capabilities, in the given order
    pub fn subset(&self, names: &[&str]) -> Result<Self> {
        let mut registry = Self::new();
        for name in names {
            let capability = self
                .capabilities
                .get(*name)
                .ok_or_else(|| PrebuiltError::UnknownCapability(name.to_string()))?;
            registry.register(capability.clone())?;
        }
        Ok(registry)
    }

    /// Get a capability by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Capability>> {
        self.capabilities.get(name)
    }

    /// Whether a capability is registered
    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Number of registered capabilities
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tool definitions offered to the model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.capabilities.get(name))
            .map(|c| {
                ToolDefinition::new(c.name(), c.description())
                    .with_parameters(c.input_schema().to_json_schema())
            })
            .collect()
    }

    /// Look up, validate and execute
    pub async fn execute(&self, name: &str, arguments: &Map<String, Value>) -> Result<String> {
        let capability = self
            .get(name)
            .ok_or_else(|| PrebuiltError::UnknownCapability(name.to_string()))?;

        capability.input_schema().validate_arguments(arguments)?;
        capability.execute(arguments).await
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MockCapability {
        name: &'static str,
    }

    #[async_trait]
    impl Capability for MockCapability {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "A mock capability for testing"
        }

        fn input_schema(&self) -> InputSchema {
            InputSchema::new().required("text", ParamType::String, "Input")
        }

        async fn execute(&self, arguments: &Map<String, Value>) -> Result<String> {
            Ok(format!("echo: {}", arguments["text"].as_str().unwrap_or_default()))
        }
    }

    fn mock(name: &'static str) -> Arc<dyn Capability> {
        Arc::new(MockCapability { name })
    }

    fn args(value: Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let mut registry = CapabilityRegistry::new();
        registry.register(mock("mock")).unwrap();

        assert!(registry.contains("mock"));
        let out = registry.execute("mock", &args(json!({"text": "hi"}))).await.unwrap();
        assert_eq!(out, "echo: hi");
    }

    #[tokio::test]
    async fn test_registry_rejects_unknown_and_invalid() {
        let registry = CapabilityRegistry::from_capabilities(vec![mock("mock")]).unwrap();

        let err = registry.execute("missing", &Map::new()).await.unwrap_err();
        assert!(matches!(err, PrebuiltError::UnknownCapability(_)));

        let err = registry.execute("mock", &Map::new()).await.unwrap_err();
        assert!(matches!(err, PrebuiltError::InvalidArguments(_)));
    }

    #[test]
    fn test_registration_rules() {
        let mut registry = CapabilityRegistry::new();
        registry.register(mock("mock")).unwrap();

        assert!(registry.register(mock("mock")).is_err());
        assert!(registry.register(mock("")).is_err());
        assert!(registry.register(mock("has space")).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let registry =
            CapabilityRegistry::from_capabilities(vec![mock("b_tool"), mock("a_tool")]).unwrap();
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["b_tool", "a_tool"]);

        let defs = registry.definitions();
        assert_eq!(defs[0].parameters.as_ref().unwrap()["required"], json!(["text"]));
    }

    #[test]
    fn test_subset() {
        let registry =
            CapabilityRegistry::from_capabilities(vec![mock("one"), mock("two"), mock("three")])
                .unwrap();
        let sub = registry.subset(&["three", "one"]).unwrap();
        assert_eq!(sub.names(), vec!["three", "one"]);
        assert!(registry.subset(&["four"]).is_err());
    }
}
