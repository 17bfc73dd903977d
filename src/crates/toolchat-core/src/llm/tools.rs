//! Tool calling types shared with providers
//!
//! [`ToolDefinition`] is what the model is told about a capability.
//! [`ToolCall`] is what a provider hands back before any interpretation:
//! its `arguments` field is the raw string the model produced, which may or
//! may not be valid JSON. Parsing happens in the resolver so that malformed
//! output can be retried instead of failing inside the client.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Definition of a capability offered to the model.
///
/// `parameters` is a JSON Schema object with `type`, `properties` and
/// `required`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique capability name
    pub name: String,

    /// What the capability does; the model decides from this when to call it
    pub description: String,

    /// JSON Schema of the arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<JsonValue>,
}

impl ToolDefinition {
    /// Create a definition with name and description
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
        }
    }

    /// Attach a parameter schema
    pub fn with_parameters(mut self, parameters: JsonValue) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// A raw invocation request as returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-generated id
    pub id: String,

    /// Requested capability
    pub name: String,

    /// Unparsed argument text
    pub arguments: String,
}

impl ToolCall {
    /// Create a raw call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definition_serialization_skips_missing_parameters() {
        let def = ToolDefinition::new("web_search", "Search the web");
        let value = serde_json::to_value(&def).unwrap();
        assert!(value.get("parameters").is_none());

        let def = def.with_parameters(json!({"type": "object"}));
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["parameters"]["type"], "object");
    }
}
