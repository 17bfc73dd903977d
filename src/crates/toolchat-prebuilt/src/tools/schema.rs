//! Input schemas for capabilities
//!
//! A deliberately small subset of JSON Schema: a flat object of named,
//! typed parameters with required flags. That is all the model needs to
//! form a call and all the registry needs to check one.

use crate::error::{PrebuiltError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// JSON type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// JSON string
    String,
    /// Any JSON number
    Number,
    /// Integral JSON number
    Integer,
    /// JSON boolean
    Boolean,
}

impl ParamType {
    fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Boolean => value.is_boolean(),
        }
    }
}

/// One named parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Expected JSON type
    pub kind: ParamType,
    /// Shown to the model
    pub description: String,
    /// Whether the call must supply it
    pub required: bool,
}

/// Named parameters of a capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    /// Parameters in declaration order
    pub params: Vec<ParamSpec>,
}

impl InputSchema {
    /// Schema with no parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter
    pub fn required(mut self, name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        });
        self
    }

    /// Add an optional parameter
    pub fn optional(mut self, name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
        });
        self
    }

    /// Check the schema itself: names non-empty and unique
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for param in &self.params {
            if param.name.trim().is_empty() {
                return Err(PrebuiltError::Registration(
                    "schema has a parameter with an empty name".to_string(),
                ));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(PrebuiltError::Registration(format!(
                    "schema declares parameter '{}' twice",
                    param.name
                )));
            }
        }
        Ok(())
    }

    /// Render as a JSON Schema object for the model
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            properties.insert(
                param.name.clone(),
                json!({"type": param.kind.as_str(), "description": param.description}),
            );
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check call arguments: required present, declared types match.
    ///
    /// Undeclared arguments are tolerated; models add them occasionally and
    /// executors ignore them.
    pub fn validate_arguments(&self, arguments: &Map<String, Value>) -> Result<()> {
        for param in &self.params {
            match arguments.get(&param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(PrebuiltError::InvalidArguments(format!(
                        "missing required parameter '{}'",
                        param.name
                    )))
                }
                None | Some(Value::Null) => {}
                Some(value) if !param.kind.accepts(value) => {
                    return Err(PrebuiltError::InvalidArguments(format!(
                        "parameter '{}' must be of type {}",
                        param.name,
                        param.kind.as_str()
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
