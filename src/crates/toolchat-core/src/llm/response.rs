//! Response types returned by chat models

use crate::llm::tools::ToolCall;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete model response.
///
/// Either `content` carries a final answer, or `tool_calls` is non-empty and
/// `content` holds any partial text that came with the requests.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Text produced by the model
    pub content: Option<String>,

    /// Invocation requests, in the order the model emitted them
    pub tool_calls: Vec<ToolCall>,

    /// Token accounting, when the provider reports it
    pub usage: Option<UsageMetadata>,

    /// Provider-specific extras (model id, finish reason)
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ChatResponse {
    /// A plain text response
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// A response requesting capabilities
    pub fn with_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content,
            tool_calls,
            ..Default::default()
        }
    }

    /// Whether the model asked for capabilities
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Whether there is neither usable text nor a request
    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty()
            && self
                .content
                .as_deref()
                .map(|c| c.trim().is_empty())
                .unwrap_or(true)
    }
}

/// Token usage for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    /// Prompt tokens
    pub input_tokens: usize,
    /// Completion tokens
    pub output_tokens: usize,
    /// Sum of both
    pub total_tokens: usize,
}

impl UsageMetadata {
    /// Build usage from input and output counts
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}
