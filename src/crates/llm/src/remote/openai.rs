//! OpenAI-compatible chat client with tool calling.
//!
//! Works against any `/chat/completions` endpoint that follows the OpenAI
//! wire format, including DashScope's compatible mode (the default) and
//! OpenAI itself.
//!
//! # Wire Mapping
//!
//! | Turn | OpenAI message |
//! |------|----------------|
//! | system / user / final assistant | `{role, content}` |
//! | assistant with requests | `{role: "assistant", content: text or "", tool_calls: [...]}` |
//! | tool result | `{role: "tool", content, tool_call_id}` |
//!
//! Tool-call arguments are passed through as the raw string the model
//! produced; parsing them is the resolver's job.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::OpenAiClient;
//! use llm::config::{RemoteLlmConfig, DEFAULT_BASE_URL};
//! use toolchat_core::llm::{ChatModel, ChatRequest};
//! use toolchat_core::Turn;
//!
//! let config = RemoteLlmConfig::from_env("TOOLCHAT_API_KEY", DEFAULT_BASE_URL, "qwen-coder-plus")?;
//! let client = OpenAiClient::new(config)?;
//!
//! let response = client.chat(ChatRequest::new(vec![Turn::user("Hello!")])).await?;
//! ```

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::retry::{with_retry, RetryPolicy};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use toolchat_core::llm::{
    ChatModel, ChatRequest, ChatResponse, ToolCall, ToolDefinition, UsageMetadata,
};
use toolchat_core::{Role, Turn};
use tracing::debug;

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct OpenAiClient {
    config: RemoteLlmConfig,
    client: Client,
    retry: RetryPolicy,
}

impl OpenAiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let retry = RetryPolicy::with_max_retries(config.max_retries);

        Ok(Self {
            config,
            client,
            retry,
        })
    }

    /// Override the backoff policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &RemoteLlmConfig {
        &self.config
    }

    /// Convert a turn to the OpenAI message format.
    fn convert_turn(&self, turn: &Turn) -> OpenAiMessage {
        let tool_calls = if turn.capability_calls.is_empty() {
            None
        } else {
            Some(
                turn.capability_calls
                    .iter()
                    .map(|call| OpenAiToolCall {
                        id: call.id.clone(),
                        kind: "function".to_string(),
                        function: OpenAiFunctionCall {
                            name: call.capability_name.clone(),
                            arguments: call.arguments_json(),
                        },
                    })
                    .collect(),
            )
        };

        // Providers reject a null content on assistant turns carrying calls.
        let content = match (turn.role, &turn.content) {
            (Role::Assistant, None) => Some(String::new()),
            (_, content) => content.clone(),
        };

        OpenAiMessage {
            role: turn.role.as_str().to_string(),
            content,
            tool_calls,
            tool_call_id: turn.capability_call_id.clone(),
        }
    }

    fn convert_tool(tool: &ToolDefinition) -> OpenAiTool {
        OpenAiTool {
            kind: "function".to_string(),
            function: OpenAiFunctionDef {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone().unwrap_or_else(
                    || serde_json::json!({"type": "object", "properties": {}}),
                ),
            },
        }
    }

    fn build_request(&self, request: &ChatRequest) -> OpenAiRequest {
        let tools = if request.config.tools.is_empty() {
            None
        } else {
            Some(request.config.tools.iter().map(Self::convert_tool).collect())
        };

        OpenAiRequest {
            model: self.config.model.clone(),
            messages: request.turns.iter().map(|t| self.convert_turn(t)).collect(),
            temperature: request.config.temperature,
            max_tokens: request.config.max_tokens,
            tools,
            stream: false,
        }
    }

    /// Convert an OpenAI response to a ChatResponse.
    fn convert_response(&self, openai_resp: OpenAiResponse) -> Result<ChatResponse> {
        let choice = openai_resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|c| ToolCall::new(c.id, c.function.name, c.function.arguments))
            .collect();

        let usage = openai_resp
            .usage
            .as_ref()
            .map(|u| UsageMetadata::new(u.prompt_tokens, u.completion_tokens));

        let mut metadata = HashMap::new();
        metadata.insert(
            "model".to_string(),
            serde_json::Value::String(openai_resp.model),
        );
        metadata.insert(
            "finish_reason".to_string(),
            serde_json::Value::String(choice.finish_reason.unwrap_or_default()),
        );

        Ok(ChatResponse {
            content: choice.message.content,
            tool_calls,
            usage,
            metadata,
        })
    }

    async fn send_once(&self, body: &OpenAiRequest) -> Result<OpenAiResponse> {
        let url = self.config.endpoint("chat/completions");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> toolchat_core::Result<ChatResponse> {
        let body = self.build_request(&request);
        debug!(
            model = %self.config.model,
            turns = body.messages.len(),
            tools = body.tools.as_ref().map(Vec::len).unwrap_or(0),
            "Sending chat completion"
        );

        let openai_resp = with_retry(&self.retry, "chat_completion", || self.send_once(&body)).await?;
        let response = self.convert_response(openai_resp)?;

        debug!(
            tool_calls = response.tool_calls.len(),
            output_tokens = response.usage.map(|u| u.output_tokens).unwrap_or(0),
            "Chat completion received"
        );
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    kind: String,
    function: OpenAiFunctionDef,
}

#[derive(Debug, Serialize)]
struct OpenAiFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}
