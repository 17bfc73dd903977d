//! Turn resolver - asks the model for the next action
//!
//! The resolver sends the windowed conversation log and the registry's tool
//! definitions to a [`ChatModel`] and interprets the reply as exactly one
//! [`Resolution`]:
//!
//! - [`Resolution::Final`] when the reply carries no invocation requests
//! - [`Resolution::Invoke`] when it does, with every request's arguments
//!   parsed into a JSON object
//!
//! Output the loop cannot use is reported as a recoverable
//! [`CoreError`]: [`CoreError::MalformedArguments`] for unparsable or
//! non-object arguments and duplicate ids, [`CoreError::EmptyResponse`] for
//! a reply with neither text nor requests.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use toolchat_core::llm::{ChatModel, ChatRequest, ChatResponse, ToolDefinition};
use toolchat_core::{CapabilityCall, ConversationLog, CoreError, Result};
use tracing::debug;
use uuid::Uuid;

/// Default number of non-system turns sent to the model
pub const DEFAULT_HISTORY_WINDOW: usize = 40;

/// What the model decided
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A natural-language answer
    Final(String),
    /// One or more capability invocations, with any partial text
    Invoke {
        /// Text that accompanied the requests
        content: Option<String>,
        /// Requests in the order the model emitted them
        calls: Vec<CapabilityCall>,
    },
}

/// Asks a chat model for the next action
#[derive(Clone)]
pub struct TurnResolver {
    model: Arc<dyn ChatModel>,
    tools: Vec<ToolDefinition>,
    history_window: usize,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    timeout: Option<Duration>,
}

impl TurnResolver {
    /// Resolver offering the given tool definitions
    pub fn new(model: Arc<dyn ChatModel>, tools: Vec<ToolDefinition>) -> Self {
        Self {
            model,
            tools,
            history_window: DEFAULT_HISTORY_WINDOW,
            temperature: None,
            max_tokens: None,
            timeout: None,
        }
    }

    /// Limit how much history is sent
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    /// Sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Completion token cap
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Bound each model call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Tools offered to the model
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    fn build_request(&self, log: &ConversationLog) -> ChatRequest {
        let mut request = ChatRequest::new(log.window(self.history_window)).with_tools(self.tools.clone());
        if let Some(t) = self.temperature {
            request = request.with_temperature(t);
        }
        if let Some(m) = self.max_tokens {
            request = request.with_max_tokens(m);
        }
        request
    }

    /// Ask the model for the next action
    pub async fn resolve(&self, log: &ConversationLog) -> Result<Resolution> {
        let request = self.build_request(log);
        debug!(
            model = %self.model.model_name(),
            turns = request.turns.len(),
            tools = request.config.tools.len(),
            "Resolving next turn"
        );

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.model.chat(request))
                .await
                .map_err(|_| {
                    CoreError::Timeout(format!("model call exceeded {}s", limit.as_secs()))
                })??,
            None => self.model.chat(request).await?,
        };

        interpret(response)
    }
}

/// Turn a raw model response into a resolution
pub fn interpret(response: ChatResponse) -> Result<Resolution> {
    if response.is_empty() {
        return Err(CoreError::EmptyResponse);
    }

    if !response.has_tool_calls() {
        return Ok(Resolution::Final(response.content.unwrap_or_default()));
    }

    let mut seen = HashSet::new();
    let mut calls = Vec::with_capacity(response.tool_calls.len());
    for raw in response.tool_calls {
        let id = if raw.id.trim().is_empty() {
            format!("call_{}", Uuid::new_v4().simple())
        } else {
            raw.id
        };
        if !seen.insert(id.clone()) {
            return Err(CoreError::MalformedArguments {
                call_id: id,
                reason: "duplicate call id in one response".to_string(),
            });
        }
        if raw.name.trim().is_empty() {
            return Err(CoreError::MalformedArguments {
                call_id: id,
                reason: "call has no capability name".to_string(),
            });
        }
        calls.push(CapabilityCall::parse(id, raw.name, &raw.arguments)?);
    }

    Ok(Resolution::Invoke {
        content: response.content,
        calls,
    })
}
