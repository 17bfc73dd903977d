//! Turns and the append-only conversation log
//!
//! A [`ConversationLog`] is the shared record every stage of an interaction
//! reads and writes. It only grows: turns are appended through
//! [`ConversationLog::push`], which refuses any turn that would break the
//! pairing between capability invocation requests and their results.
//!
//! # Turn Shapes
//!
//! | role | content | capability_calls | capability_call_id |
//! |------|---------|------------------|--------------------|
//! | system | required | empty | none |
//! | user | required | empty | none |
//! | assistant (answer) | required | empty | none |
//! | assistant (request) | optional | one or more | none |
//! | tool | required | empty | id of an unanswered request |
//!
//! # Example
//!
//! ```rust
//! use toolchat_core::{CapabilityCall, ConversationLog, Turn};
//! use serde_json::json;
//!
//! let mut log = ConversationLog::with_system("You are a helpful assistant.");
//! log.push(Turn::user("深圳今天天气咋样？")).unwrap();
//!
//! let call = CapabilityCall::from_value("call_1", "get_weather", json!({"location": "深圳"})).unwrap();
//! log.push(Turn::assistant_with_calls(None, vec![call])).unwrap();
//! log.push(Turn::tool_result("call_1", "阳光明媚，气温 28 度")).unwrap();
//! log.push(Turn::assistant("深圳今天阳光明媚，28 度。")).unwrap();
//!
//! assert!(log.is_terminal());
//! assert!(log.pending_calls().is_empty());
//! ```

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::warn;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model
    System,
    /// The person chatting
    User,
    /// The model
    Assistant,
    /// A capability result
    Tool,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability invocation request emitted by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityCall {
    /// Opaque id generated by the model response
    pub id: String,

    /// Name of the requested capability
    pub capability_name: String,

    /// Parameter name to value
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl CapabilityCall {
    /// Create a new invocation request
    pub fn new(
        id: impl Into<String>,
        capability_name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            capability_name: capability_name.into(),
            arguments,
        }
    }

    /// Build a request from an arbitrary JSON value.
    ///
    /// Fails with [`CoreError::MalformedArguments`] unless `arguments` is an
    /// object (or `null`, read as no arguments).
    pub fn from_value(
        id: impl Into<String>,
        capability_name: impl Into<String>,
        arguments: Value,
    ) -> Result<Self> {
        let id = id.into();
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(CoreError::MalformedArguments {
                    call_id: id,
                    reason: format!("expected a JSON object, got {}", json_kind(&other)),
                })
            }
        };
        Ok(Self::new(id, capability_name, arguments))
    }

    /// Parse the raw argument string a provider returns.
    ///
    /// An empty string means no arguments.
    pub fn parse(
        id: impl Into<String>,
        capability_name: impl Into<String>,
        raw_arguments: &str,
    ) -> Result<Self> {
        let id = id.into();
        if raw_arguments.trim().is_empty() {
            return Ok(Self::new(id, capability_name, Map::new()));
        }
        let value: Value =
            serde_json::from_str(raw_arguments).map_err(|e| CoreError::MalformedArguments {
                call_id: id.clone(),
                reason: format!("arguments are not valid JSON: {}", e),
            })?;
        Self::from_value(id, capability_name, value)
    }

    /// String argument by name
    pub fn argument_str(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(Value::as_str)
    }

    /// Arguments re-encoded as the JSON string providers expect
    pub fn arguments_json(&self) -> String {
        Value::Object(self.arguments.clone()).to_string()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One entry in the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced the turn
    pub role: Role,

    /// Text content; absent only on assistant turns that carry requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Invocation requests, assistant turns only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_calls: Vec<CapabilityCall>,

    /// Back-reference to the answered request, tool turns only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_call_id: Option<String>,
}

impl Turn {
    fn with_content(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            capability_calls: Vec::new(),
            capability_call_id: None,
        }
    }

    /// System instruction turn
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_content(Role::System, content)
    }

    /// User input turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_content(Role::User, content)
    }

    /// Final assistant answer
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_content(Role::Assistant, content)
    }

    /// Assistant turn carrying invocation requests, with any partial text
    pub fn assistant_with_calls(content: Option<String>, calls: Vec<CapabilityCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            capability_calls: calls,
            capability_call_id: None,
        }
    }

    /// Result of one capability invocation
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            capability_calls: Vec::new(),
            capability_call_id: Some(call_id.into()),
        }
    }

    /// Text content, if any
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Whether this assistant turn requests capabilities
    pub fn has_capability_calls(&self) -> bool {
        !self.capability_calls.is_empty()
    }

    /// Assistant turn with no requests
    pub fn is_final_answer(&self) -> bool {
        self.role == Role::Assistant && self.capability_calls.is_empty()
    }

    /// Tool-result turn
    pub fn is_tool_result(&self) -> bool {
        self.role == Role::Tool
    }

    /// User or assistant turn with non-empty text; what a front-end renders
    pub fn is_visible(&self) -> bool {
        matches!(self.role, Role::User | Role::Assistant)
            && self.text().map(|t| !t.trim().is_empty()).unwrap_or(false)
    }

    fn check_shape(&self) -> Result<()> {
        match self.role {
            Role::Assistant => {
                if self.capability_call_id.is_some() {
                    return Err(CoreError::Integrity(
                        "assistant turn cannot answer a capability call".into(),
                    ));
                }
                if self.content.is_none() && self.capability_calls.is_empty() {
                    return Err(CoreError::Integrity(
                        "assistant turn without content must carry capability calls".into(),
                    ));
                }
            }
            Role::Tool => {
                if !self.capability_calls.is_empty() {
                    return Err(CoreError::Integrity(
                        "tool turn cannot request capabilities".into(),
                    ));
                }
                if self.content.is_none() {
                    return Err(CoreError::Integrity("tool turn requires content".into()));
                }
                match self.capability_call_id.as_deref() {
                    None | Some("") => {
                        return Err(CoreError::Integrity(
                            "tool turn requires a capability_call_id".into(),
                        ))
                    }
                    Some(_) => {}
                }
            }
            Role::System | Role::User => {
                if !self.capability_calls.is_empty() || self.capability_call_id.is_some() {
                    return Err(CoreError::Integrity(format!(
                        "{} turn cannot carry capability bookkeeping",
                        self.role
                    )));
                }
                if self.content.is_none() {
                    return Err(CoreError::Integrity(format!(
                        "{} turn requires content",
                        self.role
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Ordered, append-only record of turns
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log seeded with a system turn
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(prompt)],
        }
    }

    /// Rebuild a log from turns, checking every invariant
    pub fn from_turns(turns: Vec<Turn>) -> Result<Self> {
        let mut log = Self::new();
        for turn in turns {
            log.push(turn)?;
        }
        Ok(log)
    }

    /// Check an arbitrary turn sequence for shape and pairing errors
    pub fn validate(turns: &[Turn]) -> Result<()> {
        let mut pending: HashSet<&str> = HashSet::new();
        for (index, turn) in turns.iter().enumerate() {
            turn.check_shape()
                .map_err(|e| CoreError::Integrity(format!("turn {}: {}", index, e)))?;
            match turn.role {
                Role::Assistant => {
                    for call in &turn.capability_calls {
                        if call.id.is_empty() {
                            return Err(CoreError::Integrity(format!(
                                "turn {}: capability call without id",
                                index
                            )));
                        }
                        if !pending.insert(call.id.as_str()) {
                            return Err(CoreError::Integrity(format!(
                                "turn {}: duplicate pending call id '{}'",
                                index, call.id
                            )));
                        }
                    }
                }
                Role::Tool => {
                    let id = turn.capability_call_id.as_deref().unwrap_or_default();
                    if !pending.remove(id) {
                        return Err(CoreError::Integrity(format!(
                            "turn {}: tool result '{}' has no unanswered request",
                            index, id
                        )));
                    }
                }
                Role::System | Role::User => {}
            }
        }
        Ok(())
    }

    /// Append a turn.
    ///
    /// Rejects turns with an invalid shape, tool results that answer no
    /// pending request, and requests reusing a pending id.
    pub fn push(&mut self, turn: Turn) -> Result<()> {
        turn.check_shape()?;
        match turn.role {
            Role::Assistant if turn.has_capability_calls() => {
                let pending = self.pending_ids();
                let mut fresh = HashSet::new();
                for call in &turn.capability_calls {
                    if call.id.is_empty() {
                        return Err(CoreError::Integrity("capability call without id".into()));
                    }
                    if pending.contains(call.id.as_str()) || !fresh.insert(call.id.as_str()) {
                        return Err(CoreError::Integrity(format!(
                            "capability call id '{}' is already pending",
                            call.id
                        )));
                    }
                }
            }
            Role::Tool => {
                let id = turn.capability_call_id.as_deref().unwrap_or_default();
                if !self.pending_ids().contains(id) {
                    warn!(call_id = id, "Rejected tool result without a pending request");
                    return Err(CoreError::Integrity(format!(
                        "tool result '{}' has no unanswered request",
                        id
                    )));
                }
            }
            _ => {}
        }
        self.turns.push(turn);
        Ok(())
    }

    fn pending_ids(&self) -> HashSet<&str> {
        self.pending_calls().into_iter().map(|c| c.id.as_str()).collect()
    }

    /// Requests that have no tool result yet, oldest first
    ///
    /// A result only answers requests issued before it, so an id may be
    /// requested again once its earlier request has been answered.
    pub fn pending_calls(&self) -> Vec<&CapabilityCall> {
        let mut pending: Vec<&CapabilityCall> = Vec::new();
        for turn in &self.turns {
            match turn.role {
                Role::Assistant => pending.extend(turn.capability_calls.iter()),
                Role::Tool => {
                    let id = turn.capability_call_id.as_deref().unwrap_or_default();
                    pending.retain(|c| c.id != id);
                }
                Role::System | Role::User => {}
            }
        }
        pending
    }

    /// All turns in order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Iterate over turns
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the log has no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Whether the last turn is a final assistant answer
    pub fn is_terminal(&self) -> bool {
        self.last().map(Turn::is_final_answer).unwrap_or(false)
    }

    /// Turns a front-end shows; tool plumbing is hidden
    pub fn visible_turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|t| t.is_visible())
    }

    /// The turns sent to the model when the log is long.
    ///
    /// Keeps every system turn and the most recent `max_turns` other turns,
    /// moving the cut forward to the next user turn so a request is never
    /// separated from its results. The latest user turn and everything after
    /// it are always kept. The log itself is left untouched.
    pub fn window(&self, max_turns: usize) -> Vec<Turn> {
        let conversational: Vec<usize> = self
            .turns
            .iter()
            .enumerate()
            .filter(|(_, t)| t.role != Role::System)
            .map(|(i, _)| i)
            .collect();

        if conversational.len() <= max_turns {
            return self.turns.clone();
        }

        let mut start = if max_turns == 0 {
            self.turns.len()
        } else {
            conversational[conversational.len() - max_turns]
        };
        while start < self.turns.len() && self.turns[start].role != Role::User {
            start += 1;
        }
        if start == self.turns.len() {
            start = self
                .turns
                .iter()
                .rposition(|t| t.role == Role::User)
                .unwrap_or(0);
        }

        self.turns
            .iter()
            .enumerate()
            .filter(|(i, t)| *i >= start || t.role == Role::System)
            .map(|(_, t)| t.clone())
            .collect()
    }
}

impl<'a> IntoIterator for &'a ConversationLog {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
