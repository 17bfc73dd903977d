//! Deterministic models for tests
//!
//! These stand in for network collaborators in unit and integration tests
//! across the workspace.

use crate::error::{CoreError, Result};
use crate::llm::{ChatModel, ChatRequest, ChatResponse, EmbeddingModel, ToolCall};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Step {
    Respond(ChatResponse),
    Fail(String),
}

/// A chat model that replays queued responses in order.
///
/// Every request is recorded so tests can assert on what the model saw.
/// Running out of script is an error, which makes "no call after the final
/// answer" directly testable.
#[derive(Default)]
pub struct ScriptedModel {
    name: String,
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    /// Empty script
    pub fn new() -> Self {
        Self {
            name: "scripted".to_string(),
            ..Default::default()
        }
    }

    /// Override the reported model name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue a final text answer
    pub fn then_text(self, content: impl Into<String>) -> Self {
        self.then_response(ChatResponse::text(content))
    }

    /// Queue a single capability request with raw argument text
    pub fn then_call(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        raw_arguments: impl Into<String>,
    ) -> Self {
        self.then_response(ChatResponse::with_tool_calls(
            None,
            vec![ToolCall::new(id, name, raw_arguments)],
        ))
    }

    /// Queue an arbitrary response
    pub fn then_response(self, response: ChatResponse) -> Self {
        self.script.lock().push_back(Step::Respond(response));
        self
    }

    /// Queue a provider failure
    pub fn then_error(self, message: impl Into<String>) -> Self {
        self.script.lock().push_back(Step::Fail(message.into()));
        self
    }

    /// Number of `chat` calls made so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests received, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    /// Script steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().push(request);
        match self.script.lock().pop_front() {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Fail(message)) => Err(CoreError::Model(message)),
            None => Err(CoreError::Model("script exhausted".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// A chat model computing its answer from the request
pub struct FnModel<F> {
    name: String,
    func: F,
    calls: AtomicUsize,
}

impl<F> FnModel<F>
where
    F: Fn(&ChatRequest) -> Result<ChatResponse> + Send + Sync,
{
    /// Wrap a closure
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `chat` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F> ChatModel for FnModel<F>
where
    F: Fn(&ChatRequest) -> Result<ChatResponse> + Send + Sync,
{
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.func)(&request)
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// Bag-of-characters embedder.
///
/// Texts sharing characters get similar vectors, which is enough for
/// retrieval tests to rank an obviously relevant chunk first.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Embedder producing vectors of the given size
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Embed one text synchronously
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];
        for ch in text.chars().filter(|c| !c.is_whitespace()) {
            let bucket = (ch as usize).wrapping_mul(2_654_435_761) % self.dimensions;
            v[bucket] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingModel for HashEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(inputs.iter().map(|t| self.vector(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Turn;

    #[tokio::test]
    async fn test_scripted_model_replays_in_order() {
        let model = ScriptedModel::new()
            .then_call("c1", "get_weather", r#"{"location":"北京"}"#)
            .then_text("done");

        let first = model.chat(ChatRequest::new(vec![Turn::user("a")])).await.unwrap();
        assert_eq!(first.tool_calls[0].name, "get_weather");

        let second = model.chat(ChatRequest::new(vec![])).await.unwrap();
        assert_eq!(second.content.as_deref(), Some("done"));

        assert!(model.chat(ChatRequest::new(vec![])).await.is_err());
        assert_eq!(model.call_count(), 3);
        assert_eq!(model.requests()[0].turns.len(), 1);
    }

    #[tokio::test]
    async fn test_fn_model_counts_calls() {
        let model = FnModel::new("upper", |req: &ChatRequest| {
            let text = req.turns.last().and_then(|t| t.text()).unwrap_or_default();
            Ok(ChatResponse::text(text.to_uppercase()))
        });
        let out = model.chat(ChatRequest::new(vec![Turn::user("abc")])).await.unwrap();
        assert_eq!(out.content.as_deref(), Some("ABC"));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_hash_embedder_is_normalized_and_deterministic() {
        let embedder = HashEmbedder::new(32);
        let out = embedder
            .embed(&["rust".to_string(), "rust".to_string(), "".to_string()])
            .await
            .unwrap();
        assert_eq!(out[0], out[1]);
        let norm: f32 = out[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(out[2].iter().all(|x| *x == 0.0));
    }
}
