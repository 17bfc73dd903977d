//! Tool-call loop controller
//!
//! Drives `RESOLVING → (EXECUTING → RESOLVING)* → DONE` over a
//! [`ConversationLog`]:
//!
//! ```text
//!            ┌──────────────── final answer ───────────────┐
//!            │                                             ↓
//!   ┌─────────────┐  requests   ┌─────────────┐        ┌──────┐
//!   │  RESOLVING  │ ──────────→ │  EXECUTING  │        │ DONE │
//!   └─────────────┘ ←────────── └─────────────┘        └──────┘
//!                  tool results
//! ```
//!
//! - on requests, the assistant turn carrying them is appended verbatim,
//!   then each request runs in order and its result is appended
//! - on a final answer, [`ToolLoop::run`] appends it and stops;
//!   [`ToolLoop::resolve_answer`] returns it unappended for callers (the
//!   pipeline) that post-process the answer first
//! - at most `max_hops` execute cycles; one more request past that is
//!   [`PrebuiltError::HopLimitExceeded`], raised before anything is
//!   appended so the log never holds unanswered requests
//! - unusable resolver output is retried `resolver_retries` times, then the
//!   interaction ends with a fallback answer
//!
//! The log is only ever appended to.

use crate::error::{PrebuiltError, Result};
use crate::events::{EventHandler, LoopEvent};
use crate::resolver::{Resolution, TurnResolver};
use crate::tool_node::ToolNode;
use toolchat_core::{ConversationLog, Turn};
use tracing::{debug, info, warn};

/// Default cap on execute cycles per interaction
pub const DEFAULT_MAX_HOPS: usize = 6;

/// Default number of resolver retries on unusable output
pub const DEFAULT_RESOLVER_RETRIES: usize = 1;

/// Answer used when the resolver keeps producing unusable output
pub const DEFAULT_FALLBACK_ANSWER: &str =
    "Sorry, I could not work out how to answer that. Please try rephrasing the question.";

/// How an interaction ended
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    /// The final answer text
    pub answer: String,
    /// Execute cycles performed
    pub hops: usize,
    /// Whether `answer` is the fallback after exhausted resolver retries
    pub fallback: bool,
}

/// Resolver → executor → resolver controller
#[derive(Clone)]
pub struct ToolLoop {
    resolver: TurnResolver,
    tool_node: ToolNode,
    max_hops: usize,
    resolver_retries: usize,
    fallback_answer: String,
    events: Option<EventHandler>,
}

impl ToolLoop {
    /// Loop over a resolver and a tool node
    pub fn new(resolver: TurnResolver, tool_node: ToolNode) -> Self {
        Self {
            resolver,
            tool_node,
            max_hops: DEFAULT_MAX_HOPS,
            resolver_retries: DEFAULT_RESOLVER_RETRIES,
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
            events: None,
        }
    }

    /// Set the hop limit
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Set how often unusable resolver output is retried
    pub fn with_resolver_retries(mut self, retries: usize) -> Self {
        self.resolver_retries = retries;
        self
    }

    /// Replace the fallback answer
    pub fn with_fallback_answer(mut self, answer: impl Into<String>) -> Self {
        self.fallback_answer = answer.into();
        self
    }

    /// Report progress; also forwarded to the tool node
    pub fn with_events(mut self, events: EventHandler) -> Self {
        self.tool_node = self.tool_node.with_events(events.clone());
        self.events = Some(events);
        self
    }

    /// Configured hop limit
    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    fn emit(&self, event: LoopEvent) {
        if let Some(handler) = &self.events {
            handler(&event);
        }
    }

    /// Run to completion and append the final answer.
    pub async fn run(&self, log: &mut ConversationLog) -> Result<LoopOutcome> {
        let outcome = self.resolve_answer(log).await?;
        log.push(Turn::assistant(outcome.answer.clone()))?;
        Ok(outcome)
    }

    /// Run to completion without appending the final answer.
    ///
    /// Request and result turns are appended as they happen.
    pub async fn resolve_answer(&self, log: &mut ConversationLog) -> Result<LoopOutcome> {
        let mut hops = 0;
        loop {
            self.emit(LoopEvent::Resolving { hop: hops });
            let resolution = match self.resolve_with_retries(log).await? {
                Some(resolution) => resolution,
                None => {
                    warn!(hops, "Resolver output unusable after retries, using fallback answer");
                    return Ok(LoopOutcome {
                        answer: self.fallback_answer.clone(),
                        hops,
                        fallback: true,
                    });
                }
            };

            match resolution {
                Resolution::Final(answer) => {
                    info!(hops, "Tool-call loop finished");
                    return Ok(LoopOutcome {
                        answer,
                        hops,
                        fallback: false,
                    });
                }
                Resolution::Invoke { content, calls } => {
                    if hops >= self.max_hops {
                        warn!(max_hops = self.max_hops, "Hop limit exceeded");
                        return Err(PrebuiltError::HopLimitExceeded {
                            max_hops: self.max_hops,
                        });
                    }
                    debug!(hop = hops + 1, calls = calls.len(), "Executing capability requests");

                    log.push(Turn::assistant_with_calls(content, calls.clone()))?;
                    for result in self.tool_node.execute(&calls).await {
                        log.push(result)?;
                    }
                    hops += 1;
                }
            }
        }
    }

    /// `Ok(None)` when every attempt produced unusable output
    async fn resolve_with_retries(&self, log: &ConversationLog) -> Result<Option<Resolution>> {
        for attempt in 0..=self.resolver_retries {
            match self.resolver.resolve(log).await {
                Ok(resolution) => return Ok(Some(resolution)),
                Err(e) if e.is_resolver_recoverable() => {
                    warn!(attempt = attempt + 1, error = %e, "Resolver produced unusable output");
                    if attempt < self.resolver_retries {
                        self.emit(LoopEvent::ResolverRetry {
                            attempt: attempt + 1,
                            reason: e.to_string(),
                        });
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::CapabilityRegistry;
    use std::sync::Arc;
    use toolchat_core::testing::ScriptedModel;

    fn tool_loop(model: Arc<ScriptedModel>) -> ToolLoop {
        let registry = CapabilityRegistry::new();
        ToolLoop::new(
            TurnResolver::new(model, registry.definitions()),
            ToolNode::new(registry),
        )
    }

    #[test]
    fn test_defaults() {
        let l = tool_loop(Arc::new(ScriptedModel::new()));
        assert_eq!(l.max_hops(), 6);
        assert_eq!(l.resolver_retries, 1);
    }

    #[tokio::test]
    async fn test_direct_answer_appends_one_turn() {
        let model = Arc::new(ScriptedModel::new().then_text("hi there"));
        let mut log = ConversationLog::with_system("sys");
        log.push(Turn::user("hello")).unwrap();

        let outcome = tool_loop(model.clone()).run(&mut log).await.unwrap();
        assert_eq!(outcome.answer, "hi there");
        assert_eq!(outcome.hops, 0);
        assert_eq!(log.len(), 3);
        assert!(log.is_terminal());
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = Arc::new(ScriptedModel::new().then_error("503"));
        let mut log = ConversationLog::with_system("sys");
        log.push(Turn::user("hello")).unwrap();

        let err = tool_loop(model).run(&mut log).await.unwrap_err();
        assert!(matches!(err, PrebuiltError::Core(_)));
        assert_eq!(log.len(), 2);
    }
}
