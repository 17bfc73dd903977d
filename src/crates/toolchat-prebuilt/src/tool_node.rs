//! ToolNode - executes capability invocation requests
//!
//! Given the requests of one assistant turn, the node runs each one through
//! the [`CapabilityRegistry`] **in order** and produces one tool-result
//! [`Turn`] per request, carrying the request id.
//!
//! Nothing a capability does can escape the node:
//!
//! | outcome | tool-result content |
//! |---------|---------------------|
//! | success | the capability's text (`"(no result)"` if empty) |
//! | unknown name | `Error: Unknown capability: <name>` |
//! | schema violation | `Error: Invalid arguments: ...` |
//! | execution error | `Error: Capability execution failed: ...` |
//! | timeout | `Error: capability '<name>' timed out after <n>s` |
//!
//! The model reads the failure text on its next turn and can correct itself.

use crate::events::{EventHandler, LoopEvent};
use crate::tools::CapabilityRegistry;
use std::sync::Arc;
use std::time::Duration;
use toolchat_core::{CapabilityCall, Turn};
use tracing::{debug, warn};

/// Default per-capability time budget
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

const EMPTY_RESULT: &str = "(no result)";

/// Executes invocation requests against a registry
#[derive(Clone)]
pub struct ToolNode {
    registry: Arc<CapabilityRegistry>,
    timeout: Duration,
    events: Option<EventHandler>,
}

impl ToolNode {
    /// Create a node over a registry
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Create a node over a shared registry
    pub fn from_shared(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            timeout: DEFAULT_TOOL_TIMEOUT,
            events: None,
        }
    }

    /// Set the per-capability time budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Report progress to a handler
    pub fn with_events(mut self, events: EventHandler) -> Self {
        self.events = Some(events);
        self
    }

    /// The registry the node executes against
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    fn emit(&self, event: LoopEvent) {
        if let Some(handler) = &self.events {
            handler(&event);
        }
    }

    /// Execute every request in order, one tool-result turn each
    pub async fn execute(&self, calls: &[CapabilityCall]) -> Vec<Turn> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let (content, failed) = self.execute_call(call).await;
            self.emit(LoopEvent::CapabilityFinished {
                call_id: call.id.clone(),
                name: call.capability_name.clone(),
                failed,
            });
            results.push(Turn::tool_result(call.id.clone(), content));
        }
        results
    }

    /// Execute one request; returns the result text and whether it failed
    pub async fn execute_call(&self, call: &CapabilityCall) -> (String, bool) {
        self.emit(LoopEvent::InvokingCapability {
            call_id: call.id.clone(),
            name: call.capability_name.clone(),
        });
        debug!(call_id = %call.id, capability = %call.capability_name, "Invoking capability");

        let outcome = tokio::time::timeout(
            self.timeout,
            self.registry.execute(&call.capability_name, &call.arguments),
        )
        .await;

        match outcome {
            Ok(Ok(text)) if text.trim().is_empty() => (EMPTY_RESULT.to_string(), false),
            Ok(Ok(text)) => (text, false),
            Ok(Err(e)) => {
                warn!(call_id = %call.id, capability = %call.capability_name, error = %e, "Capability failed");
                (format!("Error: {}", e), true)
            }
            Err(_) => {
                warn!(
                    call_id = %call.id,
                    capability = %call.capability_name,
                    timeout_secs = self.timeout.as_secs(),
                    "Capability timed out"
                );
                (
                    format!(
                        "Error: capability '{}' timed out after {}s",
                        call.capability_name,
                        self.timeout.as_secs()
                    ),
                    true,
                )
            }
        }
    }
}
