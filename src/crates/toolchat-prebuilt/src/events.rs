//! Progress events emitted while a tool-call loop runs
//!
//! Front-ends subscribe with an [`EventHandler`] to show notices such as
//! "calling tool get_weather" before a capability runs.

use std::sync::Arc;

/// Something observable happened inside the loop
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    /// The resolver is about to be asked for the next action
    Resolving {
        /// Hops completed so far
        hop: usize,
    },
    /// A capability is about to run
    InvokingCapability {
        /// Request id
        call_id: String,
        /// Capability name
        name: String,
    },
    /// A capability finished; `failed` when its result is failure text
    CapabilityFinished {
        /// Request id
        call_id: String,
        /// Capability name
        name: String,
        /// Whether the result describes a failure
        failed: bool,
    },
    /// The resolver produced unusable output and is being asked again
    ResolverRetry {
        /// Retry number, starting at 1
        attempt: usize,
        /// Why the previous output was rejected
        reason: String,
    },
}

/// Callback receiving loop events
pub type EventHandler = Arc<dyn Fn(&LoopEvent) + Send + Sync>;
