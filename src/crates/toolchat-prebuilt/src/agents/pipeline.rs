//! Research → optional translate pipeline
//!
//! A three-node graph with a single conditional edge:
//!
//! ```text
//! __start__ → Researcher ──route_flag──→ Translator → Done
//!                  │                                   ↑
//!                  └──────────── !route_flag ──────────┘
//! ```
//!
//! The researcher is a [`ToolLoop`] bound to the research capabilities. Its
//! answer becomes the working result; the translator, when routed to,
//! replaces it. `Done` appends the working result as the single final
//! assistant turn. The route flag is read once, when the run starts.

use crate::agents::tool_loop::ToolLoop;
use crate::agents::translator::Translator;
use crate::error::Result;
use toolchat_core::{ConversationLog, Turn};
use tracing::{debug, info};

/// Graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineNode {
    /// Tool-call loop over the research capabilities
    Researcher,
    /// Persona rewrite of the working result
    Translator,
    /// Terminal node; appends the final turn
    Done,
}

impl PipelineNode {
    /// Outgoing edge from `self`
    pub fn next(self, route_flag: bool) -> PipelineNode {
        match self {
            PipelineNode::Researcher if route_flag => PipelineNode::Translator,
            PipelineNode::Researcher => PipelineNode::Done,
            PipelineNode::Translator | PipelineNode::Done => PipelineNode::Done,
        }
    }
}

/// Input for one pipeline run, consumed by [`Pipeline::invoke`]
pub struct PipelineState<'a> {
    /// The session's log; the run appends to it
    pub conversation: &'a mut ConversationLog,
    /// Route through the translator
    pub route_flag: bool,
}

impl<'a> PipelineState<'a> {
    /// Bundle a log with the routing decision for this submission
    pub fn new(conversation: &'a mut ConversationLog, route_flag: bool) -> Self {
        Self {
            conversation,
            route_flag,
        }
    }
}

/// Result of one run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Text appended as the final assistant turn
    pub answer: String,
    /// Whether the translator ran
    pub translated: bool,
    /// Researcher hops
    pub hops: usize,
    /// Whether the researcher fell back after unusable resolver output
    pub fallback: bool,
    /// Nodes visited, in order
    pub path: Vec<PipelineNode>,
}

/// Researcher followed by an optional translator
#[derive(Clone)]
pub struct Pipeline {
    researcher: ToolLoop,
    translator: Translator,
}

impl Pipeline {
    /// Build from the two stages
    pub fn new(researcher: ToolLoop, translator: Translator) -> Self {
        Self {
            researcher,
            translator,
        }
    }

    /// Run the graph once for the latest user turn
    pub async fn invoke(&self, state: PipelineState<'_>) -> Result<PipelineOutput> {
        let PipelineState {
            conversation,
            route_flag,
        } = state;
        info!(route_flag, "Pipeline started");

        let mut node = PipelineNode::Researcher;
        let mut path = vec![node];
        let mut working = String::new();
        let mut hops = 0;
        let mut fallback = false;
        let mut translated = false;

        loop {
            match node {
                PipelineNode::Researcher => {
                    let outcome = self.researcher.resolve_answer(conversation).await?;
                    hops = outcome.hops;
                    fallback = outcome.fallback;
                    working = outcome.answer;
                }
                PipelineNode::Translator => {
                    working = self.translator.translate(&working).await?;
                    translated = true;
                }
                PipelineNode::Done => {
                    conversation.push(Turn::assistant(working.clone()))?;
                    debug!(?path, "Pipeline finished");
                    return Ok(PipelineOutput {
                        answer: working,
                        translated,
                        hops,
                        fallback,
                        path,
                    });
                }
            }
            node = node.next(route_flag);
            path.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        assert_eq!(PipelineNode::Researcher.next(true), PipelineNode::Translator);
        assert_eq!(PipelineNode::Researcher.next(false), PipelineNode::Done);
        assert_eq!(PipelineNode::Translator.next(true), PipelineNode::Done);
        assert_eq!(PipelineNode::Translator.next(false), PipelineNode::Done);
    }
}
