//! The capabilities this application offers the model
//!
//! Configuration names are parsed into [`CapabilityKind`] so a typo is a
//! configuration error, not a silently missing tool. [`build_registry`]
//! turns kinds into executors wired to the shared collaborators.

pub mod doc_analysis;
pub mod doc_search;
pub mod weather;
pub mod web_search;

pub use doc_analysis::DocAnalysisCapability;
pub use doc_search::DocSearchCapability;
pub use weather::WeatherCapability;
pub use web_search::{format_hits, SearchClient, SearchHit, TavilyClient, WebSearchCapability};

use crate::config::WeatherConfig;
use crate::error::{Result, ToolchatError};
use crate::knowledge::KnowledgeBase;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use toolchat_core::llm::ChatModel;
use toolchat_prebuilt::{Capability, CapabilityRegistry};

/// Returned by the document capabilities before anything is uploaded
pub const EMPTY_KNOWLEDGE: &str =
    "The knowledge base is empty: no document has been uploaded yet. Ask the user to upload one first.";

/// Closed set of capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Weather,
    WebSearch,
    InternalDocSearch,
    WholeDocumentAnalysis,
}

impl CapabilityKind {
    /// Every capability, in the order they are offered to the model
    pub const ALL: [CapabilityKind; 4] = [
        CapabilityKind::Weather,
        CapabilityKind::WebSearch,
        CapabilityKind::InternalDocSearch,
        CapabilityKind::WholeDocumentAnalysis,
    ];

    /// The researcher's capabilities in pipeline mode
    pub const RESEARCH: [CapabilityKind; 3] = [
        CapabilityKind::WebSearch,
        CapabilityKind::InternalDocSearch,
        CapabilityKind::WholeDocumentAnalysis,
    ];

    /// Name shown to the model
    pub fn name(&self) -> &'static str {
        match self {
            CapabilityKind::Weather => "get_weather",
            CapabilityKind::WebSearch => "web_search",
            CapabilityKind::InternalDocSearch => "internal_doc_search",
            CapabilityKind::WholeDocumentAnalysis => "whole_document_analysis",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CapabilityKind {
    type Err = ToolchatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "get_weather" | "weather" => Ok(CapabilityKind::Weather),
            "web_search" => Ok(CapabilityKind::WebSearch),
            "internal_doc_search" => Ok(CapabilityKind::InternalDocSearch),
            "whole_document_analysis" => Ok(CapabilityKind::WholeDocumentAnalysis),
            other => Err(ToolchatError::Config(format!(
                "unknown capability '{}' (expected one of: {})",
                other,
                CapabilityKind::ALL.map(|k| k.name()).join(", ")
            ))),
        }
    }
}

/// Shared collaborators the executors are wired to
#[derive(Clone)]
pub struct CapabilityContext {
    pub weather: WeatherConfig,
    pub search: Option<Arc<dyn SearchClient>>,
    pub search_results: usize,
    pub knowledge: Arc<KnowledgeBase>,
    pub analyst: Arc<dyn ChatModel>,
    pub analyst_prompt: String,
}

impl CapabilityContext {
    /// Executor for one kind
    pub fn build(&self, kind: CapabilityKind) -> Arc<dyn Capability> {
        match kind {
            CapabilityKind::Weather => Arc::new(WeatherCapability::new(self.weather.clone())),
            CapabilityKind::WebSearch => {
                Arc::new(WebSearchCapability::new(self.search.clone(), self.search_results))
            }
            CapabilityKind::InternalDocSearch => {
                Arc::new(DocSearchCapability::new(self.knowledge.clone()))
            }
            CapabilityKind::WholeDocumentAnalysis => Arc::new(DocAnalysisCapability::new(
                self.knowledge.clone(),
                self.analyst.clone(),
                self.analyst_prompt.clone(),
            )),
        }
    }
}

/// Registry holding the given kinds, in order
pub fn build_registry(kinds: &[CapabilityKind], context: &CapabilityContext) -> Result<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new();
    for kind in kinds {
        registry.register(context.build(*kind))?;
    }
    Ok(registry)
}
