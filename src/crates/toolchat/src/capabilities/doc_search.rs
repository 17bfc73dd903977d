//! Retrieval over the uploaded documents

use crate::capabilities::EMPTY_KNOWLEDGE;
use crate::knowledge::KnowledgeBase;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use toolchat_prebuilt::{Capability, InputSchema, ParamType, PrebuiltError, Result};
use tracing::debug;

/// `internal_doc_search`
pub struct DocSearchCapability {
    knowledge: Arc<KnowledgeBase>,
}

impl DocSearchCapability {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }
}

#[async_trait]
impl Capability for DocSearchCapability {
    fn name(&self) -> &str {
        "internal_doc_search"
    }

    fn description(&self) -> &str {
        "Find passages in the documents the user uploaded that are relevant to a specific question."
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().required("query", ParamType::String, "What to look for")
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String> {
        let query = arguments
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| PrebuiltError::InvalidArguments("query is required".to_string()))?;

        let hits = match self.knowledge.search(query).await {
            Ok(Some(hits)) => hits,
            Ok(None) => return Ok(EMPTY_KNOWLEDGE.to_string()),
            Err(e) => return Err(PrebuiltError::CapabilityExecution(e.to_string())),
        };
        debug!(query, hits = hits.len(), "Document search finished");

        if hits.is_empty() {
            return Ok("No relevant passages found in the uploaded documents.".to_string());
        }
        Ok(hits
            .iter()
            .enumerate()
            .map(|(i, hit)| format!("[{}] ({}) {}", i + 1, hit.source, hit.text))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
