//! Whole-document analysis through a separate model call

use crate::capabilities::EMPTY_KNOWLEDGE;
use crate::knowledge::KnowledgeBase;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use toolchat_core::llm::{ChatModel, ChatRequest};
use toolchat_core::{CoreError, Turn};
use toolchat_prebuilt::{Capability, InputSchema, ParamType, PrebuiltError, Result};
use tracing::debug;

/// `whole_document_analysis`
///
/// Sends the ingested text, cut to the analysis budget, as context of a
/// fresh conversation; the session's log is never part of that call.
pub struct DocAnalysisCapability {
    knowledge: Arc<KnowledgeBase>,
    model: Arc<dyn ChatModel>,
    instruction: String,
}

impl DocAnalysisCapability {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        model: Arc<dyn ChatModel>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            knowledge,
            model,
            instruction: instruction.into(),
        }
    }

    fn request(&self, document: &str, question: &str) -> ChatRequest {
        let system = format!(
            "{}\n\n<document>\n{}\n</document>",
            self.instruction, document
        );
        ChatRequest::new(vec![Turn::system(system), Turn::user(question)])
    }
}

#[async_trait]
impl Capability for DocAnalysisCapability {
    fn name(&self) -> &str {
        "whole_document_analysis"
    }

    fn description(&self) -> &str {
        "Answer questions that need the whole uploaded document, such as summaries, outlines or overall conclusions."
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().required(
            "question",
            ParamType::String,
            "What to find out about the document as a whole",
        )
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String> {
        let question = arguments
            .get("question")
            .and_then(Value::as_str)
            .ok_or_else(|| PrebuiltError::InvalidArguments("question is required".to_string()))?;

        let Some(document) = self.knowledge.analysis_text() else {
            return Ok(EMPTY_KNOWLEDGE.to_string());
        };
        debug!(chars = document.chars().count(), "Analysing whole document");

        let response = self.model.chat(self.request(&document, question)).await?;
        response
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or(PrebuiltError::Core(CoreError::EmptyResponse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KnowledgeConfig;
    use crate::knowledge::{Document, DocumentFormat};
    use toolchat_core::testing::{HashEmbedder, ScriptedModel};

    fn knowledge(budget: usize) -> Arc<KnowledgeBase> {
        Arc::new(KnowledgeBase::new(
            Arc::new(HashEmbedder::default()),
            KnowledgeConfig {
                analysis_char_budget: budget,
                ..KnowledgeConfig::default()
            },
        ))
    }

    fn question(text: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("question".to_string(), Value::String(text.to_string()));
        map
    }

    #[tokio::test]
    async fn test_empty_knowledge_skips_model() {
        let model = Arc::new(ScriptedModel::new());
        let capability = DocAnalysisCapability::new(knowledge(100), model.clone(), "Analyse.");

        let text = capability.execute(&question("summary?")).await.unwrap();

        assert_eq!(text, EMPTY_KNOWLEDGE);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_document_is_truncated_into_separate_call() {
        let kb = knowledge(5);
        kb.ingest(Document::new("d.txt", DocumentFormat::Txt, "abcdefghij"))
            .await
            .unwrap();
        let model = Arc::new(ScriptedModel::new().then_text("It is about letters."));
        let capability = DocAnalysisCapability::new(kb, model.clone(), "Analyse.");

        let answer = capability.execute(&question("What is it about?")).await.unwrap();

        assert_eq!(answer, "It is about letters.");
        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].turns.len(), 2);
        assert!(!requests[0].has_tools());
        let system = requests[0].turns[0].text().unwrap();
        assert!(system.contains("abcde"));
        assert!(!system.contains("abcdef"));
        assert_eq!(requests[0].turns[1].text(), Some("What is it about?"));
    }
}
