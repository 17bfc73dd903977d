//! Shared fixtures for toolchat integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use toolchat::capabilities::{SearchClient, SearchHit};
use toolchat::{ChatSession, Providers, SessionMode, ToolchatConfig};
use toolchat_core::testing::{HashEmbedder, ScriptedModel};

/// Search client returning canned hits and recording queries
#[derive(Default)]
pub struct CannedSearch {
    pub hits: Vec<SearchHit>,
    pub queries: Mutex<Vec<String>>,
}

impl CannedSearch {
    pub fn with_hits(titles: &[&str]) -> Self {
        Self {
            hits: titles
                .iter()
                .map(|title| SearchHit {
                    title: title.to_string(),
                    content: format!("{} content", title),
                    url: format!("https://example.com/{}", title),
                })
                .collect(),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchClient for CannedSearch {
    async fn search(&self, query: &str, max_results: usize) -> toolchat::Result<Vec<SearchHit>> {
        self.queries.lock().push(query.to_string());
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }

    fn provider_name(&self) -> &str {
        "canned"
    }
}

/// Defaults with keys stripped so nothing reaches the network
pub fn offline_config() -> ToolchatConfig {
    let mut config = ToolchatConfig::default();
    config.llm.api_key = None;
    config.search.api_key = None;
    config
}

pub fn providers(model: Arc<ScriptedModel>) -> Providers {
    Providers::new(model, Arc::new(HashEmbedder::default()))
}

/// Session over a scripted model and a canned search client
pub fn session(
    config: ToolchatConfig,
    mode: SessionMode,
    model: Arc<ScriptedModel>,
    search: Arc<CannedSearch>,
) -> ChatSession {
    ChatSession::builder(config, providers(model))
        .with_mode(mode)
        .with_search_client(search)
        .build()
        .expect("session builds")
}
