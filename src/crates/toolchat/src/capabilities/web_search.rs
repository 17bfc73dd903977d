//! Web search capability and the Tavily client behind it

use crate::config::SearchConfig;
use crate::error::{Result as AppResult, ToolchatError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use toolchat_prebuilt::{Capability, InputSchema, ParamType, PrebuiltError, Result};
use tracing::{debug, warn};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// One search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub content: String,
    pub url: String,
}

/// Search provider seam
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Up to `max_results` hits, best first
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<SearchHit>>;

    fn provider_name(&self) -> &str;
}

/// Tavily search client, tuned for LLM consumption
pub struct TavilyClient {
    api_key: String,
    endpoint: String,
    http_client: Client,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolchatError::Search(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            api_key: api_key.into(),
            endpoint: TAVILY_SEARCH_URL.to_string(),
            http_client,
        })
    }

    /// Client from `[search]`; `None` when no key is configured
    pub fn from_config(config: &SearchConfig) -> AppResult<Option<Self>> {
        match &config.api_key {
            Some(key) => Self::new(key.clone(), Duration::from_secs(config.timeout_secs)).map(Some),
            None => Ok(None),
        }
    }

    /// Point at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<SearchHit>> {
        let request = TavilySearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
            search_depth: "basic",
            include_answer: false,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ToolchatError::Search(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => ToolchatError::Search("invalid Tavily API key".to_string()),
                429 => ToolchatError::Search("Tavily rate limit exceeded".to_string()),
                _ => ToolchatError::Search(format!("Tavily API error {}: {}", status, error_text)),
            });
        }

        let body: TavilySearchResponse = response
            .json()
            .await
            .map_err(|e| ToolchatError::Search(format!("Failed to parse Tavily response: {}", e)))?;

        Ok(body
            .results
            .into_iter()
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title,
                content: r.content,
                url: r.url,
            })
            .collect())
    }

    fn provider_name(&self) -> &str {
        "Tavily"
    }
}

/// Title + content blocks separated by blank lines
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("Title: {}\nContent: {}", hit.title, hit.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `web_search`
pub struct WebSearchCapability {
    client: Option<Arc<dyn SearchClient>>,
    max_results: usize,
}

impl WebSearchCapability {
    /// `client = None` keeps the capability registered but reports it unconfigured
    pub fn new(client: Option<Arc<dyn SearchClient>>, max_results: usize) -> Self {
        Self {
            client,
            max_results: max_results.max(1),
        }
    }
}

#[async_trait]
impl Capability for WebSearchCapability {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date information: news, events, prices, anything after the model's training data."
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().required("query", ParamType::String, "Search query")
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String> {
        let query = arguments
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| PrebuiltError::InvalidArguments("query is required".to_string()))?;

        let client = self.client.as_ref().ok_or_else(|| {
            PrebuiltError::CapabilityExecution(format!(
                "web search is not configured: set [search].api_key or export {}",
                crate::config::schema::SEARCH_API_KEY_ENV
            ))
        })?;

        let hits = client.search(query, self.max_results).await.map_err(|e| {
            warn!(provider = client.provider_name(), error = %e, "Web search failed");
            PrebuiltError::CapabilityExecution(e.to_string())
        })?;
        debug!(query, hits = hits.len(), "Web search finished");

        if hits.is_empty() {
            return Ok(format!("No web results found for '{}'.", query));
        }
        Ok(format_hits(&hits))
    }
}
