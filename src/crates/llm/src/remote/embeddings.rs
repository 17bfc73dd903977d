//! OpenAI-compatible embeddings client.

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::retry::{with_retry, RetryPolicy};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use toolchat_core::llm::EmbeddingModel;
use tracing::debug;

/// Inputs per `/embeddings` request; DashScope caps batches at 10.
const DEFAULT_BATCH_SIZE: usize = 10;

/// Client for an `/embeddings` endpoint.
#[derive(Clone)]
pub struct OpenAiEmbeddings {
    config: RemoteLlmConfig,
    client: Client,
    retry: RetryPolicy,
    batch_size: usize,
}

impl OpenAiEmbeddings {
    /// Create a client; `config.model` names the embedding model.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let retry = RetryPolicy::with_max_retries(config.max_retries);
        Ok(Self {
            config,
            client,
            retry,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Change how many inputs go into one request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: inputs,
        };
        let url = self.config.endpoint("embeddings");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, error_text));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        order_embeddings(parsed, inputs.len())
    }
}

/// Put vectors back in input order and check none is missing.
fn order_embeddings(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    if data.len() != expected {
        return Err(LlmError::InvalidResponse(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingModel for OpenAiEmbeddings {
    async fn embed(&self, inputs: &[String]) -> toolchat_core::Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(self.batch_size) {
            debug!(model = %self.config.model, inputs = batch.len(), "Requesting embeddings");
            let mut out = with_retry(&self.retry, "embeddings", || self.embed_batch(batch)).await?;
            vectors.append(&mut out);
        }
        Ok(vectors)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
