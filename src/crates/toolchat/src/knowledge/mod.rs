//! Session-shared knowledge base: vector index plus raw text
//!
//! Readers take an `Arc` snapshot under a read lock. An ingestion embeds its
//! chunks without holding any lock, then builds the merged index and swaps
//! it in under the write lock, so merges exclude each other and are never
//! seen half-done.

pub mod index;
pub mod ingest;

pub use index::{cosine_similarity, Chunk, ScoredChunk, VectorIndex};
pub use ingest::{chunk_text, extract_text, fingerprint, Document, DocumentFormat};

use crate::config::KnowledgeConfig;
use crate::error::{Result, ToolchatError};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use toolchat_core::llm::EmbeddingModel;
use tracing::{debug, info};

/// What an upload did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The document was chunked, embedded and merged
    Ingested {
        /// Document name
        document: String,
        /// Chunks added to the index
        chunks: usize,
    },
    /// The same bytes were ingested before; nothing changed
    AlreadyKnown {
        /// Document name
        document: String,
    },
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestOutcome::Ingested { document, chunks } => {
                write!(f, "Ingested {} ({} chunks)", document, chunks)
            }
            IngestOutcome::AlreadyKnown { document } => {
                write!(f, "{} is already known, skipped", document)
            }
        }
    }
}

struct KnowledgeState {
    index: Option<Arc<VectorIndex>>,
    raw_text: Arc<str>,
    fingerprints: HashSet<String>,
    documents: Vec<String>,
    merges: usize,
}

impl Default for KnowledgeState {
    fn default() -> Self {
        Self {
            index: None,
            raw_text: Arc::from(""),
            fingerprints: HashSet::new(),
            documents: Vec::new(),
            merges: 0,
        }
    }
}

/// Index and raw text shared by the retrieval capabilities
pub struct KnowledgeBase {
    embedder: Arc<dyn EmbeddingModel>,
    settings: KnowledgeConfig,
    state: RwLock<KnowledgeState>,
}

impl KnowledgeBase {
    /// Empty knowledge base
    pub fn new(embedder: Arc<dyn EmbeddingModel>, settings: KnowledgeConfig) -> Self {
        Self {
            embedder,
            settings,
            state: RwLock::new(KnowledgeState::default()),
        }
    }

    /// Retrieval and chunking settings
    pub fn settings(&self) -> &KnowledgeConfig {
        &self.settings
    }

    /// Current index, `None` before the first ingestion
    pub fn snapshot(&self) -> Option<Arc<VectorIndex>> {
        self.state.read().index.clone()
    }

    /// Concatenated text of every ingested document
    pub fn raw_text(&self) -> Arc<str> {
        self.state.read().raw_text.clone()
    }

    /// Whether anything has been ingested
    pub fn is_empty(&self) -> bool {
        self.state.read().index.is_none()
    }

    /// Index swaps performed so far
    pub fn merge_count(&self) -> usize {
        self.state.read().merges
    }

    /// Names of ingested documents, in order
    pub fn documents(&self) -> Vec<String> {
        self.state.read().documents.clone()
    }

    /// Whether these exact bytes were ingested already
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.state.read().fingerprints.contains(fingerprint)
    }

    /// Parse, chunk, embed and merge one document
    ///
    /// Failures leave the index and raw text untouched.
    pub async fn ingest(&self, document: Document) -> Result<IngestOutcome> {
        let fingerprint = document.fingerprint();
        if self.contains(&fingerprint) {
            info!(document = %document.name, "Document already ingested, skipping");
            return Ok(IngestOutcome::AlreadyKnown {
                document: document.name,
            });
        }

        let name = document.name.clone();
        let text = tokio::task::spawn_blocking(move || extract_text(&document))
            .await
            .map_err(|e| ToolchatError::Ingestion(format!("text extraction aborted: {}", e)))??;

        let pieces = chunk_text(&text, self.settings.chunk_size, self.settings.chunk_overlap);
        if pieces.is_empty() {
            return Err(ToolchatError::Ingestion(format!("{} contains no text", name)));
        }

        let embeddings = self
            .embedder
            .embed(&pieces)
            .await
            .map_err(|e| ToolchatError::Ingestion(format!("embedding {} failed: {}", name, e)))?;
        if embeddings.len() != pieces.len() {
            return Err(ToolchatError::Ingestion(format!(
                "embedding service returned {} vectors for {} chunks",
                embeddings.len(),
                pieces.len()
            )));
        }

        let chunk_count = pieces.len();
        let fresh = VectorIndex::from_chunks(
            pieces
                .into_iter()
                .zip(embeddings)
                .map(|(text, embedding)| Chunk {
                    text,
                    source: name.clone(),
                    embedding,
                })
                .collect(),
        );

        let mut state = self.state.write();
        // A concurrent upload of the same bytes may have won the race.
        if state.fingerprints.contains(&fingerprint) {
            return Ok(IngestOutcome::AlreadyKnown { document: name });
        }

        let merged = match &state.index {
            Some(current) => current.merged(&fresh),
            None => fresh,
        };
        state.index = Some(Arc::new(merged));

        let mut raw = String::with_capacity(state.raw_text.len() + text.len() + 2);
        raw.push_str(&state.raw_text);
        if !raw.is_empty() {
            raw.push_str("\n\n");
        }
        raw.push_str(&text);
        state.raw_text = Arc::from(raw);

        state.fingerprints.insert(fingerprint);
        state.documents.push(name.clone());
        state.merges += 1;

        debug!(document = %name, chunks = chunk_count, merges = state.merges, "Index swapped");
        Ok(IngestOutcome::Ingested {
            document: name,
            chunks: chunk_count,
        })
    }

    /// Top-k chunks for `query`; `None` when nothing has been ingested
    pub async fn search(&self, query: &str) -> Result<Option<Vec<ScoredChunk>>> {
        let Some(index) = self.snapshot() else {
            return Ok(None);
        };
        let vector = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| ToolchatError::Llm(format!("embedding query failed: {}", e)))?;
        Ok(Some(index.search(&vector, self.settings.top_k)))
    }

    /// Raw text cut to the analysis budget; `None` when nothing has been ingested
    pub fn analysis_text(&self) -> Option<String> {
        let raw = self.raw_text();
        if raw.is_empty() {
            return None;
        }
        Some(raw.chars().take(self.settings.analysis_char_budget).collect())
    }
}

impl fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("KnowledgeBase")
            .field("documents", &state.documents)
            .field("chunks", &state.index.as_ref().map(|i| i.len()).unwrap_or(0))
            .field("merges", &state.merges)
            .finish()
    }
}
