//! In-memory cosine index
//!
//! Immutable once built; merging produces a new index so readers holding a
//! snapshot never observe a partial update.

use std::cmp::Ordering;

/// One embedded piece of a document
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// Name of the document it came from
    pub source: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// A retrieval hit
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// Chunk text
    pub text: String,
    /// Source document
    pub source: String,
    /// Cosine similarity to the query
    pub score: f32,
}

/// Flat list of chunks searched by brute force
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
}

impl VectorIndex {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index over prepared chunks
    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether there is nothing to search
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunks in insertion order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// New index holding `self`'s chunks followed by `other`'s
    pub fn merged(&self, other: &VectorIndex) -> VectorIndex {
        let mut chunks = Vec::with_capacity(self.len() + other.len());
        chunks.extend_from_slice(&self.chunks);
        chunks.extend_from_slice(&other.chunks);
        VectorIndex { chunks }
    }

    /// The `top_k` chunks most similar to `query`, best first
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(f32, &Chunk)> = self
            .chunks
            .iter()
            .map(|chunk| (cosine_similarity(query, &chunk.embedding), chunk))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored
            .into_iter()
            .take(top_k)
            .map(|(score, chunk)| ScoredChunk {
                text: chunk.text.clone(),
                source: chunk.source.clone(),
                score,
            })
            .collect()
    }
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            text: text.to_string(),
            source: "doc.txt".to_string(),
            embedding,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_search_ranks_and_truncates() {
        let index = VectorIndex::from_chunks(vec![
            chunk("east", vec![1.0, 0.0]),
            chunk("north", vec![0.0, 1.0]),
            chunk("north-east", vec![0.7, 0.7]),
        ]);

        let hits = index.search(&[0.0, 1.0], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "north");
        assert_eq!(hits[1].text, "north-east");
    }

    #[test]
    fn test_merged_leaves_inputs_untouched() {
        let a = VectorIndex::from_chunks(vec![chunk("a", vec![1.0])]);
        let b = VectorIndex::from_chunks(vec![chunk("b", vec![1.0])]);

        let merged = a.merged(&b);
        assert_eq!(merged.len(), 2);
        assert_eq!(a.len(), 1);
        assert_eq!(merged.chunks()[1].text, "b");
    }
}
