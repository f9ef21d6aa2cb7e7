//! In-memory vector store

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use arag_core::{
    VectorStore, VectorDocument, SearchResult, SearchConfig,
    Error, Result,
};

/// Local in-memory vector store with exact cosine search
///
/// Documents keep insertion order; storing an id that already exists replaces it in place.
pub struct LocalVectorStore {
    documents: Arc<RwLock<Vec<VectorDocument>>>,
}

impl LocalVectorStore {
    /// Create a new local vector store
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Cosine similarity; zero for mismatched lengths or zero vectors
    pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
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
}

impl Default for LocalVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let mut docs = self.documents.write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            if document.embedding.is_none() {
                return Err(Error::VectorStore(format!(
                    "Document {} has no embedding",
                    document.id
                )));
            }
            ids.push(document.id.clone());
            match docs.iter_mut().find(|d| d.id == document.id) {
                Some(existing) => *existing = document,
                None => docs.push(document),
            }
        }

        Ok(ids)
    }

    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        let docs = self.documents.read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut results: Vec<VectorDocument> = docs
            .iter()
            .filter_map(|doc| {
                let embedding = doc.embedding.as_ref()?;
                let score = Self::cosine_similarity(vector, embedding);
                if config.score_threshold.is_some_and(|threshold| score < threshold) {
                    return None;
                }
                let mut doc_with_score = doc.clone();
                doc_with_score.score = Some(score);
                Some(doc_with_score)
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        results.truncate(config.top_k);

        let total = results.len();

        Ok(SearchResult {
            documents: results,
            total,
        })
    }

    async fn clear(&self) -> Result<()> {
        let mut docs = self.documents.write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        docs.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let docs = self.documents.read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        Ok(docs.len())
    }
}
