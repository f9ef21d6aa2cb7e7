//! Knowledge-base retriever

use std::sync::Arc;

use arag_core::{Embedder, Result, SearchConfig, VectorDocument, VectorStore};

/// Embeds a query and returns the closest stored chunks
pub struct KnowledgeBaseRetriever<V: VectorStore> {
    vector_store: Arc<V>,
    embedder: Arc<dyn Embedder>,
    search: SearchConfig,
}

impl<V: VectorStore> KnowledgeBaseRetriever<V> {
    /// Retriever returning the top 4 chunks
    pub fn new(vector_store: Arc<V>, embedder: Arc<dyn Embedder>) -> Self {
        Self::with_search_config(vector_store, embedder, SearchConfig::default())
    }

    pub fn with_search_config(vector_store: Arc<V>, embedder: Arc<dyn Embedder>, search: SearchConfig) -> Self {
        Self {
            vector_store,
            embedder,
            search,
        }
    }

    /// Retrieve the most similar chunks for `query`
    pub async fn retrieve(&self, query: &str) -> Result<Vec<VectorDocument>> {
        let vector = self.embedder.embed_query(query).await?;
        let result = self.vector_store.search_by_vector(&vector, &self.search).await?;
        Ok(result.documents)
    }

    /// Retrieve and join chunk contents with blank lines
    pub async fn retrieve_text(&self, query: &str) -> Result<String> {
        let documents = self.retrieve(query).await?;
        Ok(Self::build_context(&documents))
    }

    pub fn build_context(documents: &[VectorDocument]) -> String {
        documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Number of stored chunks
    pub async fn size(&self) -> Result<usize> {
        self.vector_store.count().await
    }
}
