//! Knowledge-base indexer

use serde_json::json;
use std::sync::Arc;

use arag_core::{
    Document, DocumentLoader, Embedder, IndexingConfig, IndexingResult,
    VectorDocument, VectorStore, Error, Result,
};

use crate::splitter::RecursiveTextSplitter;

/// Loads URLs, splits them into chunks, embeds the chunks and stores them
pub struct KnowledgeBaseIndexer<V: VectorStore> {
    vector_store: Arc<V>,
    embedder: Arc<dyn Embedder>,
    config: IndexingConfig,
    splitter: RecursiveTextSplitter,
}

impl<V: VectorStore> KnowledgeBaseIndexer<V> {
    /// Create a new indexer with the default chunking configuration
    pub fn new(vector_store: Arc<V>, embedder: Arc<dyn Embedder>) -> Self {
        Self::with_config(vector_store, embedder, IndexingConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(vector_store: Arc<V>, embedder: Arc<dyn Embedder>, config: IndexingConfig) -> Self {
        let splitter = RecursiveTextSplitter::from_config(&config);
        Self {
            vector_store,
            embedder,
            config,
            splitter,
        }
    }

    /// Split a loaded document into unembedded chunks
    pub fn chunk_document(&self, document: &Document) -> Vec<VectorDocument> {
        let source = document.url.clone().unwrap_or_else(|| document.id.clone());
        let source_hash = format!("{:x}", md5::compute(source.as_bytes()));
        let pieces = self.splitter.split_text(&document.content);
        let total = pieces.len();

        pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| {
                let mut metadata = document.metadata.clone();
                if !metadata.is_object() {
                    metadata = json!({});
                }
                metadata["source"] = json!(source);
                metadata["title"] = json!(document.title);
                metadata["chunk_index"] = json!(i);
                metadata["total_chunks"] = json!(total);

                VectorDocument {
                    id: format!("{}-{}", source_hash, i),
                    content,
                    embedding: None,
                    metadata,
                    score: None,
                }
            })
            .collect()
    }

    /// Embed and store chunks in batches
    pub async fn index_chunks(&self, chunks: Vec<VectorDocument>) -> Result<usize> {
        let mut indexed = 0;
        let batch_size = self.config.batch_size.max(1);

        let mut remaining = chunks.into_iter().peekable();
        while remaining.peek().is_some() {
            let mut batch: Vec<VectorDocument> = remaining.by_ref().take(batch_size).collect();
            let inputs: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed(&inputs).await?;
            if vectors.len() != batch.len() {
                return Err(Error::DocumentIndexer(format!(
                    "Embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }
            for (chunk, vector) in batch.iter_mut().zip(vectors) {
                chunk.embedding = Some(vector);
            }
            indexed += self.vector_store.store_batch(batch).await?.len();
        }

        Ok(indexed)
    }

    /// Load and index every URL
    ///
    /// A URL that fails to load is logged and skipped. Fails only when no URL loads.
    pub async fn index_urls(&self, loader: &dyn DocumentLoader, urls: &[String]) -> Result<IndexingResult> {
        tracing::info!(count = urls.len(), "Loading documents from URLs");

        let mut result = IndexingResult::default();
        let mut chunks = Vec::new();

        for url in urls {
            match loader.load(url).await {
                Ok(document) => {
                    let document_chunks = self.chunk_document(&document);
                    tracing::info!(url = %url, chunks = document_chunks.len(), "Loaded document");
                    result.documents_loaded += 1;
                    chunks.extend(document_chunks);
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Failed to load document");
                    result.documents_failed += 1;
                    result.errors.push(format!("Failed to load {}: {}", url, e));
                }
            }
        }

        if result.documents_loaded == 0 {
            return Err(Error::DocumentIndexer(
                "Failed to load any documents from the provided URLs".to_string(),
            ));
        }

        tracing::info!(chunks = chunks.len(), "Split documents into chunks");
        result.chunks_indexed = self.index_chunks(chunks).await?;
        Ok(result)
    }
}
