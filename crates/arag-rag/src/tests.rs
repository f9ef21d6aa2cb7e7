//! Snapshot tests for knowledge-base components

#[cfg(test)]
mod snapshot_tests {
    use super::super::{KnowledgeBaseIndexer, KnowledgeBaseRetriever, LocalVectorStore};
    use arag_core::{Document, DocumentLoader, Embedder, Error, IndexingConfig, Result, VectorStore};
    use async_trait::async_trait;
    use insta::assert_yaml_snapshot;
    use serde_json::json;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::sync::Arc;

    const DIMENSION: usize = 64;

    /// Bag-of-words hash embedding, enough to make lexical overlap measurable
    struct HashEmbedder;

    #[async_trait]
    impl Embedder for HashEmbedder {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(inputs
                .iter()
                .map(|text| {
                    let mut embedding = vec![0.0; DIMENSION];
                    for word in text.to_lowercase().split_whitespace() {
                        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
                        let mut hasher = DefaultHasher::new();
                        word.hash(&mut hasher);
                        embedding[(hasher.finish() % DIMENSION as u64) as usize] += 1.0;
                    }
                    embedding
                })
                .collect())
        }
    }

    /// Serves fixed documents by URL; unknown URLs fail
    struct StaticLoader;

    #[async_trait]
    impl DocumentLoader for StaticLoader {
        async fn load(&self, url: &str) -> Result<Document> {
            let content = match url {
                "https://docs.example.com/rust" => {
                    "Rust ownership rules keep memory safe.\n\nBorrowing lets code read data without taking ownership."
                }
                "https://docs.example.com/tokio" => {
                    "Tokio is an asynchronous runtime.\n\nIt schedules tasks on a work-stealing pool."
                }
                _ => return Err(Error::Network(format!("unreachable: {}", url))),
            };
            Ok(Document {
                id: url.to_string(),
                title: "Docs".to_string(),
                content: content.to_string(),
                url: Some(url.to_string()),
                metadata: json!({"source": url}),
            })
        }
    }

    fn small_chunks() -> IndexingConfig {
        IndexingConfig {
            chunk_size: 60,
            chunk_overlap: 0,
            batch_size: 2,
        }
    }

    #[tokio::test]
    async fn test_indexing_result_snapshot() {
        let store = Arc::new(LocalVectorStore::new());
        let indexer = KnowledgeBaseIndexer::with_config(store.clone(), Arc::new(HashEmbedder), small_chunks());

        let urls = vec![
            "https://docs.example.com/rust".to_string(),
            "https://docs.example.com/missing".to_string(),
            "https://docs.example.com/tokio".to_string(),
        ];
        let result = indexer.index_urls(&StaticLoader, &urls).await.unwrap();

        assert_yaml_snapshot!(result, @r###"
        ---
        documents_loaded: 2
        documents_failed: 1
        chunks_indexed: 4
        errors:
          - "Failed to load https://docs.example.com/missing: Network error: unreachable: https://docs.example.com/missing"
        "###);
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_indexing_fails_when_nothing_loads() {
        let store = Arc::new(LocalVectorStore::new());
        let indexer = KnowledgeBaseIndexer::new(store, Arc::new(HashEmbedder));

        let err = indexer
            .index_urls(&StaticLoader, &["https://nowhere.example.com".to_string()])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Document indexer error: Failed to load any documents from the provided URLs"
        );
    }

    #[tokio::test]
    async fn test_chunk_metadata() {
        let store = Arc::new(LocalVectorStore::new());
        let indexer = KnowledgeBaseIndexer::with_config(store, Arc::new(HashEmbedder), small_chunks());
        let document = StaticLoader.load("https://docs.example.com/rust").await.unwrap();

        let chunks = indexer.chunk_document(&document);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "Rust ownership rules keep memory safe.");
        assert_eq!(chunks[1].metadata["chunk_index"], 1);
        assert_eq!(chunks[1].metadata["total_chunks"], 2);
        assert_eq!(chunks[1].metadata["source"], "https://docs.example.com/rust");
        assert!(chunks[0].id.ends_with("-0"));
    }

    #[tokio::test]
    async fn test_retriever_prefers_lexical_match() {
        let store = Arc::new(LocalVectorStore::new());
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder);
        let indexer = KnowledgeBaseIndexer::with_config(store.clone(), embedder.clone(), small_chunks());
        indexer
            .index_urls(
                &StaticLoader,
                &[
                    "https://docs.example.com/rust".to_string(),
                    "https://docs.example.com/tokio".to_string(),
                ],
            )
            .await
            .unwrap();

        let retriever = KnowledgeBaseRetriever::new(store, embedder);
        let documents = retriever.retrieve("asynchronous runtime tokio").await.unwrap();
        assert_eq!(documents.len(), 4);
        assert_eq!(documents[0].content, "Tokio is an asynchronous runtime.");

        let text = retriever.retrieve_text("asynchronous runtime tokio").await.unwrap();
        assert!(text.starts_with("Tokio is an asynchronous runtime.\n\n"));
        assert_eq!(retriever.size().await.unwrap(), 4);
    }
}
