//! Source documents and indexing types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A loaded source document, before chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub metadata: serde_json::Value,
}

/// Result of an indexing operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexingResult {
    pub documents_loaded: usize,
    pub documents_failed: usize,
    pub chunks_indexed: usize,
    pub errors: Vec<String>,
}

/// Configuration for document indexing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Number of chunks embedded per request
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            batch_size: 16,
        }
    }
}

/// Trait for loaders that turn a source location into a [`Document`]
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load a single document from a URL
    async fn load(&self, url: &str) -> Result<Document>;
}
