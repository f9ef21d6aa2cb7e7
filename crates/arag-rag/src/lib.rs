//! Knowledge base for the agentic RAG workspace
//!
//! This crate loads web pages, splits them into overlapping chunks, embeds them into
//! an in-memory vector store and retrieves the closest chunks for a query.

mod splitter;
mod loader;
mod vector_store;
mod indexer;
mod retriever;

#[cfg(test)]
mod tests;

pub use splitter::RecursiveTextSplitter;
pub use loader::{WebDocumentLoader, DEFAULT_USER_AGENT};
pub use vector_store::LocalVectorStore;
pub use indexer::KnowledgeBaseIndexer;
pub use retriever::KnowledgeBaseRetriever;

// Re-export core types for convenience
pub use arag_core::{
    VectorStore, VectorDocument, SearchResult, SearchConfig,
    Document, DocumentLoader, IndexingResult, IndexingConfig,
    Embedder, Error, Result,
};
