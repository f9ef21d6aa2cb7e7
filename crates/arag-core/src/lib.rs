//! Core traits and types for the agentic RAG workspace
//!
//! This crate defines the capability-facing interfaces shared by the other crates:
//! chat models, embedders, tools, vector stores and documents. Keeping them here
//! lets the workflow run against scripted test doubles as easily as against Azure OpenAI.

pub mod error;
pub mod llm;
pub mod tool;
pub mod vector_store;
pub mod document;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use llm::{ChatModel, ChatMessage, ChatRequest, ChatResponse, Embedder, Role, ToolCall};
pub use tool::{Tool, ToolSpec};
pub use vector_store::{VectorStore, VectorDocument, SearchResult, SearchConfig};
pub use document::{Document, DocumentLoader, IndexingResult, IndexingConfig};
pub use types::*;
