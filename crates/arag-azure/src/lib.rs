//! Azure OpenAI integration for the agentic RAG workspace
//!
//! This crate provides the Azure OpenAI implementation of the `ChatModel` and
//! `Embedder` traits.

mod client;
mod config;


pub use client::AzureOpenAIClient;
pub use config::AzureOpenAIConfig;

// Re-export core types for convenience
pub use arag_core::{
    ChatModel, ChatRequest, ChatResponse, Embedder, RetryConfig, Error, Result,
};
