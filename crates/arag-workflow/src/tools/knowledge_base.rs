use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use arag_core::tool::string_argument;
use arag_core::{Result, Tool, ToolSpec, VectorStore};
use arag_rag::KnowledgeBaseRetriever;

use crate::prompts::KNOWLEDGE_BASE_SEARCH_DESCRIPTION;

/// Searches the indexed documentation
pub struct KnowledgeBaseTool<V: VectorStore> {
    retriever: Arc<KnowledgeBaseRetriever<V>>,
}

impl<V: VectorStore> KnowledgeBaseTool<V> {
    pub fn new(retriever: Arc<KnowledgeBaseRetriever<V>>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl<V: VectorStore + 'static> Tool for KnowledgeBaseTool<V> {
    fn spec(&self) -> ToolSpec {
        ToolSpec::single_string_arg("knowledge_base_search", KNOWLEDGE_BASE_SEARCH_DESCRIPTION, "query")
    }

    async fn invoke(&self, arguments: &Value) -> Result<String> {
        let query = string_argument(arguments, "query")?;
        self.retriever.retrieve_text(&query).await
    }
}
