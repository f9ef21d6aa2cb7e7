//! Search tools the router model can call

mod arxiv;
mod google;
mod knowledge_base;
mod wikipedia;

use std::sync::Arc;

use reqwest::Client;
use std::time::Duration;

use arag_core::{Error, Result, Tool, ToolSpec};

pub use arxiv::ArxivSearchTool;
pub use google::GoogleSearchTool;
pub use knowledge_base::KnowledgeBaseTool;
pub use wikipedia::WikipediaSearchTool;

/// Longest tool output handed back to the model, in chars
pub const MAX_TOOL_OUTPUT_CHARS: usize = 1000;

/// Search queries longer than this are cut before they are sent
pub const MAX_QUERY_CHARS: usize = 300;

/// Ordered collection of tools offered to the router
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Specs of every registered tool, in registration order
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// HTTP client shared by the web search tools
pub(crate) fn http_client(user_agent: &str) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| Error::Network(e.to_string()))
}

/// Cut `text` to at most `max` chars
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
