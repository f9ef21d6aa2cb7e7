//! Chat model and embedder traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, ToolSpec};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single message in a chat exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Request sent to a chat model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolSpec>,
    /// When set, the model must answer by calling this tool. Used for structured output.
    pub forced_tool: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Plain request with temperature 0 and no tools
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            forced_tool: None,
            temperature: 0.0,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Force the model to reply through `spec`, exposing it as the only tool
    pub fn with_structured_output(mut self, spec: ToolSpec) -> Self {
        self.forced_tool = Some(spec.name.clone());
        self.tools = vec![spec];
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Content of the first system message, if any
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// Content of the last user message, if any
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Reply from a chat model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), tool_calls: Vec::new() }
    }

    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self { content: None, tool_calls }
    }

    /// Reply text, or an empty string when the model only called tools
    pub fn text_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Trait for chat completion providers (e.g., Azure OpenAI)
///
/// Implementations translate a provider-neutral [`ChatRequest`] into the
/// provider's wire format, including tool definitions and forced tool choice.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one chat completion
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Get the model or deployment being used
    fn model_id(&self) -> &str;
}

/// Trait for text embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each input, returning vectors in input order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[query.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| crate::Error::LLMProvider("Embedding response was empty".to_string()))
    }
}
