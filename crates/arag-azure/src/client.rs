//! Azure OpenAI client implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::{sleep, timeout};

use arag_core::{
    ChatMessage, ChatModel, ChatRequest, ChatResponse, Embedder, Error, Result, RetryConfig,
    ToolCall,
};

use crate::config::AzureOpenAIConfig;

/// Azure OpenAI client for chat completions and embeddings
pub struct AzureOpenAIClient {
    config: AzureOpenAIConfig,
    retry: RetryConfig,
    client: Client,
}

#[derive(Serialize)]
pub(crate) struct FunctionDefinition<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Serialize)]
pub(crate) struct ToolDefinition<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDefinition<'a>,
}

#[derive(Serialize)]
pub(crate) struct NamedFunction<'a> {
    name: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: NamedFunction<'a>,
}

#[derive(Serialize)]
pub(crate) struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Deserialize)]
pub(crate) struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
pub(crate) struct WireToolCall {
    #[serde(default)]
    id: String,
    function: FunctionCall,
}

#[derive(Deserialize)]
pub(crate) struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
pub(crate) struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
pub(crate) struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
}

#[derive(Deserialize)]
pub(crate) struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
pub(crate) struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

impl<'a> CompletionRequest<'a> {
    pub(crate) fn from_request(request: &'a ChatRequest) -> Self {
        let tools = request
            .tools
            .iter()
            .map(|spec| ToolDefinition {
                kind: "function",
                function: FunctionDefinition {
                    name: &spec.name,
                    description: &spec.description,
                    parameters: &spec.parameters,
                },
            })
            .collect();

        let tool_choice = request.forced_tool.as_deref().map(|name| ToolChoice {
            kind: "function",
            function: NamedFunction { name },
        });

        Self {
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools,
            tool_choice,
        }
    }
}

impl CompletionResponse {
    /// Convert the first choice into a provider-neutral response
    pub(crate) fn into_chat_response(self) -> Result<ChatResponse> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::LLMProvider("Azure OpenAI returned no choices".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| -> Result<ToolCall> {
                let arguments = if call.function.arguments.trim().is_empty() {
                    Value::Object(Default::default())
                } else {
                    serde_json::from_str(&call.function.arguments).map_err(|e| {
                        Error::Serialization(format!(
                            "Invalid arguments for tool call '{}': {}",
                            call.function.name, e
                        ))
                    })?
                };
                Ok(ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ChatResponse {
            content: choice.message.content,
            tool_calls,
        })
    }
}

impl EmbeddingResponse {
    /// Vectors ordered by their request index
    pub(crate) fn into_vectors(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|d| d.index);
        self.data.into_iter().map(|d| d.embedding).collect()
    }
}

/// Whether a failed status is worth another attempt
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl AzureOpenAIClient {
    /// Create a new Azure OpenAI client from configuration
    pub fn new(config: AzureOpenAIConfig) -> Result<Self> {
        Self::with_retry(config, RetryConfig::default())
    }

    /// Create a client with a custom retry policy
    pub fn with_retry(config: AzureOpenAIConfig, retry: RetryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(retry.request_timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            retry,
            client,
        })
    }

    /// Create a new Azure OpenAI client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = AzureOpenAIConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &AzureOpenAIConfig {
        &self.config
    }

    /// POST a JSON body, retrying throttled and failed attempts
    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: for<'de> Deserialize<'de>,
    {
        let mut attempt = 1;
        loop {
            let outcome = self.send_once(url, body).await;
            match outcome {
                Ok(value) => return Ok(value),
                Err((err, retryable)) => {
                    if !retryable || attempt >= self.retry.max_attempts {
                        return Err(err);
                    }
                    let delay = self.retry.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Azure OpenAI request failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One HTTP round trip; the flag says whether the failure may be retried
    async fn send_once<B, T>(&self, url: &str, body: &B) -> std::result::Result<T, (Error, bool)>
    where
        B: Serialize + Sync,
        T: for<'de> Deserialize<'de>,
    {
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("api-key", &self.config.api_key)
            .json(body)
            .send();

        let response = match timeout(self.retry.request_timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err((Error::Network(e.to_string()), true)),
            Err(_) => return Err((Error::Timeout("Azure OpenAI request timed out".to_string()), true)),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err((
                Error::Authentication(format!("Azure OpenAI rejected credentials: {}", status)),
                false,
            ));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err((
                Error::LLMProvider(format!(
                    "Azure OpenAI request failed with status {}: {}",
                    status, error_text
                )),
                is_retryable(status),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| (Error::Serialization(e.to_string()), false))
    }
}

#[async_trait]
impl ChatModel for AzureOpenAIClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let body = CompletionRequest::from_request(request);
        let response: CompletionResponse = self
            .post_json(&self.config.chat_completions_url(), &body)
            .await?;
        response.into_chat_response()
    }

    fn model_id(&self) -> &str {
        &self.config.deployment
    }
}

#[async_trait]
impl Embedder for AzureOpenAIClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest { input: inputs };
        let response: EmbeddingResponse = self
            .post_json(&self.config.embeddings_url(), &body)
            .await?;

        let vectors = response.into_vectors();
        if vectors.len() != inputs.len() {
            return Err(Error::LLMProvider(format!(
                "Expected {} embeddings, received {}",
                inputs.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
    }
}
