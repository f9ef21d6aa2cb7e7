//! Azure OpenAI configuration

use serde::Serialize;
use arag_core::{Error, Result};

pub const DEFAULT_EMBEDDING_DEPLOYMENT: &str = "text-embedding-3-large";

/// Configuration for the Azure OpenAI client
#[derive(Debug, Clone, Serialize)]
pub struct AzureOpenAIConfig {
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub deployment: String,
    pub embedding_deployment: String,
    pub api_version: String,
}

impl AzureOpenAIConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        config_from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    ///
    /// Every missing required variable is reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        config_from_lookup(lookup)
    }

    /// Create configuration with explicit values
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            embedding_deployment: DEFAULT_EMBEDDING_DEPLOYMENT.to_string(),
            api_version: api_version.into(),
        }
    }

    /// Chat completions URL for the configured deployment
    pub fn chat_completions_url(&self) -> String {
        self.deployment_url(&self.deployment, "chat/completions")
    }

    /// Embeddings URL for the configured embedding deployment
    pub fn embeddings_url(&self) -> String {
        self.deployment_url(&self.embedding_deployment, "embeddings")
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.endpoint.trim_end_matches('/'),
            deployment,
            operation,
            self.api_version
        )
    }
}

fn config_from_lookup<F>(lookup: F) -> Result<AzureOpenAIConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let required = [
        "AZURE_OPENAI_ENDPOINT",
        "AZURE_OPENAI_API_KEY",
        "AZURE_DEPLOYMENT_NAME",
        "AZURE_API_VERSION",
    ];
    let missing: Vec<&str> = required.iter().copied().filter(|k| get(k).is_none()).collect();
    if !missing.is_empty() {
        return Err(Error::Configuration(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )));
    }

    Ok(AzureOpenAIConfig {
        endpoint: get("AZURE_OPENAI_ENDPOINT").unwrap_or_default(),
        api_key: get("AZURE_OPENAI_API_KEY").unwrap_or_default(),
        deployment: get("AZURE_DEPLOYMENT_NAME").unwrap_or_default(),
        embedding_deployment: get("AZURE_EMBEDDING_DEPLOYMENT")
            .unwrap_or_else(|| DEFAULT_EMBEDDING_DEPLOYMENT.to_string()),
        api_version: get("AZURE_API_VERSION").unwrap_or_default(),
    })
}
