//! Configuration management for the agentic RAG system

use std::env;
use std::fs;
use std::path::PathBuf;

use arag_azure::AzureOpenAIConfig;
use arag_core::{Error, Result};

use crate::prompts::DEFAULT_URLS;

pub use arag_rag::DEFAULT_USER_AGENT;

/// Settings needed to build the workflow
#[derive(Debug, Clone)]
pub struct Settings {
    pub azure: AzureOpenAIConfig,
    pub google_serper_api_key: Option<String>,
    pub vector_store_urls_file: PathBuf,
    pub default_urls_fallback: bool,
    pub user_agent: String,
    pub log_level: String,
}

impl Settings {
    /// Load `.env`, then read settings from the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let azure = AzureOpenAIConfig::from_lookup(&lookup)?;
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let google_serper_api_key = get("GOOGLE_SERPER_API_KEY");
        if google_serper_api_key.is_none() {
            tracing::warn!("GOOGLE_SERPER_API_KEY not set. Google Search tool will not be available.");
        }

        Ok(Self {
            azure,
            google_serper_api_key,
            vector_store_urls_file: get("VECTOR_STORE_URLS_FILE")
                .unwrap_or_else(|| "urls.txt".to_string())
                .into(),
            default_urls_fallback: get("DEFAULT_URLS_FALLBACK")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
            user_agent: get("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string()),
        })
    }

    /// Load knowledge-base URLs from the configured file
    ///
    /// One URL per line; blank lines and `#` comments are skipped. A missing,
    /// unreadable or empty file falls back to the default URLs when fallback is enabled.
    pub fn load_vector_store_urls(&self) -> Result<Vec<String>> {
        let path = &self.vector_store_urls_file;

        if !path.exists() {
            tracing::warn!(file = %path.display(), "URLs file not found");
            return self.fallback(format!("URLs file '{}' not found and fallback disabled.", path.display()));
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Error reading URLs file");
                if self.default_urls_fallback {
                    return self.fallback(String::new());
                }
                return Err(Error::Io(e));
            }
        };

        let urls = parse_urls(&content);
        if urls.is_empty() {
            tracing::warn!(file = %path.display(), "No valid URLs found in URLs file");
            return self.fallback("No valid URLs found and fallback disabled.".to_string());
        }

        Ok(urls)
    }

    fn fallback(&self, disabled_message: String) -> Result<Vec<String>> {
        if self.default_urls_fallback {
            tracing::info!("Using default URLs from configuration");
            Ok(DEFAULT_URLS.iter().map(|u| u.to_string()).collect())
        } else {
            Err(Error::Configuration(disabled_message))
        }
    }
}

/// Case-insensitive `"true"`
pub fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

pub(crate) fn parse_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn base_vars() -> HashMap<String, String> {
        [
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
            ("AZURE_OPENAI_API_KEY", "key"),
            ("AZURE_DEPLOYMENT_NAME", "gpt-4o"),
            ("AZURE_API_VERSION", "2024-08-01-preview"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn settings_with(extra: &[(&str, &str)]) -> Settings {
        let mut vars = base_vars();
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }
        Settings::from_lookup(|k| vars.get(k).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = settings_with(&[]);
        assert_eq!(settings.vector_store_urls_file, PathBuf::from("urls.txt"));
        assert!(settings.default_urls_fallback);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.google_serper_api_key.is_none());
    }

    #[test]
    fn test_fallback_flag_is_case_insensitive() {
        assert!(!settings_with(&[("DEFAULT_URLS_FALLBACK", "False")]).default_urls_fallback);
        assert!(settings_with(&[("DEFAULT_URLS_FALLBACK", "TRUE")]).default_urls_fallback);
    }

    #[test]
    fn test_urls_file_skips_comments_and_blanks() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# knowledge base").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  https://docs.example.com/a  ").unwrap();
        writeln!(file, "https://docs.example.com/b").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let settings = settings_with(&[("VECTOR_STORE_URLS_FILE", path.as_str())]);
        assert_eq!(
            settings.load_vector_store_urls().unwrap(),
            vec!["https://docs.example.com/a", "https://docs.example.com/b"]
        );
    }

    #[test]
    fn test_missing_file_uses_default_urls() {
        let settings = settings_with(&[("VECTOR_STORE_URLS_FILE", "/nonexistent/urls.txt")]);
        assert_eq!(settings.load_vector_store_urls().unwrap(), DEFAULT_URLS.to_vec());
    }

    #[test]
    fn test_missing_file_without_fallback_fails() {
        let settings = settings_with(&[
            ("VECTOR_STORE_URLS_FILE", "/nonexistent/urls.txt"),
            ("DEFAULT_URLS_FALLBACK", "false"),
        ]);
        let err = settings.load_vector_store_urls().unwrap_err();
        assert!(err.to_string().contains("not found and fallback disabled"));
    }

    #[test]
    fn test_empty_file_without_fallback_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# only comments").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let settings = settings_with(&[
            ("VECTOR_STORE_URLS_FILE", path.as_str()),
            ("DEFAULT_URLS_FALLBACK", "false"),
        ]);
        let err = settings.load_vector_store_urls().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: No valid URLs found and fallback disabled."
        );
    }

    #[test]
    fn test_missing_azure_settings_fail() {
        let vars: HashMap<String, String> = HashMap::new();
        let err = Settings::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("AZURE_OPENAI_ENDPOINT"));
    }
}
