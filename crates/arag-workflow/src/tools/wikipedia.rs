use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use arag_core::tool::string_argument;
use arag_core::{Error, Result, Tool, ToolSpec};

use super::{truncate_chars, MAX_QUERY_CHARS, MAX_TOOL_OUTPUT_CHARS};
use crate::prompts::WIKIPEDIA_SEARCH_DESCRIPTION;

const WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";
const NO_RESULT: &str = "No good Wikipedia Search Result was found";

/// Summary of the best matching Wikipedia page
pub struct WikipediaSearchTool {
    client: Client,
}

impl WikipediaSearchTool {
    pub fn new(user_agent: &str) -> Result<Self> {
        Ok(Self { client: super::http_client(user_agent)? })
    }

    pub fn format_page(title: &str, summary: &str) -> String {
        truncate_chars(
            &format!("Page: {}\nSummary: {}", title, summary.trim()),
            MAX_TOOL_OUTPUT_CHARS,
        )
    }

    async fn get_json<P: Serialize + ?Sized>(&self, params: &P) -> Result<Value> {
        let response = self
            .client
            .get(WIKIPEDIA_API)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Tool(format!(
                "Wikipedia request failed with status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Search parameters for the top hit; long queries are cut to `MAX_QUERY_CHARS`
fn search_params(query: &str) -> [(&'static str, String); 5] {
    [
        ("action", "query".to_string()),
        ("list", "search".to_string()),
        ("srsearch", truncate_chars(query, MAX_QUERY_CHARS)),
        ("srlimit", "1".to_string()),
        ("format", "json".to_string()),
    ]
}

/// Title of the first search hit
fn first_title(search: &Value) -> Option<String> {
    search
        .pointer("/query/search/0/title")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Intro extract of the first page in a `prop=extracts` response
fn first_extract(pages: &Value) -> Option<String> {
    pages
        .pointer("/query/pages")
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next())
        .and_then(|page| page.get("extract"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl Tool for WikipediaSearchTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::single_string_arg("WikipediaSearch", WIKIPEDIA_SEARCH_DESCRIPTION, "query")
    }

    async fn invoke(&self, arguments: &Value) -> Result<String> {
        let query = string_argument(arguments, "query")?;

        let search = self.get_json(&search_params(&query)).await?;
        let Some(title) = first_title(&search) else {
            return Ok(NO_RESULT.to_string());
        };

        let pages = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title.as_str()),
                ("format", "json"),
            ])
            .await?;

        match first_extract(&pages) {
            Some(summary) => Ok(Self::format_page(&title, &summary)),
            None => Ok(NO_RESULT.to_string()),
        }
    }
}
