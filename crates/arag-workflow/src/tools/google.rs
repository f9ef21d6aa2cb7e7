use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use arag_core::tool::string_argument;
use arag_core::{Error, Result, Tool, ToolSpec};

use crate::prompts::GOOGLE_SEARCH_DESCRIPTION;

const SERPER_URL: &str = "https://google.serper.dev/search";
const ORGANIC_RESULTS: usize = 10;
const NO_RESULT: &str = "No good Google Search Result was found";

/// Web search through the Serper Google API
pub struct GoogleSearchTool {
    client: Client,
    api_key: String,
}

impl GoogleSearchTool {
    pub fn new(api_key: impl Into<String>, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: super::http_client(user_agent)?,
            api_key: api_key.into(),
        })
    }

    /// Flatten a Serper response into one line of snippets
    ///
    /// A direct answer box wins outright; otherwise knowledge-graph facts come first,
    /// followed by organic result snippets.
    pub fn format_results(results: &Value) -> String {
        if let Some(answer_box) = results.get("answerBox") {
            if let Some(answer) = non_empty_str(answer_box, "answer") {
                return answer.to_string();
            }
            if let Some(snippet) = non_empty_str(answer_box, "snippet") {
                return snippet.replace('\n', " ");
            }
            if let Some(highlighted) = answer_box.get("snippetHighlighted").and_then(Value::as_array) {
                let parts: Vec<&str> = highlighted.iter().filter_map(Value::as_str).collect();
                if !parts.is_empty() {
                    return parts.join(" ");
                }
            }
        }

        let mut snippets: Vec<String> = Vec::new();

        if let Some(graph) = results.get("knowledgeGraph") {
            let title = graph.get("title").and_then(Value::as_str).unwrap_or_default();
            if let Some(kind) = non_empty_str(graph, "type") {
                snippets.push(format!("{}: {}.", title, kind));
            }
            if let Some(description) = non_empty_str(graph, "description") {
                snippets.push(description.to_string());
            }
            if let Some(attributes) = graph.get("attributes").and_then(Value::as_object) {
                for (attribute, value) in attributes {
                    snippets.push(format!("{} {}: {}.", title, attribute, display_value(value)));
                }
            }
        }

        if let Some(organic) = results.get("organic").and_then(Value::as_array) {
            for result in organic.iter().take(ORGANIC_RESULTS) {
                if let Some(snippet) = result.get("snippet").and_then(Value::as_str) {
                    snippets.push(snippet.to_string());
                }
                if let Some(attributes) = result.get("attributes").and_then(Value::as_object) {
                    for (attribute, value) in attributes {
                        snippets.push(format!("{}: {}.", attribute, display_value(value)));
                    }
                }
            }
        }

        if snippets.is_empty() {
            return NO_RESULT.to_string();
        }
        snippets.join(" ")
    }
}

#[async_trait]
impl Tool for GoogleSearchTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::single_string_arg("GoogleSearch", GOOGLE_SEARCH_DESCRIPTION, "query_string")
    }

    async fn invoke(&self, arguments: &Value) -> Result<String> {
        let query = string_argument(arguments, "query_string")?;

        let response = self
            .client
            .post(SERPER_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "gl": "us", "hl": "en", "num": ORGANIC_RESULTS }))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Tool(format!(
                "Google search failed with status {}",
                response.status()
            )));
        }

        let results: Value = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Self::format_results(&results))
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_box_wins() {
        let results = json!({
            "answerBox": {"snippet": "Paris is the\ncapital."},
            "organic": [{"snippet": "ignored"}]
        });
        assert_eq!(GoogleSearchTool::format_results(&results), "Paris is the capital.");
    }

    #[test]
    fn test_knowledge_graph_then_organic() {
        let results = json!({
            "knowledgeGraph": {
                "title": "Rust",
                "type": "Programming language",
                "description": "A systems language."
            },
            "organic": [
                {"snippet": "Rust is fast."},
                {"title": "no snippet"},
                {"snippet": "Rust is safe.", "attributes": {"Released": "2015"}}
            ]
        });
        assert_eq!(
            GoogleSearchTool::format_results(&results),
            "Rust: Programming language. A systems language. Rust is fast. Rust is safe. Released: 2015."
        );
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(GoogleSearchTool::format_results(&json!({"organic": []})), NO_RESULT);
    }
}
