use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use arag_core::tool::string_argument;
use arag_core::{Error, Result, Tool, ToolSpec};

use super::{truncate_chars, MAX_QUERY_CHARS, MAX_TOOL_OUTPUT_CHARS};
use crate::prompts::ARXIV_SEARCH_DESCRIPTION;

const ARXIV_API: &str = "http://export.arxiv.org/api/query";
const NO_RESULT: &str = "No good Arxiv Result was found";

/// Top matching paper from the arXiv Atom API
pub struct ArxivSearchTool {
    client: Client,
}

impl ArxivSearchTool {
    pub fn new(user_agent: &str) -> Result<Self> {
        Ok(Self { client: super::http_client(user_agent)? })
    }

    /// Render the first entry of an Atom feed, or `None` when the feed is empty
    pub fn parse_feed(xml: &str) -> Option<String> {
        let feed = Html::parse_document(xml);
        let entry_selector = Selector::parse("entry").ok()?;
        let entry = feed.select(&entry_selector).next()?;

        let updated = child_text(entry, "updated").unwrap_or_default();
        let published = updated.get(..10).unwrap_or(&updated).to_string();
        let title = child_text(entry, "title").unwrap_or_default();
        let summary = child_text(entry, "summary").unwrap_or_default();

        let author_selector = Selector::parse("author name").ok()?;
        let authors: Vec<String> = entry
            .select(&author_selector)
            .map(|a| collapse(&a.text().collect::<String>()))
            .collect();

        Some(format!(
            "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
            published,
            title,
            authors.join(", "),
            summary
        ))
    }
}

fn child_text(element: ElementRef<'_>, name: &str) -> Option<String> {
    let selector = Selector::parse(name).ok()?;
    element
        .select(&selector)
        .next()
        .map(|e| collapse(&e.text().collect::<String>()))
}

/// Atom text wraps lines; fold all whitespace runs into single spaces
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl Tool for ArxivSearchTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::single_string_arg("arxiv", ARXIV_SEARCH_DESCRIPTION, "query")
    }

    async fn invoke(&self, arguments: &Value) -> Result<String> {
        let query = string_argument(arguments, "query")?;
        let query = truncate_chars(&query, MAX_QUERY_CHARS);

        let response = self
            .client
            .get(ARXIV_API)
            .query(&[("search_query", query.as_str()), ("max_results", "1")])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Tool(format!(
                "Arxiv request failed with status {}",
                response.status()
            )));
        }

        let xml = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(match Self::parse_feed(&xml) {
            Some(text) => truncate_chars(&text, MAX_TOOL_OUTPUT_CHARS),
            None => NO_RESULT.to_string(),
        })
    }
}
