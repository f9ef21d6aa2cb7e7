//! Web page loader

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Node, Selector};
use serde_json::json;
use std::sync::LazyLock;
use std::time::Duration;

use arag_core::{Document, DocumentLoader, Error, Result};

pub const DEFAULT_USER_AGENT: &str = "AgenticRAG/1.0 (Educational Research Tool)";

static INLINE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid inline whitespace pattern"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n+").expect("valid blank line pattern"));

/// Elements whose text never reaches the document body
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Loads a web page and extracts its visible text
pub struct WebDocumentLoader {
    client: Client,
}

impl WebDocumentLoader {
    /// Create a loader that identifies itself with `user_agent`
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// Parse raw HTML into a document
    ///
    /// Text nodes are trimmed and joined line by line; runs of blank lines collapse
    /// to a single paragraph break so the splitter sees natural boundaries.
    pub fn parse_html(html: &str, url: &str) -> Document {
        let page = Html::parse_document(html);

        let title = first_text(&page, "title").unwrap_or_default();
        let description = Selector::parse(r#"meta[name="description"]"#)
            .ok()
            .and_then(|s| page.select(&s).next())
            .and_then(|e| e.value().attr("content"))
            .map(str::to_string);
        let language = Selector::parse("html")
            .ok()
            .and_then(|s| page.select(&s).next())
            .and_then(|e| e.value().attr("lang"))
            .map(str::to_string);

        let mut lines: Vec<String> = Vec::new();
        for node in page.tree.root().descendants() {
            let Node::Text(text) = node.value() else { continue };
            let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                Node::Element(element) => {
                    SKIPPED_ELEMENTS.contains(&element.name()) || element.name() == "head"
                }
                _ => false,
            });
            if hidden {
                continue;
            }
            let line = text.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }

        let content = normalize_whitespace(&lines.join("\n"));

        Document {
            id: format!("{:x}", md5::compute(url.as_bytes())),
            title: title.clone(),
            content,
            url: Some(url.to_string()),
            metadata: json!({
                "source": url,
                "title": title,
                "description": description,
                "language": language,
            }),
        }
    }
}

#[async_trait]
impl DocumentLoader for WebDocumentLoader {
    async fn load(&self, url: &str) -> Result<Document> {
        url::Url::parse(url).map_err(|e| Error::InvalidInput(format!("Invalid URL '{}': {}", url, e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::DocumentIndexer(format!(
                "Fetching {} failed with status {}",
                url,
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self::parse_html(&html, url))
    }
}

fn first_text(page: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    page.select(&selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
}

fn normalize_whitespace(text: &str) -> String {
    let text = INLINE_SPACES.replace_all(text, " ");
    BLANK_LINES.replace_all(&text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_parsing_skips_scripts_and_head() {
        let html = r#"
            <html lang="en">
                <head>
                    <title>Test Title</title>
                    <meta name="description" content="A test page">
                    <style>body { color: red; }</style>
                </head>
                <body>
                    <h1>Heading</h1>
                    <p>This is a   test paragraph.</p>
                    <script>console.log("hidden");</script>
                    <div>Another block</div>
                </body>
            </html>
        "#;

        let doc = WebDocumentLoader::parse_html(html, "http://test.com");
        assert_eq!(doc.title, "Test Title");
        assert_eq!(doc.content, "Heading\nThis is a test paragraph.\nAnother block");
        assert_eq!(doc.metadata["source"], "http://test.com");
        assert_eq!(doc.metadata["description"], "A test page");
        assert_eq!(doc.metadata["language"], "en");
        assert_eq!(doc.url.as_deref(), Some("http://test.com"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("a  b\n\n\n\nc\t\td"), "a b\n\nc d");
        assert_eq!(normalize_whitespace("  x\u{a0}\u{a0}y\n \n\nz "), "x y\n\nz");
    }
}
