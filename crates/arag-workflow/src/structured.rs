//! Structured model output
//!
//! Verdicts are obtained by forcing the model to call a function whose argument
//! schema is the verdict type. The arguments then deserialize straight into Rust types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use arag_core::{ChatMessage, ChatModel, ChatRequest, Error, Result, ToolSpec};

/// A binary yes/no verdict
///
/// Deserialization normalizes case and whitespace; anything other than "yes" is `No`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Score {
    Yes,
    No,
}

impl Score {
    pub fn is_yes(self) -> bool {
        self == Score::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Score::Yes => "yes",
            Score::No => "no",
        }
    }
}

impl From<String> for Score {
    fn from(value: String) -> Self {
        Score::from(value.as_str())
    }
}

impl From<&str> for Score {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("yes") {
            Score::Yes
        } else {
            Score::No
        }
    }
}

impl From<bool> for Score {
    fn from(value: bool) -> Self {
        if value { Score::Yes } else { Score::No }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the relevance, hallucination and answer graders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryScore {
    pub binary_score: Score,
}

/// Output of the input and output guardrails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    pub is_safe: Score,
    #[serde(default = "default_concern")]
    pub concern_type: String,
    #[serde(default)]
    pub explanation: String,
}

fn default_concern() -> String {
    "none".to_string()
}

/// Function spec for a `BinaryScore` verdict
pub fn binary_score_spec(name: &str, description: &str, field_description: &str) -> ToolSpec {
    ToolSpec {
        name: name.to_string(),
        description: description.to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "binary_score": {
                    "type": "string",
                    "description": field_description,
                }
            },
            "required": ["binary_score"],
        }),
    }
}

/// Function spec for a `GuardrailVerdict`
pub fn guardrail_spec(name: &str, description: &str, safe_description: &str, concerns: &str) -> ToolSpec {
    ToolSpec {
        name: name.to_string(),
        description: description.to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "is_safe": {
                    "type": "string",
                    "description": safe_description,
                },
                "concern_type": {
                    "type": "string",
                    "description": format!("Type of concern if unsafe: {}", concerns),
                },
                "explanation": {
                    "type": "string",
                    "description": "Brief explanation of the decision",
                }
            },
            "required": ["is_safe", "concern_type", "explanation"],
        }),
    }
}

/// Ask `model` for a verdict of type `T` through the function described by `spec`
pub async fn invoke_structured<T>(
    model: &dyn ChatModel,
    system: &str,
    human: String,
    spec: ToolSpec,
) -> Result<T>
where
    T: DeserializeOwned,
{
    let name = spec.name.clone();
    let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(human)])
        .with_structured_output(spec);
    let response = model.complete(&request).await?;

    if let Some(call) = response.tool_calls.iter().find(|c| c.name == name) {
        return serde_json::from_value(call.arguments.clone()).map_err(|e| {
            Error::Serialization(format!("Invalid {} arguments: {}", name, e))
        });
    }

    // Some deployments answer in content even when a function is forced
    if let Some(value) = response.content.as_deref().and_then(parse_json_content) {
        return serde_json::from_value(value)
            .map_err(|e| Error::Serialization(format!("Invalid {} content: {}", name, e)));
    }

    Err(Error::LLMProvider(format!(
        "Model did not return structured output for {}",
        name
    )))
}

/// Plain-text completion; the reply content, or empty when the model returned none
pub async fn invoke_text(
    model: &dyn ChatModel,
    system: &str,
    human: String,
    max_tokens: Option<u32>,
) -> Result<String> {
    let mut request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(human)]);
    if let Some(max_tokens) = max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    let response = model.complete(&request).await?;
    Ok(response.text_or_empty().to_string())
}

/// JSON object in a reply, with or without a markdown code fence
fn parse_json_content(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str::<Value>(body).ok().filter(Value::is_object)
}
