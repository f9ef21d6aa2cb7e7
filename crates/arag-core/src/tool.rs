//! Tool trait and specification

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Function-style description of a tool, as advertised to a chat model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    /// Spec for a tool taking a single required string argument
    pub fn single_string_arg(
        name: impl Into<String>,
        description: impl Into<String>,
        arg: &str,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    arg: { "type": "string" }
                },
                "required": [arg],
            }),
        }
    }
}

/// Trait for tools the router model can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Describe the tool to the model
    fn spec(&self) -> ToolSpec;

    /// Run the tool with the arguments chosen by the model
    async fn invoke(&self, arguments: &serde_json::Value) -> Result<String>;

    /// Tool name, as used in tool calls
    fn name(&self) -> String {
        self.spec().name
    }
}

/// Read a required string argument out of a tool-call arguments object
pub fn string_argument(arguments: &serde_json::Value, name: &str) -> Result<String> {
    match arguments {
        serde_json::Value::String(s) => Ok(s.clone()),
        other => other
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| crate::Error::Tool(format!("Missing string argument '{}'", name))),
    }
}
