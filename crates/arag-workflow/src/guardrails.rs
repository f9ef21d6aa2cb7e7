//! Input and output safety guardrails

use std::sync::Arc;

use arag_core::{ChatModel, Result, ToolSpec};

use crate::prompts;
use crate::structured::{guardrail_spec, invoke_structured, GuardrailVerdict};

/// Screens incoming questions for harmful content, PII and prompt injection
pub struct InputGuardrail {
    model: Arc<dyn ChatModel>,
}

impl InputGuardrail {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn spec() -> ToolSpec {
        guardrail_spec(
            "GuardrailInput",
            "Safety and policy check for input questions.",
            "Question is safe and appropriate, 'yes' or 'no'",
            "'none', 'harmful', 'pii', 'injection', 'off_topic', or 'other'",
        )
    }

    /// Check whether a question is safe to process
    pub async fn check(&self, question: &str) -> Result<GuardrailVerdict> {
        invoke_structured(
            self.model.as_ref(),
            prompts::INPUT_GUARDRAIL_SYSTEM,
            prompts::input_guardrail_human(question),
            Self::spec(),
        )
        .await
    }
}

/// Screens generated answers before they are returned
pub struct OutputGuardrail {
    model: Arc<dyn ChatModel>,
}

impl OutputGuardrail {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn spec() -> ToolSpec {
        guardrail_spec(
            "GuardrailOutput",
            "Safety and policy check for generated responses.",
            "Response is safe and appropriate, 'yes' or 'no'",
            "'none', 'harmful', 'pii', 'bias', 'misinformation', or 'other'",
        )
    }

    /// Check whether a generated response is safe to return
    pub async fn check(&self, question: &str, generation: &str) -> Result<GuardrailVerdict> {
        invoke_structured(
            self.model.as_ref(),
            prompts::OUTPUT_GUARDRAIL_SYSTEM,
            prompts::output_guardrail_human(question, generation),
            Self::spec(),
        )
        .await
    }
}
