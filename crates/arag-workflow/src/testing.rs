//! Test doubles for driving the workflow without a model provider
//!
//! [`ScriptedModel`] recognises which component is calling from the system prompt
//! and hands the request to a closure, so a test can script every decision.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use arag_core::tool::string_argument;
use arag_core::{ChatModel, ChatRequest, ChatResponse, Error, Result, Tool, ToolCall, ToolSpec};

use crate::prompts;

/// The component a request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    InputGuardrail,
    OutputGuardrail,
    RelevanceGrader,
    HallucinationGrader,
    AnswerGrader,
    QuestionRewriter,
    AnswerGenerator,
    Router,
}

impl PromptKind {
    pub fn of(request: &ChatRequest) -> Self {
        match request.system_prompt() {
            Some(prompts::INPUT_GUARDRAIL_SYSTEM) => PromptKind::InputGuardrail,
            Some(prompts::OUTPUT_GUARDRAIL_SYSTEM) => PromptKind::OutputGuardrail,
            Some(prompts::RELEVANCE_GRADER_SYSTEM) => PromptKind::RelevanceGrader,
            Some(prompts::HALLUCINATION_GRADER_SYSTEM) => PromptKind::HallucinationGrader,
            Some(prompts::ANSWER_GRADER_SYSTEM) => PromptKind::AnswerGrader,
            Some(prompts::QUESTION_REWRITER_SYSTEM) => PromptKind::QuestionRewriter,
            Some(prompts::ANSWER_GENERATOR_SYSTEM) => PromptKind::AnswerGenerator,
            _ => PromptKind::Router,
        }
    }
}

type Handler = dyn Fn(PromptKind, &ChatRequest) -> ChatResponse + Send + Sync;

/// Chat model whose replies come from a closure
pub struct ScriptedModel {
    handler: Box<Handler>,
    requests: Mutex<Vec<(PromptKind, ChatRequest)>>,
}

impl ScriptedModel {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(PromptKind, &ChatRequest) -> ChatResponse + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Kinds of every request seen so far, in order
    pub fn kinds(&self) -> Vec<PromptKind> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|(kind, _)| *kind).collect())
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|(_, request)| request.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let kind = PromptKind::of(request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((kind, request.clone()));
        }
        Ok((self.handler)(kind, request))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

/// Reply through the request's forced function with `arguments`
pub fn structured(request: &ChatRequest, arguments: Value) -> ChatResponse {
    let name = request.forced_tool.clone().unwrap_or_default();
    ChatResponse::calls(vec![ToolCall {
        id: "call_0".to_string(),
        name,
        arguments,
    }])
}

pub fn binary(request: &ChatRequest, yes: bool) -> ChatResponse {
    structured(request, json!({ "binary_score": if yes { "yes" } else { "no" } }))
}

pub fn verdict(request: &ChatRequest, safe: bool, concern_type: &str, explanation: &str) -> ChatResponse {
    structured(
        request,
        json!({
            "is_safe": if safe { "yes" } else { "no" },
            "concern_type": concern_type,
            "explanation": explanation,
        }),
    )
}

/// A router reply calling `name` with `arguments`
pub fn tool_call(name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: format!("call_{}", name),
        name: name.to_string(),
        arguments,
    }
}

/// Tool returning `"{name}: {query}"`, or a fixed output when one is set
pub struct StaticTool {
    name: String,
    description: String,
    output: Option<String>,
}

impl StaticTool {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            output: None,
        }
    }

    pub fn returning(name: &str, output: &str) -> Self {
        Self {
            output: Some(output.to_string()),
            ..Self::new(name, "static tool")
        }
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::single_string_arg(self.name.clone(), self.description.clone(), "query")
    }

    async fn invoke(&self, arguments: &Value) -> Result<String> {
        match &self.output {
            Some(output) => Ok(output.clone()),
            None => Ok(format!("{}: {}", self.name, string_argument(arguments, "query")?)),
        }
    }
}

/// Tool that always fails
pub struct FailingTool(pub String);

#[async_trait]
impl Tool for FailingTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::single_string_arg(self.0.clone(), "always fails", "query")
    }

    async fn invoke(&self, _arguments: &Value) -> Result<String> {
        Err(Error::Network(format!("{} is unreachable", self.0)))
    }
}
