//! Node functions of the workflow graph
//!
//! Each node reads the fields it needs from [`GraphState`] and writes back its results.

use std::sync::Arc;

use futures::future::join_all;

use arag_core::{ChatMessage, ChatModel, ChatRequest, Result};

use crate::generator::AnswerGenerator;
use crate::graders::{AnswerGrader, HallucinationGrader, QuestionRewriter, RelevanceGrader};
use crate::guardrails::{InputGuardrail, OutputGuardrail};
use crate::state::GraphState;
use crate::structured::Score;
use crate::tools::ToolRegistry;

const ROUTER_MAX_TOKENS: u32 = 2000;

/// Components backing every node
pub struct NodeFunctions {
    router: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    input_guard: InputGuardrail,
    output_guard: OutputGuardrail,
    relevance_grader: RelevanceGrader,
    hallucination_grader: HallucinationGrader,
    answer_grader: AnswerGrader,
    question_rewriter: QuestionRewriter,
    answer_generator: AnswerGenerator,
}

impl NodeFunctions {
    /// Build every component on top of one chat model
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self {
            input_guard: InputGuardrail::new(model.clone()),
            output_guard: OutputGuardrail::new(model.clone()),
            relevance_grader: RelevanceGrader::new(model.clone()),
            hallucination_grader: HallucinationGrader::new(model.clone()),
            answer_grader: AnswerGrader::new(model.clone()),
            question_rewriter: QuestionRewriter::new(model.clone()),
            answer_generator: AnswerGenerator::new(model.clone()),
            router: model,
            tools,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub async fn check_input(&self, state: &mut GraphState) -> Result<()> {
        let verdict = self.input_guard.check(&state.question).await?;

        if verdict.is_safe.is_yes() {
            tracing::info!("Input guardrail passed");
            state.input_safe = Some(Score::Yes);
            state.rewrite_count = 0;
        } else {
            tracing::warn!(concern = %verdict.concern_type, "Input guardrail failed");
            let message = format!("I cannot process this request. Reason: {}", verdict.explanation);
            state.input_safe = Some(Score::No);
            state.guardrail_message = Some(message.clone());
            state.generation = Some(message);
        }
        Ok(())
    }

    /// Let the router pick tools for the question and collect their outputs
    pub async fn route_tools(&self, state: &mut GraphState) -> Result<()> {
        let request = ChatRequest::new(vec![ChatMessage::user(state.question.clone())])
            .with_tools(self.tools.specs())
            .with_max_tokens(ROUTER_MAX_TOKENS);
        let response = self.router.complete(&request).await?;

        let mut results = Vec::new();
        if response.tool_calls.is_empty() {
            results.push(response.text_or_empty().to_string());
        } else {
            for call in &response.tool_calls {
                let Some(tool) = self.tools.get(&call.name) else {
                    tracing::warn!(tool = %call.name, "Model requested an unknown tool");
                    continue;
                };
                tracing::info!(tool = %call.name, "Executing tool");
                match tool.invoke(&call.arguments).await {
                    Ok(output) => results.push(output),
                    Err(e) => tracing::warn!(tool = %call.name, error = %e, "Tool failed, skipping"),
                }
            }
        }

        state.documents = results.clone();
        state.tool_results = results;
        Ok(())
    }

    /// Keep only documents graded relevant; grading runs concurrently
    pub async fn grade_docs(&self, state: &mut GraphState) -> Result<()> {
        let question = state.question.as_str();
        let grades = join_all(
            state
                .documents
                .iter()
                .map(|document| self.relevance_grader.grade(question, document)),
        )
        .await;

        let mut relevant = Vec::new();
        for (document, grade) in state.documents.iter().zip(grades) {
            if grade?.binary_score.is_yes() {
                tracing::info!("Document relevant");
                relevant.push(document.clone());
            } else {
                tracing::info!("Document not relevant");
            }
        }

        state.relevance_score = Some(Score::from(!relevant.is_empty()));
        state.documents = relevant;
        Ok(())
    }

    pub async fn generate(&self, state: &mut GraphState) -> Result<()> {
        let context = state.documents.join("\n\n");
        let generation = self.answer_generator.generate(&context, &state.question).await?;
        state.generation = Some(generation);
        Ok(())
    }

    pub async fn check_hallucination(&self, state: &mut GraphState) -> Result<()> {
        let facts = state.documents.join("\n\n");
        let generation = state.generation.as_deref().unwrap_or_default();
        let score = self.hallucination_grader.grade(&facts, generation).await?.binary_score;

        if score.is_yes() {
            tracing::info!("Generation is grounded in documents");
        } else {
            tracing::info!("Generation is not grounded in documents");
        }
        state.hallucination_score = Some(score);
        Ok(())
    }

    pub async fn grade_answer(&self, state: &mut GraphState) -> Result<()> {
        let generation = state.generation.as_deref().unwrap_or_default();
        let score = self.answer_grader.grade(&state.question, generation).await?.binary_score;

        if score.is_yes() {
            tracing::info!("Answer addresses question");
        } else {
            tracing::info!("Answer does not address question");
        }
        state.answer_score = Some(score);
        Ok(())
    }

    pub async fn rewrite(&self, state: &mut GraphState) -> Result<()> {
        let better = self.question_rewriter.rewrite(&state.question).await?;
        tracing::info!(question = %better, "Rewrote question");
        state.question = better;
        state.rewrite_count += 1;
        Ok(())
    }

    pub async fn check_output(&self, state: &mut GraphState) -> Result<()> {
        let generation = state.generation.as_deref().unwrap_or_default();
        let verdict = self.output_guard.check(&state.question, generation).await?;

        if verdict.is_safe.is_yes() {
            tracing::info!("Output guardrail passed");
            state.output_safe = Some(Score::Yes);
        } else {
            tracing::warn!(concern = %verdict.concern_type, "Output guardrail failed");
            let message = format!("I cannot provide this response. Reason: {}", verdict.explanation);
            state.output_safe = Some(Score::No);
            state.guardrail_message = Some(message.clone());
            state.generation = Some(message);
        }
        Ok(())
    }
}
