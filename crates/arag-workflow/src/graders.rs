//! Graders for retrieved documents and generated answers, plus the question rewriter

use std::sync::Arc;

use arag_core::{ChatModel, Result, ToolSpec};

use crate::prompts;
use crate::structured::{binary_score_spec, invoke_structured, invoke_text, BinaryScore};

/// Filters out retrieved documents unrelated to the question
pub struct RelevanceGrader {
    model: Arc<dyn ChatModel>,
}

impl RelevanceGrader {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn spec() -> ToolSpec {
        binary_score_spec(
            "GradeDocuments",
            "Binary score for relevance check on retrieved documents.",
            "Documents are relevant to the question, 'yes' or 'no'",
        )
    }

    pub async fn grade(&self, question: &str, document: &str) -> Result<BinaryScore> {
        invoke_structured(
            self.model.as_ref(),
            prompts::RELEVANCE_GRADER_SYSTEM,
            prompts::relevance_grader_human(question, document),
            Self::spec(),
        )
        .await
    }
}

/// Checks that a generation is grounded in the retrieved facts
pub struct HallucinationGrader {
    model: Arc<dyn ChatModel>,
}

impl HallucinationGrader {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn spec() -> ToolSpec {
        binary_score_spec(
            "GradeHallucinations",
            "Binary score for hallucination present in generation answer.",
            "Answer is grounded in the facts, 'yes' or 'no'",
        )
    }

    pub async fn grade(&self, documents: &str, generation: &str) -> Result<BinaryScore> {
        invoke_structured(
            self.model.as_ref(),
            prompts::HALLUCINATION_GRADER_SYSTEM,
            prompts::hallucination_grader_human(documents, generation),
            Self::spec(),
        )
        .await
    }
}

/// Checks that a generation actually resolves the question
pub struct AnswerGrader {
    model: Arc<dyn ChatModel>,
}

impl AnswerGrader {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn spec() -> ToolSpec {
        binary_score_spec(
            "GradeAnswer",
            "Binary score to assess answer addresses question.",
            "Answer addresses the question, 'yes' or 'no'",
        )
    }

    pub async fn grade(&self, question: &str, generation: &str) -> Result<BinaryScore> {
        invoke_structured(
            self.model.as_ref(),
            prompts::ANSWER_GRADER_SYSTEM,
            prompts::answer_grader_human(question, generation),
            Self::spec(),
        )
        .await
    }
}

/// Reformulates a question for better retrieval
pub struct QuestionRewriter {
    model: Arc<dyn ChatModel>,
}

impl QuestionRewriter {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn rewrite(&self, question: &str) -> Result<String> {
        let rewritten = invoke_text(
            self.model.as_ref(),
            prompts::QUESTION_REWRITER_SYSTEM,
            prompts::question_rewriter_human(question),
            None,
        )
        .await?;
        Ok(rewritten.trim().to_string())
    }
}
