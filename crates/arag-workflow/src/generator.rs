//! Answer generation from retrieved context

use std::sync::Arc;

use arag_core::{ChatModel, Result};

use crate::prompts;
use crate::structured::invoke_text;

const MAX_ANSWER_TOKENS: u32 = 2000;

pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Answer `question` using only `context`
    pub async fn generate(&self, context: &str, question: &str) -> Result<String> {
        invoke_text(
            self.model.as_ref(),
            prompts::ANSWER_GENERATOR_SYSTEM,
            prompts::answer_generator_human(context, question),
            Some(MAX_ANSWER_TOKENS),
        )
        .await
    }
}
