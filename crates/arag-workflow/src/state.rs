//! Workflow state and node identifiers

use serde::{Deserialize, Serialize};

use crate::structured::Score;

/// State threaded through every node of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphState {
    /// Current question; replaced by the rewriter
    pub question: String,
    pub generation: Option<String>,
    /// Documents under consideration; narrowed by relevance grading
    pub documents: Vec<String>,
    pub input_safe: Option<Score>,
    pub output_safe: Option<Score>,
    pub guardrail_message: Option<String>,
    pub relevance_score: Option<Score>,
    pub hallucination_score: Option<Score>,
    pub answer_score: Option<Score>,
    pub rewrite_count: u32,
    /// Raw outputs of the last tool round
    pub tool_results: Vec<String>,
}

impl GraphState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }
}

/// Nodes of the self-reflective RAG graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    CheckInput,
    RouteTools,
    GradeDocs,
    Generate,
    CheckHallucination,
    GradeAnswer,
    Rewrite,
    CheckOutput,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::CheckInput => "check_input",
            NodeKind::RouteTools => "route_tools",
            NodeKind::GradeDocs => "grade_docs",
            NodeKind::Generate => "generate",
            NodeKind::CheckHallucination => "check_hallucination",
            NodeKind::GradeAnswer => "grade_answer",
            NodeKind::Rewrite => "rewrite",
            NodeKind::CheckOutput => "check_output",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
