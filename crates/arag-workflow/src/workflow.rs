//! Graph execution
//!
//! ```text
//! check_input ─safe─▶ route_tools ─▶ grade_docs ─relevant─▶ generate ─▶ check_hallucination
//!      │                   ▲              │                                   │
//!    unsafe                │         not relevant                        grounded / not
//!      ▼                   └──────── rewrite ◀────────────────────────────────┤
//!     END                                ▲                                    ▼
//!                                        └────── not useful ─────────── grade_answer
//!                                                                             │
//!                                                      useful / max rewrites  ▼
//!                                                                       check_output ─▶ END
//! ```

use serde::Serialize;

use arag_core::{Error, Result};

use crate::nodes::NodeFunctions;
use crate::state::{GraphState, NodeKind};
use crate::structured::Score;

/// Limits applied to a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Rewrites allowed before an unhelpful answer is accepted anyway
    pub max_rewrites: u32,
    /// Maximum node executions per run
    pub recursion_limit: usize,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            max_rewrites: 2,
            recursion_limit: 25,
        }
    }
}

/// Where to go after a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next(NodeKind),
    End,
}

/// Final state of a run and the nodes it executed
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRun {
    pub state: GraphState,
    pub steps: Vec<NodeKind>,
}

/// The compiled self-reflective RAG graph
pub struct Workflow {
    nodes: NodeFunctions,
    options: WorkflowOptions,
}

impl Workflow {
    pub fn new(nodes: NodeFunctions) -> Self {
        Self::with_options(nodes, WorkflowOptions::default())
    }

    pub fn with_options(nodes: NodeFunctions, options: WorkflowOptions) -> Self {
        Self { nodes, options }
    }

    pub fn nodes(&self) -> &NodeFunctions {
        &self.nodes
    }

    pub fn options(&self) -> WorkflowOptions {
        self.options
    }

    /// Run the graph for `question` until it reaches END
    pub async fn invoke(&self, question: &str) -> Result<WorkflowRun> {
        let mut state = GraphState::new(question);
        let mut steps = Vec::new();
        let mut node = NodeKind::CheckInput;

        loop {
            if steps.len() >= self.options.recursion_limit {
                return Err(Error::Workflow(format!(
                    "Recursion limit of {} reached without hitting a stop condition",
                    self.options.recursion_limit
                )));
            }

            tracing::debug!(node = %node, step = steps.len() + 1, "Running node");
            self.run_node(node, &mut state).await?;
            steps.push(node);

            match self.next(node, &state) {
                Transition::Next(next) => node = next,
                Transition::End => break,
            }
        }

        Ok(WorkflowRun { state, steps })
    }

    async fn run_node(&self, node: NodeKind, state: &mut GraphState) -> Result<()> {
        match node {
            NodeKind::CheckInput => self.nodes.check_input(state).await,
            NodeKind::RouteTools => self.nodes.route_tools(state).await,
            NodeKind::GradeDocs => self.nodes.grade_docs(state).await,
            NodeKind::Generate => self.nodes.generate(state).await,
            NodeKind::CheckHallucination => self.nodes.check_hallucination(state).await,
            NodeKind::GradeAnswer => self.nodes.grade_answer(state).await,
            NodeKind::Rewrite => self.nodes.rewrite(state).await,
            NodeKind::CheckOutput => self.nodes.check_output(state).await,
        }
    }

    /// Edge selection after `node` has updated `state`
    pub fn next(&self, node: NodeKind, state: &GraphState) -> Transition {
        use NodeKind::*;
        match node {
            CheckInput if is_yes(state.input_safe) => Transition::Next(RouteTools),
            CheckInput => Transition::End,
            RouteTools => Transition::Next(GradeDocs),
            GradeDocs if is_yes(state.relevance_score) => Transition::Next(Generate),
            GradeDocs => Transition::Next(Rewrite),
            Rewrite => Transition::Next(RouteTools),
            Generate => Transition::Next(CheckHallucination),
            CheckHallucination if is_yes(state.hallucination_score) => Transition::Next(GradeAnswer),
            CheckHallucination => Transition::Next(Rewrite),
            GradeAnswer if is_yes(state.answer_score) => Transition::Next(CheckOutput),
            GradeAnswer if state.rewrite_count < self.options.max_rewrites => Transition::Next(Rewrite),
            GradeAnswer => Transition::Next(CheckOutput),
            CheckOutput => Transition::End,
        }
    }
}

fn is_yes(score: Option<Score>) -> bool {
    score.is_some_and(Score::is_yes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;
    use crate::tools::ToolRegistry;
    use arag_core::ChatResponse;
    use std::sync::Arc;

    fn workflow() -> Workflow {
        let model = Arc::new(ScriptedModel::new(|_, _| ChatResponse::text("")));
        Workflow::new(NodeFunctions::new(model, ToolRegistry::new()))
    }

    #[test]
    fn test_input_edges() {
        let workflow = workflow();
        let mut state = GraphState::new("q");
        assert_eq!(workflow.next(NodeKind::CheckInput, &state), Transition::End);

        state.input_safe = Some(Score::Yes);
        assert_eq!(
            workflow.next(NodeKind::CheckInput, &state),
            Transition::Next(NodeKind::RouteTools)
        );
    }

    #[test]
    fn test_answer_edges_respect_max_rewrites() {
        let workflow = workflow();
        let mut state = GraphState::new("q");
        state.answer_score = Some(Score::No);

        state.rewrite_count = 1;
        assert_eq!(
            workflow.next(NodeKind::GradeAnswer, &state),
            Transition::Next(NodeKind::Rewrite)
        );

        state.rewrite_count = 2;
        assert_eq!(
            workflow.next(NodeKind::GradeAnswer, &state),
            Transition::Next(NodeKind::CheckOutput)
        );

        state.answer_score = Some(Score::Yes);
        state.rewrite_count = 0;
        assert_eq!(
            workflow.next(NodeKind::GradeAnswer, &state),
            Transition::Next(NodeKind::CheckOutput)
        );
    }

    #[test]
    fn test_ungrounded_generation_rewrites() {
        let workflow = workflow();
        let mut state = GraphState::new("q");
        state.hallucination_score = Some(Score::No);
        state.rewrite_count = 5;
        assert_eq!(
            workflow.next(NodeKind::CheckHallucination, &state),
            Transition::Next(NodeKind::Rewrite)
        );
        assert_eq!(workflow.next(NodeKind::CheckOutput, &state), Transition::End);
    }
}
