//! Agentic self-reflective RAG workflow
//!
//! A question passes an input guardrail, is routed to search tools, has its retrieved
//! documents graded, gets an answer generated and checked for grounding and usefulness,
//! and finally passes an output guardrail. Failed grades send the question through a
//! rewriter and back to the tools, within a bounded number of steps.

pub mod config;
pub mod prompts;
pub mod structured;
pub mod guardrails;
pub mod graders;
pub mod generator;
pub mod tools;
pub mod state;
pub mod nodes;
pub mod workflow;
mod agent;

#[cfg(any(test, feature = "testing"))]
pub mod testing;


pub use agent::{AgenticRag, QueryMetadata, QueryOutcome};
pub use config::Settings;
pub use state::{GraphState, NodeKind};
pub use structured::Score;
pub use tools::ToolRegistry;
pub use workflow::{Workflow, WorkflowOptions, WorkflowRun};

// Re-export core types for convenience
pub use arag_core::{ChatModel, Error, Result, Tool, ToolSpec};
