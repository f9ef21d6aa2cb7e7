//! Agentic RAG system facade

use serde::Serialize;
use std::sync::Arc;

use arag_azure::AzureOpenAIClient;
use arag_core::{ChatModel, Embedder, Error, Result};
use arag_rag::{KnowledgeBaseIndexer, KnowledgeBaseRetriever, LocalVectorStore, WebDocumentLoader};

use crate::config::Settings;
use crate::nodes::NodeFunctions;
use crate::state::NodeKind;
use crate::structured::Score;
use crate::tools::{
    ArxivSearchTool, GoogleSearchTool, KnowledgeBaseTool, ToolRegistry, WikipediaSearchTool,
};
use crate::workflow::{Workflow, WorkflowOptions, WorkflowRun};

/// Processing details reported alongside an answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMetadata {
    pub original_question: String,
    pub rewritten_question: String,
    pub input_safe: Option<Score>,
    pub relevance_score: Option<Score>,
    pub hallucination_score: Option<Score>,
    pub answer_score: Option<Score>,
    pub output_safe: Option<Score>,
    pub rewrite_count: u32,
    pub sources_used: Vec<String>,
    pub steps: Vec<NodeKind>,
}

/// Answer to a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub metadata: QueryMetadata,
}

impl QueryOutcome {
    fn from_run(question: &str, run: WorkflowRun) -> Result<Self> {
        let WorkflowRun { state, steps } = run;
        let answer = state
            .generation
            .ok_or_else(|| Error::Workflow("Workflow finished without a generation".to_string()))?;

        Ok(Self {
            answer,
            metadata: QueryMetadata {
                original_question: question.to_string(),
                rewritten_question: state.question,
                input_safe: state.input_safe,
                relevance_score: state.relevance_score,
                hallucination_score: state.hallucination_score,
                answer_score: state.answer_score,
                output_safe: state.output_safe,
                rewrite_count: state.rewrite_count,
                sources_used: state.documents,
                steps,
            },
        })
    }
}

/// Main entry point: a ready workflow over an indexed knowledge base
pub struct AgenticRag {
    workflow: Workflow,
}

impl AgenticRag {
    /// Wrap an already assembled workflow
    pub fn new(workflow: Workflow) -> Self {
        Self { workflow }
    }

    /// Build from one chat model and a tool set with default limits
    pub fn with_model(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self::new(Workflow::with_options(
            NodeFunctions::new(model, tools),
            WorkflowOptions::default(),
        ))
    }

    /// Connect to Azure OpenAI, index the knowledge base and register the tools
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        tracing::info!("Initializing Agentic RAG system");
        let client = Arc::new(AzureOpenAIClient::new(settings.azure.clone())?);
        let embedder: Arc<dyn Embedder> = client.clone();

        let urls = settings.load_vector_store_urls()?;
        tracing::info!(count = urls.len(), "Loading knowledge base documents");

        let store = Arc::new(LocalVectorStore::new());
        let loader = WebDocumentLoader::new(&settings.user_agent)?;
        let indexer = KnowledgeBaseIndexer::new(store.clone(), embedder.clone());
        let result = indexer.index_urls(&loader, &urls).await?;
        tracing::info!(
            loaded = result.documents_loaded,
            failed = result.documents_failed,
            chunks = result.chunks_indexed,
            "Knowledge base indexed"
        );

        let retriever = Arc::new(KnowledgeBaseRetriever::new(store, embedder));

        let mut tools = ToolRegistry::new().with(Arc::new(ArxivSearchTool::new(&settings.user_agent)?));
        if let Some(key) = &settings.google_serper_api_key {
            tools.register(Arc::new(GoogleSearchTool::new(key.clone(), &settings.user_agent)?));
        }
        tools.register(Arc::new(WikipediaSearchTool::new(&settings.user_agent)?));
        tools.register(Arc::new(KnowledgeBaseTool::new(retriever)));
        tracing::info!(tools = ?tools.names(), "Tools registered");

        Ok(Self::with_model(client, tools))
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Run a question through the workflow
    pub async fn query(&self, question: &str) -> Result<QueryOutcome> {
        tracing::info!(question = %question, "Processing query");
        let run = self.workflow.invoke(question).await?;
        QueryOutcome::from_run(question, run)
    }
}
