//! Route handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

use arag_workflow::QueryMetadata;

use crate::state::AppState;

pub const API_NAME: &str = "Agentic RAG API";
pub const API_DESCRIPTION: &str =
    "This Agentic RAG supports enterprise system RAG design with best practices";
pub const API_VERSION: &str = "1.0";

/// Error body shaped as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn not_initialized() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Agentic RAG system not initialized")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::BAD_REQUEST => StatusCode::UNPROCESSABLE_ENTITY,
            other => other,
        };
        Self::new(status, rejection.body_text())
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub metadata: QueryMetadata,
    /// Seconds
    pub processing_time: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub agentic_rag_ready: bool,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: String,
    pub message: String,
    pub processing_time: f64,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": API_NAME,
        "description": API_DESCRIPTION,
        "version": API_VERSION,
        "health": "/health",
        "metrics": "/metrics",
        "query": "/query",
        "refresh": "/refresh",
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        version: API_VERSION.to_string(),
        agentic_rag_ready: state.is_ready().await,
    })
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.render(),
    )
}

pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    if request.question.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Question must not be empty",
        ));
    }

    let rag = state.rag().await.ok_or_else(ApiError::not_initialized)?;

    let started = Instant::now();
    let question = request.question.as_str();
    let preview: String = question.chars().take(100).collect();
    tracing::info!(question = %preview, "Processing query");

    let outcome = rag.query(question).await.map_err(|e| {
        tracing::error!(error = %e, "Error processing query");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error processing query: {}", e),
        )
    })?;

    let elapsed = started.elapsed();
    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "Query processed");

    Ok(Json(QueryResponse {
        answer: outcome.answer,
        metadata: outcome.metadata,
        processing_time: elapsed.as_secs_f64(),
    }))
}

/// Rebuild the system, re-indexing the knowledge base, and swap it in
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, ApiError> {
    if !state.is_ready().await {
        return Err(ApiError::not_initialized());
    }

    tracing::info!("Refreshing vector store");
    let elapsed = state.initialize().await.map_err(|e| {
        tracing::error!(error = %e, "Error refreshing vector store");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error refreshing vector store: {}", e),
        )
    })?;
    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "Vector store refreshed");

    Ok(Json(RefreshResponse {
        status: "success".to_string(),
        message: "Vector store refreshed successfully".to_string(),
        processing_time: elapsed.as_secs_f64(),
    }))
}
