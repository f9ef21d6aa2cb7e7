//! HTTP API for the agentic RAG system
//!
//! Exposes query, refresh, health and metrics endpoints over axum, with optional
//! per-client rate limiting and CORS.

pub mod config;
pub mod metrics;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
mod tests;

pub use config::{RateLimit, ServerSettings};
pub use server::{build_router, print_banner, serve};
pub use state::{AppState, RagFactory, SettingsFactory};
