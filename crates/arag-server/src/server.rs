//! Router assembly and serving

use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use colored::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use arag_core::Result;
use arag_workflow::Settings;

use crate::config::ServerSettings;
use crate::routes::{self, API_VERSION};
use crate::state::{AppState, SettingsFactory};
use crate::{metrics, rate_limit};

/// Assemble the API: routes, rate limiting on `/query`, metrics, tracing and CORS
pub fn build_router(state: AppState) -> Router {
    let limited = Router::new()
        .route("/query", post(routes::query))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::enforce));

    let mut router = Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .route("/refresh", post(routes::refresh))
        .merge(limited)
        .layer(middleware::from_fn_with_state(state.clone(), metrics::track))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&state.settings) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// CORS for the configured origins
///
/// Any origin is allowed without credentials. An explicit origin list allows
/// credentials, so methods and headers are mirrored instead of wildcarded.
pub fn cors_layer(settings: &ServerSettings) -> Option<CorsLayer> {
    if !settings.cors_enabled {
        return None;
    }

    if settings.allows_any_origin() {
        return Some(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request()),
    )
}

fn enabled(flag: bool) -> ColoredString {
    if flag {
        "✅ Enabled".green()
    } else {
        "❌ Disabled".red()
    }
}

/// Print the startup banner
pub fn print_banner(server: &ServerSettings, settings: &Settings) {
    let rule = "=".repeat(80);
    println!("\n{}", rule.cyan());
    println!("{}", "   🚀 AGENTIC RAG API SERVER STARTING   ".green().bold());
    println!("{}", rule.cyan());

    println!("\n{}", "📋 Configuration:".yellow());
    println!("  {} {}", "API Name:".blue(), routes::API_NAME);
    println!("  {} {}", "Version:".blue(), API_VERSION);
    println!("  {} {}", "Port:".blue(), server.port);
    println!("  {} {}", "Environment:".blue(), server.environment);

    println!("\n{}", "🔧 Features:".yellow());
    println!("  {} {}", "Rate Limiting:".blue(), enabled(server.rate_limit_enabled));
    if server.rate_limit_enabled {
        println!("  {} {}", "Rate Limit:".blue(), server.rate_limit);
    }
    println!("  {} {}", "CORS:".blue(), enabled(server.cors_enabled));
    if server.cors_enabled {
        let origins = if server.allows_any_origin() {
            "All Origins (*)".to_string()
        } else {
            server.cors_origins.join(", ")
        };
        println!("  {} {}", "CORS Origins:".blue(), origins);
    }

    println!("\n{}", "🤖 Azure OpenAI:".yellow());
    println!("  {} {}", "Endpoint:".blue(), settings.azure.endpoint);
    println!("  {} {}", "Model:".blue(), settings.azure.deployment);
    println!("  {} {}", "API Version:".blue(), settings.azure.api_version);

    println!("\n{}", "📚 Vector Store:".yellow());
    match settings.load_vector_store_urls() {
        Ok(urls) => {
            println!("  {} {}", "URLs Count:".blue(), urls.len());
            for (i, url) in urls.iter().take(3).enumerate() {
                println!("  {} {}", format!("URL {}:", i + 1).blue(), url);
            }
            if urls.len() > 3 {
                println!("  {} and {} more", "...".blue(), urls.len() - 3);
            }
        }
        Err(e) => println!("  {} {}", "URLs:".blue(), e.to_string().red()),
    }

    let base = format!("http://localhost:{}", server.port);
    println!("\n{}", "🌐 Endpoints:".yellow());
    println!("  {} {}/health", "Health:".green(), base);
    println!("  {} {}/metrics", "Metrics:".green(), base);
    println!("  {} {}/query", "Query:".green(), base);
    println!("  {} {}/refresh", "Refresh:".green(), base);
    println!("\n{}\n", rule.cyan());
}

/// Build the system, then serve until Ctrl-C
pub async fn serve(host: &str, server: ServerSettings, settings: Settings) -> Result<()> {
    print_banner(&server, &settings);

    let port = server.port;
    let state = AppState::new(server, Arc::new(SettingsFactory::new(settings)));

    tracing::info!("Initializing Agentic RAG system");
    let elapsed = state.initialize().await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to initialize Agentic RAG system");
    })?;
    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "Agentic RAG system initialized");

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down Agentic RAG API server");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
