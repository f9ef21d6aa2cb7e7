//! Route tests driven through the router with `oneshot`

#[cfg(test)]
mod route_tests {
    use crate::config::{RateLimit, ServerSettings};
    use crate::server::build_router;
    use crate::state::{AppState, RagFactory};
    use arag_core::{ChatRequest, ChatResponse, Error, Result};
    use arag_workflow::testing::{binary, tool_call, verdict, PromptKind, ScriptedModel, StaticTool};
    use arag_workflow::{AgenticRag, ToolRegistry};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    type Handler = fn(PromptKind, &ChatRequest) -> ChatResponse;

    fn approve(kind: PromptKind, request: &ChatRequest) -> ChatResponse {
        match kind {
            PromptKind::InputGuardrail | PromptKind::OutputGuardrail => {
                verdict(request, true, "none", "Safe")
            }
            PromptKind::RelevanceGrader
            | PromptKind::HallucinationGrader
            | PromptKind::AnswerGrader => binary(request, true),
            PromptKind::Router => ChatResponse::calls(vec![tool_call(
                "knowledge_base_search",
                json!({ "query": "machine learning" }),
            )]),
            PromptKind::QuestionRewriter => ChatResponse::text("better question"),
            PromptKind::AnswerGenerator => {
                ChatResponse::text("Machine learning lets systems learn from data.")
            }
        }
    }

    fn unstructured_grader(kind: PromptKind, request: &ChatRequest) -> ChatResponse {
        match kind {
            PromptKind::RelevanceGrader => ChatResponse::text("probably relevant"),
            _ => approve(kind, request),
        }
    }

    /// Builds scripted systems; builds numbered `fail_from` and later fail
    struct ScriptedFactory {
        handler: Handler,
        builds: AtomicUsize,
        fail_from: usize,
    }

    impl ScriptedFactory {
        fn new(handler: Handler) -> Self {
            Self {
                handler,
                builds: AtomicUsize::new(0),
                fail_from: usize::MAX,
            }
        }

        fn failing_from(mut self, build: usize) -> Self {
            self.fail_from = build;
            self
        }
    }

    #[async_trait]
    impl RagFactory for ScriptedFactory {
        async fn build(&self) -> Result<AgenticRag> {
            let build = self.builds.fetch_add(1, Ordering::SeqCst);
            if build >= self.fail_from {
                return Err(Error::DocumentIndexer(
                    "Failed to load any documents from the provided URLs".to_string(),
                ));
            }
            let tools = ToolRegistry::new().with(Arc::new(StaticTool::returning(
                "knowledge_base_search",
                "Machine learning is a field of AI.",
            )));
            Ok(AgenticRag::with_model(
                Arc::new(ScriptedModel::new(self.handler)),
                tools,
            ))
        }
    }

    async fn ready_state(settings: ServerSettings, factory: Arc<ScriptedFactory>) -> AppState {
        let state = AppState::new(settings, factory);
        state.initialize().await.unwrap();
        state
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root_describes_service() {
        let app = build_router(AppState::new(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(approve)),
        ));

        let (status, body) = send_json(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "name": "Agentic RAG API",
                "description": "This Agentic RAG supports enterprise system RAG design with best practices",
                "version": "1.0",
                "health": "/health",
                "metrics": "/metrics",
                "query": "/query",
                "refresh": "/refresh",
            })
        );
    }

    #[tokio::test]
    async fn test_health_reports_readiness() {
        let state = AppState::new(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(approve)),
        );
        let app = build_router(state.clone());

        let (status, body) = send_json(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], "1.0");
        assert_eq!(body["agentic_rag_ready"], false);
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").is_ok());

        state.initialize().await.unwrap();
        let (_, body) = send_json(&app, get("/health")).await;
        assert_eq!(body["agentic_rag_ready"], true);
    }

    #[tokio::test]
    async fn test_query_before_initialization() {
        let app = build_router(AppState::new(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(approve)),
        ));

        let (status, body) =
            send_json(&app, post_json("/query", json!({ "question": "What is ML?" }))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "detail": "Agentic RAG system not initialized" }));
    }

    #[tokio::test]
    async fn test_query_returns_answer_and_metadata() {
        let state = ready_state(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(approve)),
        )
        .await;
        let app = build_router(state);

        let (status, body) =
            send_json(&app, post_json("/query", json!({ "question": "What is ML?" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Machine learning lets systems learn from data.");
        assert_eq!(body["metadata"]["original_question"], "What is ML?");
        assert_eq!(body["metadata"]["input_safe"], "yes");
        assert_eq!(body["metadata"]["rewrite_count"], 0);
        assert_eq!(
            body["metadata"]["sources_used"],
            json!(["Machine learning is a field of AI."])
        );
        assert_eq!(body["metadata"]["steps"].as_array().unwrap().len(), 7);
        assert!(body["processing_time"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_query_keeps_question_as_sent() {
        let state = ready_state(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(approve)),
        )
        .await;
        let app = build_router(state);

        let (status, body) = send_json(
            &app,
            post_json("/query", json!({ "question": "  What is ML?\n" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["original_question"], "  What is ML?\n");
        assert_eq!(body["metadata"]["rewritten_question"], "  What is ML?\n");
    }

    #[tokio::test]
    async fn test_query_validation() {
        let state = ready_state(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(approve)),
        )
        .await;
        let app = build_router(state);

        let (status, body) =
            send_json(&app, post_json("/query", json!({ "question": "   " }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({ "detail": "Question must not be empty" }));

        let (status, body) = send_json(&app, post_json("/query", json!({ "q": "hi" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("question"));
    }

    #[tokio::test]
    async fn test_query_failure_is_500() {
        let state = ready_state(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(unstructured_grader)),
        )
        .await;
        let app = build_router(state);

        let (status, body) =
            send_json(&app, post_json("/query", json!({ "question": "What is ML?" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "detail": "Error processing query: LLM provider error: Model did not return structured output for GradeDocuments"
            })
        );
    }

    #[tokio::test]
    async fn test_rate_limit_applies_to_query_only() {
        let settings = ServerSettings {
            rate_limit_enabled: true,
            rate_limit: RateLimit {
                requests: 2,
                unit: "minute".to_string(),
                window: Duration::from_secs(60),
            },
            ..ServerSettings::default()
        };
        let state = ready_state(settings, Arc::new(ScriptedFactory::new(approve))).await;
        let app = build_router(state);

        for _ in 0..2 {
            let (status, _) =
                send(&app, post_json("/query", json!({ "question": "What is ML?" }))).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) =
            send_json(&app, post_json("/query", json!({ "question": "What is ML?" }))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!({ "error": "Rate limit exceeded: 2 per 1 minute" }));

        let (status, _) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_refresh_rebuilds_system() {
        let factory = Arc::new(ScriptedFactory::new(approve));
        let state = AppState::new(ServerSettings::default(), factory.clone());
        let app = build_router(state.clone());

        let (status, body) = send_json(&app, post_json("/refresh", json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Agentic RAG system not initialized");

        state.initialize().await.unwrap();
        let (status, body) = send_json(&app, post_json("/refresh", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Vector store refreshed successfully");
        assert!(body["processing_time"].is_f64());
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_system() {
        let factory = Arc::new(ScriptedFactory::new(approve).failing_from(1));
        let state = ready_state(ServerSettings::default(), factory).await;
        let app = build_router(state.clone());

        let (status, body) = send_json(&app, post_json("/refresh", json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["detail"],
            "Error refreshing vector store: Document indexer error: Failed to load any documents from the provided URLs"
        );
        assert!(state.is_ready().await);
    }

    #[tokio::test]
    async fn test_metrics_count_requests() {
        let app = build_router(AppState::new(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(approve)),
        ));

        send(&app, get("/health")).await;
        send(&app, get("/health")).await;
        send(&app, post_json("/query", json!({ "question": "hi" }))).await;

        let (status, body) = send(&app, get("/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("# TYPE http_requests_total counter"));
        assert!(text.contains(r#"http_requests_total{handler="/health",method="GET",status="2xx"} 2"#));
        assert!(text.contains(r#"http_requests_total{handler="/query",method="POST",status="5xx"} 1"#));
        assert!(text.contains(r#"http_request_duration_seconds_count{handler="/health"} 2"#));
    }

    #[tokio::test]
    async fn test_metrics_label_unmatched_routes() {
        let app = build_router(AppState::new(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(approve)),
        ));

        let (status, _) = send(&app, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, get("/metrics")).await;
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains(r#"http_requests_total{handler="none",method="GET",status="4xx"} 1"#));
        assert!(text.contains(r#"http_request_duration_seconds_count{handler="none"} 1"#));
    }

    #[tokio::test]
    async fn test_cors_any_origin() {
        let app = build_router(AppState::new(
            ServerSettings::default(),
            Arc::new(ScriptedFactory::new(approve)),
        ));

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://somewhere.example.com")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_listed_origins_with_credentials() {
        let settings = ServerSettings {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..ServerSettings::default()
        };
        let app = build_router(AppState::new(settings, Arc::new(ScriptedFactory::new(approve))));

        let allowed = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(allowed).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );

        let denied = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example.com")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(denied).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
