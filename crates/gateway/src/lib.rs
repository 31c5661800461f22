//! HTTP gateway for dualchat.
//!
//! Serves the embedded single-page frontend, a health check and the v1
//! chat API. Each browser client owns one `Orchestrator`, so its panels keep
//! their own history across requests.
//!
//! Built on Axum for async HTTP.

pub mod api_v1;
pub mod blueprint;
pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use dualchat_config::AppConfig;
use dualchat_core::knowledge::KnowledgeBase;
use dualchat_knowledge::{FileIndex, InMemoryIndex};

pub use api_v1::{ApiV1State, ClientMap, SharedApiState};
pub use blueprint::{Blueprint, Layout, SessionDescriptor};

/// Request body size limit.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the full router: health, v1 API and embedded frontend.
///
/// Layers applied:
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Open the knowledge base the configured sessions need.
///
/// Without a RAG session nothing is read from disk.
pub async fn open_knowledge_base(config: &AppConfig) -> Arc<dyn KnowledgeBase> {
    if !config.needs_knowledge_base() {
        return Arc::new(InMemoryIndex::new());
    }

    let index = FileIndex::open(&config.knowledge_base.path);
    match index.count().await {
        Ok(0) => warn!(
            path = %index.path().display(),
            "Vector index is empty; run `dualchat ingest` to add documents"
        ),
        Ok(count) => info!(
            documents = count,
            dimensions = ?index.dimensions().await,
            "Vector index ready"
        ),
        Err(e) => warn!(error = %e, "Could not count vector index"),
    }
    Arc::new(index)
}

/// Start the gateway HTTP server.
///
/// Builds the service clients, the knowledge base and the session agents
/// once; every client orchestrator shares them.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    if config.key_for(&config.chat.api_key).is_empty() {
        warn!("No API key configured; set DUALCHAT_API_KEY or api_key in config.toml");
    }

    let services = dualchat_providers::build_from_config(&config);
    let knowledge_base = open_knowledge_base(&config).await;
    let blueprint = Blueprint::from_config(&config, &services, knowledge_base);

    let state = Arc::new(ApiV1State::new(blueprint));
    let app = build_router(state);

    info!(addr = %addr, sessions = config.sessions.len(), "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> SharedApiState {
        let config = AppConfig::default();
        let services = dualchat_providers::build_from_config(&config);
        let blueprint = Blueprint::from_config(&config, &services, Arc::new(InMemoryIndex::new()));
        Arc::new(ApiV1State::new(blueprint))
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn full_router_serves_frontend_and_api() {
        let app = build_router(test_state());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/v1/layout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router(test_state());
        let prompt = "x".repeat(MAX_BODY_BYTES + 1);
        let body = serde_json::json!({ "prompt": prompt }).to_string();

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chats/abc")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn knowledge_base_skipped_without_rag_session() {
        let mut config = AppConfig::default();
        config.sessions.retain(|s| s.id == "gpt");
        config.knowledge_base.path = "/nonexistent/index.jsonl".into();

        let kb = open_knowledge_base(&config).await;
        assert_eq!(kb.name(), "in_memory");
        assert_eq!(kb.count().await.unwrap(), 0);
    }
}
